// Aggregation pipeline: filter -> completeness -> rank -> select.
//
// Each stage is a pure function so it can be tested in isolation; the
// composed entry point is `select_top_crops`.

use crate::data::{CropRecord, CropTable};
use anyhow::Result;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Measurement category the dashboard is built from
pub const PRODUCTION_ELEMENT: &str = "Production";

/// Unit used for ranking total production
pub const TONNES_UNIT: &str = "tonnes";

/// Number of crop series shown by default
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone)]
pub struct SelectionOptions {
    /// How many top items to keep
    pub top_n: usize,
    /// Distinct-year count an item must reach to be considered complete.
    /// When `None` the span is derived from the data (count of distinct
    /// years across all production rows).
    pub completeness_span: Option<usize>,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            completeness_span: None,
        }
    }
}

/// Pipeline output: the ranked item names and the production rows that
/// back the chart (all years, all units as originally present).
#[derive(Debug, Clone)]
pub struct CropSelection {
    pub items: Vec<String>,
    pub rows: Vec<CropRecord>,
}

/// Keep only rows measuring production
pub fn filter_production(records: &[CropRecord]) -> Vec<CropRecord> {
    records
        .iter()
        .filter(|r| r.element == PRODUCTION_ELEMENT)
        .cloned()
        .collect()
}

/// Count distinct years per item
pub fn distinct_years_per_item(rows: &[CropRecord]) -> HashMap<String, usize> {
    let mut years: HashMap<&str, HashSet<i32>> = HashMap::new();
    for row in rows {
        years.entry(&row.item).or_default().insert(row.year);
    }
    years
        .into_iter()
        .map(|(item, set)| (item.to_string(), set.len()))
        .collect()
}

/// Count of distinct years across the whole row set (the observed time span)
pub fn observed_year_span(rows: &[CropRecord]) -> usize {
    rows.iter().map(|r| r.year).collect::<HashSet<_>>().len()
}

/// Items whose distinct-year count equals the completeness span.
/// Incomplete items are dropped silently.
pub fn complete_items(year_counts: &HashMap<String, usize>, span: usize) -> HashSet<String> {
    year_counts
        .iter()
        .filter(|(_, &count)| count == span)
        .map(|(item, _)| item.clone())
        .collect()
}

/// Sum tonnes production per item, restricted to the given items
pub fn total_tonnes_by_item(
    rows: &[CropRecord],
    items: &HashSet<String>,
) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for row in rows {
        if row.unit == TONNES_UNIT && items.contains(&row.item) {
            *totals.entry(row.item.clone()).or_insert(0.0) += row.value;
        }
    }
    totals
}

/// Rank totals descending and take the first `n` item names.
/// Equal totals break by item name so the selection is deterministic.
pub fn top_items(totals: &HashMap<String, f64>, n: usize) -> Vec<String> {
    let mut entries: Vec<(&String, f64)> = totals.iter().map(|(k, &v)| (k, v)).collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    entries.into_iter().take(n).map(|(k, _)| k.clone()).collect()
}

/// Restrict rows to the selected items, preserving row order
pub fn rows_for_items(rows: &[CropRecord], items: &[String]) -> Vec<CropRecord> {
    let wanted: HashSet<&str> = items.iter().map(String::as_str).collect();
    rows.iter()
        .filter(|r| wanted.contains(r.item.as_str()))
        .cloned()
        .collect()
}

/// Run the full pipeline over the loaded table.
///
/// Fails explicitly on an empty table, a table without production rows,
/// or a table where no item covers the full time span.
pub fn select_top_crops(table: &CropTable, options: &SelectionOptions) -> Result<CropSelection> {
    let production = filter_production(&table.records);
    if production.is_empty() {
        anyhow::bail!(
            "Dataset contains no rows with Element == \"{}\"",
            PRODUCTION_ELEMENT
        );
    }

    let span = options
        .completeness_span
        .unwrap_or_else(|| observed_year_span(&production));

    let year_counts = distinct_years_per_item(&production);
    let complete = complete_items(&year_counts, span);
    if complete.is_empty() {
        anyhow::bail!("No item covers the full {}-year time span", span);
    }

    let totals = total_tonnes_by_item(&production, &complete);
    if totals.is_empty() {
        anyhow::bail!(
            "No complete item has production measured in {}",
            TONNES_UNIT
        );
    }

    let items = top_items(&totals, options.top_n);
    let rows = rows_for_items(&production, &items);

    Ok(CropSelection { items, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(item: &str, element: &str, unit: &str, year: i32, value: f64) -> CropRecord {
        CropRecord {
            item: item.to_string(),
            element: element.to_string(),
            unit: unit.to_string(),
            year,
            value,
        }
    }

    /// Items spanning `years` years of production, with a fixed per-year value
    fn production_series(item: &str, years: std::ops::Range<i32>, value: f64) -> Vec<CropRecord> {
        years
            .map(|y| record(item, "Production", "tonnes", y, value))
            .collect()
    }

    #[test]
    fn test_filter_production() {
        let records = vec![
            record("Wheat", "Production", "tonnes", 1961, 10.0),
            record("Wheat", "Area harvested", "ha", 1961, 5.0),
            record("Barley", "Production", "tonnes", 1961, 7.0),
        ];
        let production = filter_production(&records);
        assert_eq!(production.len(), 2);
        assert!(production.iter().all(|r| r.element == "Production"));
    }

    #[test]
    fn test_distinct_years_per_item() {
        let rows = vec![
            record("Wheat", "Production", "tonnes", 1961, 1.0),
            record("Wheat", "Production", "tonnes", 1962, 1.0),
            // Duplicate year in a different unit still counts once
            record("Wheat", "Production", "1000 t", 1962, 1.0),
            record("Barley", "Production", "tonnes", 1961, 1.0),
        ];
        let counts = distinct_years_per_item(&rows);
        assert_eq!(counts["Wheat"], 2);
        assert_eq!(counts["Barley"], 1);
    }

    #[test]
    fn test_observed_year_span() {
        let rows = vec![
            record("Wheat", "Production", "tonnes", 1961, 1.0),
            record("Barley", "Production", "tonnes", 1962, 1.0),
            record("Olives", "Production", "tonnes", 1961, 1.0),
        ];
        assert_eq!(observed_year_span(&rows), 2);
    }

    #[test]
    fn test_complete_items() {
        let mut counts = HashMap::new();
        counts.insert("Wheat".to_string(), 60);
        counts.insert("Barley".to_string(), 59);
        let complete = complete_items(&counts, 60);
        assert!(complete.contains("Wheat"));
        assert!(!complete.contains("Barley"));
    }

    #[test]
    fn test_total_tonnes_by_item_ignores_other_units() {
        let rows = vec![
            record("Wheat", "Production", "tonnes", 1961, 10.0),
            record("Wheat", "Production", "tonnes", 1962, 20.0),
            record("Wheat", "Production", "1000 t", 1962, 999.0),
        ];
        let items: HashSet<String> = ["Wheat".to_string()].into_iter().collect();
        let totals = total_tonnes_by_item(&rows, &items);
        assert_eq!(totals["Wheat"], 30.0);
    }

    #[test]
    fn test_top_items_descending_with_tie_break() {
        let mut totals = HashMap::new();
        totals.insert("A".to_string(), 100.0);
        totals.insert("B".to_string(), 50.0);
        totals.insert("C".to_string(), 50.0);
        totals.insert("D".to_string(), 10.0);
        let top = top_items(&totals, 3);
        assert_eq!(top, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_top_items_n_larger_than_totals() {
        let mut totals = HashMap::new();
        totals.insert("A".to_string(), 1.0);
        let top = top_items(&totals, 5);
        assert_eq!(top, vec!["A"]);
    }

    #[test]
    fn test_select_top_crops_scenario() {
        // 3 complete items with tonnes sums {A: 100, B: 50, C: 30} and one
        // item covering only 59 of 60 years
        let mut records = Vec::new();
        records.extend(production_series("A", 1961..2021, 100.0 / 60.0));
        records.extend(production_series("B", 1961..2021, 50.0 / 60.0));
        records.extend(production_series("C", 1961..2021, 30.0 / 60.0));
        records.extend(production_series("Lentils", 1961..2020, 1000.0));

        let table = CropTable::new(records);
        let selection = select_top_crops(&table, &SelectionOptions::default()).unwrap();

        assert_eq!(selection.items, vec!["A", "B", "C"]);
        assert!(selection.rows.iter().all(|r| r.element == "Production"));
        assert!(selection.rows.iter().all(|r| selection.items.contains(&r.item)));
        assert_eq!(selection.rows.len(), 3 * 60);
    }

    #[test]
    fn test_select_top_crops_explicit_span() {
        // Pinning the span to 60 drops an item that only covers 59 years,
        // even when that item dominates the totals
        let mut records = Vec::new();
        records.extend(production_series("Wheat", 1961..2021, 1.0));
        records.extend(production_series("Olives", 1962..2021, 1000.0));

        let table = CropTable::new(records);
        let options = SelectionOptions {
            top_n: 5,
            completeness_span: Some(60),
        };
        let selection = select_top_crops(&table, &options).unwrap();
        assert_eq!(selection.items, vec!["Wheat"]);
    }

    #[test]
    fn test_select_top_crops_keeps_non_tonnes_rows_for_selected_items() {
        let mut records = production_series("Wheat", 1961..1963, 10.0);
        records.push(record("Wheat", "Production", "1000 t", 1961, 0.01));

        let table = CropTable::new(records);
        let selection = select_top_crops(&table, &SelectionOptions::default()).unwrap();
        assert_eq!(selection.items, vec!["Wheat"]);
        // The output row set keeps all units, not just tonnes
        assert_eq!(selection.rows.len(), 3);
    }

    #[test]
    fn test_select_top_crops_empty_table() {
        let table = CropTable::default();
        let result = select_top_crops(&table, &SelectionOptions::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no rows"));
    }

    #[test]
    fn test_select_top_crops_no_production_rows() {
        let records = vec![record("Wheat", "Area harvested", "ha", 1961, 5.0)];
        let table = CropTable::new(records);
        let result = select_top_crops(&table, &SelectionOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_select_top_crops_no_tonnes_items() {
        let records = vec![record("Wool", "Production", "1000 No", 1961, 5.0)];
        let table = CropTable::new(records);
        let result = select_top_crops(&table, &SelectionOptions::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("tonnes"));
    }

    #[test]
    fn test_select_top_crops_idempotent() {
        let mut records = Vec::new();
        records.extend(production_series("A", 1961..2021, 2.0));
        records.extend(production_series("B", 1961..2021, 1.0));
        let table = CropTable::new(records);

        let first = select_top_crops(&table, &SelectionOptions::default()).unwrap();
        let second = select_top_crops(&table, &SelectionOptions::default()).unwrap();
        assert_eq!(first.items, second.items);
        assert_eq!(first.rows, second.rows);
    }
}
