use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column names expected in the cleaned crop dataset
pub const REQUIRED_COLUMNS: [&str; 5] = ["Item", "Element", "Unit", "Year", "Value"];

/// One row of the cleaned agricultural statistics table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CropRecord {
    #[serde(rename = "Item")]
    pub item: String,
    #[serde(rename = "Element")]
    pub element: String,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// The loaded dataset. Read once per invocation, never mutated.
#[derive(Debug, Clone, Default)]
pub struct CropTable {
    pub records: Vec<CropRecord>,
}

impl CropTable {
    pub fn new(records: Vec<CropRecord>) -> Self {
        Self { records }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset '{}'", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to read dataset '{}'", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?.clone();
        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == required) {
                return Err(anyhow!("Missing column '{}' in dataset header", required));
            }
        }

        let mut records = Vec::new();
        for (idx, result) in rdr.deserialize().enumerate() {
            let record: CropRecord = result
                .with_context(|| format!("Invalid record at data row {}", idx + 1))?;
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
