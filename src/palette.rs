use plotters::style::RGBColor;
use std::collections::HashMap;

/// Categorical color palette for series styling
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<RGBColor>,
}

impl ColorPalette {
    /// The d3 "category10" palette
    pub fn category10() -> Self {
        Self {
            colors: vec![
                RGBColor(31, 119, 180),
                RGBColor(255, 127, 14),
                RGBColor(44, 160, 44),
                RGBColor(214, 39, 40),
                RGBColor(148, 103, 189),
                RGBColor(140, 86, 75),
                RGBColor(227, 119, 194),
                RGBColor(127, 127, 127),
                RGBColor(188, 189, 34),
                RGBColor(23, 190, 207),
            ],
        }
    }

    /// Color for the series at `index`, cycling past the palette end
    pub fn color(&self, index: usize) -> RGBColor {
        self.colors[index % self.colors.len()]
    }

    /// Assign colors to keys in the order given
    pub fn assign_colors(&self, keys: &[String]) -> HashMap<String, RGBColor> {
        keys.iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), self.color(i)))
            .collect()
    }
}
