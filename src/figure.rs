use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A pre-built Plotly figure, loaded verbatim and displayed without
/// interpretation. Only the outer structure is validated.
#[derive(Debug, Clone)]
pub struct MapFigure {
    value: Value,
}

impl MapFigure {
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read figure '{}'", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Failed to parse figure '{}'", path.display()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).context("Figure is not valid JSON")?;

        let obj = value
            .as_object()
            .ok_or_else(|| anyhow!("Figure must be a JSON object"))?;
        if !obj.get("data").map(Value::is_array).unwrap_or(false) {
            return Err(anyhow!("Figure is missing a 'data' array"));
        }
        if !obj.get("layout").map(Value::is_object).unwrap_or(false) {
            return Err(anyhow!("Figure is missing a 'layout' object"));
        }

        Ok(Self { value })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Serialize back to JSON for embedding
    pub fn to_json(&self) -> String {
        self.value.to_string()
    }
}

/// Interaction flags passed to the map display layer
#[derive(Debug, Clone, Serialize)]
pub struct FigureConfig {
    #[serde(rename = "scrollZoom")]
    pub scroll_zoom: bool,
    #[serde(rename = "displayModeBar")]
    pub display_mode_bar: bool,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            scroll_zoom: false,
            display_mode_bar: false,
        }
    }
}

impl FigureConfig {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize figure config")
    }
}
