//! Filter coefficient files

use anyhow::{Context, Result};
use lablib_core::RecursiveFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Coefficients of a recursive filter, as stored on disk.
///
/// ```toml
/// name = "one-pole lowpass"
/// xcoeff = [0.1]
/// ycoeff = [0.9]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub xcoeff: Vec<f64>,
    #[serde(default)]
    pub ycoeff: Vec<f64>,
}

impl FilterSpec {
    pub fn new(xcoeff: Vec<f64>, ycoeff: Vec<f64>) -> Self {
        Self {
            name: None,
            xcoeff,
            ycoeff,
        }
    }

    /// Load a filter file; `.json` files are read as JSON, anything else as TOML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter file: {:?}", path))?;

        let spec = if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON filter file: {:?}", path))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML filter file: {:?}", path))?
        };

        Ok(spec)
    }

    /// Save the filter to a file, in the format chosen by its extension
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).context("Failed to serialize filter")?
        } else {
            toml::to_string_pretty(self).context("Failed to serialize filter")?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write filter file: {:?}", path))?;

        Ok(())
    }

    pub fn to_filter(&self) -> RecursiveFilter {
        RecursiveFilter::new(self.xcoeff.clone(), self.ycoeff.clone())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("json")
}
