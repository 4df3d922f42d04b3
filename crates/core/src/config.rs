//! TOML configuration. Every key is optional; a missing file section falls back
//! to the defaults below.
//!
//! ```toml
//! [display]
//! currency_symbol = "₹"
//! placeholder_label = "Participant"
//!
//! [split]
//! mode = "exact_cents"
//! auto_split_includes_blank = false
//!
//! [parser]
//! skip_summary_lines = true
//!
//! [ocr]
//! language = "eng"
//! max_dimension = 2800
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::totals::{SplitMode, TotalsOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabsplitConfig {
    pub display: DisplayConfig,
    pub split: SplitConfig,
    pub parser: ParserConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
    pub placeholder_label: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            placeholder_label: "Participant".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub mode: SplitMode,
    /// Whether "split among everyone" also includes participants whose names
    /// are still blank.
    pub auto_split_includes_blank: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Drop total/subtotal/tax style lines instead of turning them into items.
    pub skip_summary_lines: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub language: String,
    /// Images larger than this in either dimension are scaled down first.
    pub max_dimension: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            max_dimension: 2800,
        }
    }
}

impl TabsplitConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn totals_options(&self) -> TotalsOptions {
        TotalsOptions {
            mode: self.split.mode,
            placeholder_label: self.display.placeholder_label.clone(),
        }
    }
}
