//! Configuration structures for the pricebook pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{DateFormat, TimezonePolicy};

/// Largest fixed-format precision accepted. Beyond this f64 prints noise.
pub const MAX_PRECISION: usize = 15;

/// Main configuration for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Date normalization configuration.
    pub dates: DateConfig,
    /// Input discovery configuration.
    pub input: InputConfig,
    /// Consolidated table configuration.
    pub consolidate: ConsolidateConfig,
    /// Fixed-format conversion configuration.
    pub convert: ConvertConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.dates.formats.is_empty() {
            return Err(Error::config("dates.formats must list at least one format"));
        }
        if self.convert.precision > MAX_PRECISION {
            return Err(Error::config(format!(
                "convert.precision must be at most {MAX_PRECISION}, got {}",
                self.convert.precision
            )));
        }
        if self.input.extension.trim_start_matches('.').is_empty() {
            return Err(Error::config("input.extension must not be empty"));
        }
        Ok(())
    }

    /// Force UTC truncation for every encoding.
    pub fn with_utc_everywhere(mut self) -> Self {
        self.dates.positional_policy = TimezonePolicy::Utc;
        self.dates.iso_policy = TimezonePolicy::Utc;
        self
    }
}

/// Date normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    /// Candidate formats, tried in order.
    pub formats: Vec<DateFormat>,
    /// Policy for the positional `GMT±HHMM` encodings.
    pub positional_policy: TimezonePolicy,
    /// Policy for ISO-style date fields.
    pub iso_policy: TimezonePolicy,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            formats: vec![DateFormat::GmtOffsetMillis, DateFormat::GmtOffset, DateFormat::Iso],
            positional_policy: TimezonePolicy::PreserveOffset,
            iso_policy: TimezonePolicy::Utc,
        }
    }
}

/// Input discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding one CSV file per asset.
    pub dir: PathBuf,
    /// File extension of input files, without the dot.
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/historical_data"),
            extension: "csv".to_string(),
        }
    }
}

/// Consolidated table configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidateConfig {
    /// Output CSV path.
    pub output_file: PathBuf,
}

impl Default for ConsolidateConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from("data/consolidated_close_prices.csv"),
        }
    }
}

/// Fixed-format conversion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Directory receiving one text file per asset.
    pub output_dir: PathBuf,
    /// Decimal places for each price field.
    pub precision: usize,
    /// Extension of the emitted files, without the dot.
    pub output_extension: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("historical_data"),
            precision: 6,
            output_extension: "txt".to_string(),
        }
    }
}
