//! Error types for the pricebook pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pricebook pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The input directory does not exist.
    #[error("Input directory not found: {}", .0.display())]
    MissingInputDirectory(PathBuf),

    /// The input directory holds no candidate files.
    #[error("No input files found in {}", .0.display())]
    NoInputFiles(PathBuf),

    /// A file lacks columns required by the extraction mode.
    #[error("Missing required columns in {file}: {}", .missing.join(", "))]
    MissingRequiredColumns { file: String, missing: Vec<String> },

    /// A date field matched none of the candidate formats.
    #[error("Failed to parse date: '{0}'")]
    DateParse(String),

    /// Every row of a file was dropped during extraction.
    #[error("No valid rows remain in {0}")]
    EmptyAfterFiltering(String),

    /// Nothing survived extraction, so there is nothing to consolidate.
    #[error("No valid data found to consolidate")]
    NoValidSeries,

    /// Two inputs map to the same asset identifier.
    #[error("Duplicate asset identifier: {0}")]
    DuplicateAsset(String),

    /// An asset identifier could not be derived from a path.
    #[error("Cannot derive asset identifier from {}", .0.display())]
    InvalidAssetName(PathBuf),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a date parse error.
    pub fn date_parse(raw: impl Into<String>) -> Self {
        Error::DateParse(raw.into())
    }

    /// Create an empty-after-filtering error.
    pub fn empty_after_filtering(file: impl Into<String>) -> Self {
        Error::EmptyAfterFiltering(file.into())
    }

    /// Create a duplicate asset error.
    pub fn duplicate_asset(asset: impl Into<String>) -> Self {
        Error::DuplicateAsset(asset.into())
    }

    /// Whether this error means the input file was unusable.
    ///
    /// These become a skip in batch runs. Other errors raised while handling
    /// a single file are recorded as failures.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Error::MissingRequiredColumns { .. }
                | Error::EmptyAfterFiltering(_)
                | Error::InvalidAssetName(_)
                | Error::DateParse(_)
        )
    }
}
