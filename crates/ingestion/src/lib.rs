//! Data ingestion and normalization for the pricebook pipeline.
//!
//! This crate handles:
//! - Date normalization across vendor encodings
//! - Column schema validation
//! - Per-asset series extraction (close-only or full OHLC)

pub mod date;
pub mod extractor;
pub mod schema;

pub use date::DateNormalizer;
pub use extractor::{asset_id, Extraction, ExtractionStats, SeriesExtractor};
pub use schema::{HeaderIndex, Schema};
