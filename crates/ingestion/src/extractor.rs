//! Per-asset series extraction.
//!
//! Reads one raw price file, validates its columns for the requested mode,
//! normalizes the date of every row and collects the surviving rows into an
//! [`AssetSeries`]. Rows with an unparseable date are dropped and counted, as
//! are OHLC rows missing any price. A close-only row with a null close keeps
//! its date with no value. None of these fail the file on their own.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use pricebook_core::config::DateConfig;
use pricebook_core::{AssetSeries, Error, ExtractionMode, Ohlc, Result};
use tracing::{debug, warn};

use crate::date::DateNormalizer;
use crate::schema::Schema;

/// Statistics about one file's extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Data rows read (excluding the header).
    pub rows_read: u64,
    /// Rows dropped because the date matched no candidate format.
    pub dropped_bad_date: u64,
    /// Rows dropped because a required price was empty or not a finite number.
    pub dropped_missing_price: u64,
    /// Rows the CSV reader could not decode.
    pub malformed_rows: u64,
    /// Rows whose date was already present; the later row replaced the earlier one.
    pub duplicate_dates: u64,
    /// Close-only dates kept with a null close.
    pub null_closes: u64,
}

impl ExtractionStats {
    /// Total rows dropped for any reason.
    pub fn rows_dropped(&self) -> u64 {
        self.dropped_bad_date + self.dropped_missing_price + self.malformed_rows
    }

    /// Rows that made it into the series, before duplicate dates collapse.
    pub fn rows_kept(&self) -> u64 {
        self.rows_read - self.rows_dropped()
    }
}

/// A series together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Extraction<T> {
    pub series: AssetSeries<T>,
    pub stats: ExtractionStats,
}

/// Derive the asset identifier from a file path: its base name minus extension.
pub fn asset_id(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidAssetName(path.to_path_buf()))
}

/// Extracts close-only or OHLC series from raw price files.
#[derive(Debug, Clone, Default)]
pub struct SeriesExtractor {
    normalizer: DateNormalizer,
}

impl SeriesExtractor {
    /// Create an extractor using the given date configuration.
    pub fn new(config: &DateConfig) -> Self {
        Self::with_normalizer(DateNormalizer::new(config))
    }

    pub fn with_normalizer(normalizer: DateNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &DateNormalizer {
        &self.normalizer
    }

    /// Extract the close-price series of one file.
    pub fn extract_close(&self, path: &Path) -> Result<Extraction<Option<f64>>> {
        let asset = asset_id(path)?;
        let file = File::open(path)?;
        self.extract(&file_label(path), &asset, file, ExtractionMode::CloseOnly, close_value)
            .map(count_null_closes)
    }

    /// Extract the OHLC series of one file.
    pub fn extract_ohlc(&self, path: &Path) -> Result<Extraction<Ohlc>> {
        let asset = asset_id(path)?;
        let file = File::open(path)?;
        self.extract(&file_label(path), &asset, file, ExtractionMode::FullOhlc, ohlc_value)
    }

    /// Extract a close-price series from any reader, naming it `asset`.
    pub fn extract_close_from_reader<R: Read>(&self, asset: &str, reader: R) -> Result<Extraction<Option<f64>>> {
        self.extract(asset, asset, reader, ExtractionMode::CloseOnly, close_value)
            .map(count_null_closes)
    }

    /// Extract an OHLC series from any reader, naming it `asset`.
    pub fn extract_ohlc_from_reader<R: Read>(&self, asset: &str, reader: R) -> Result<Extraction<Ohlc>> {
        self.extract(asset, asset, reader, ExtractionMode::FullOhlc, ohlc_value)
    }

    fn extract<R, T, F>(
        &self,
        label: &str,
        asset: &str,
        reader: R,
        mode: ExtractionMode,
        value: F,
    ) -> Result<Extraction<T>>
    where
        R: Read,
        F: Fn(&StringRecord, &Schema) -> Option<T>,
    {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let schema = Schema::resolve(&headers, mode, label)?;

        let mut series = AssetSeries::new(asset);
        let mut stats = ExtractionStats::default();

        for (idx, result) in reader.records().enumerate() {
            // records() starts after the header; lines are 1-based.
            let line = idx + 2;
            stats.rows_read += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    debug!("{}: skipping malformed line {}: {}", label, line, e);
                    stats.malformed_rows += 1;
                    continue;
                }
            };

            let raw_date = record.get(schema.date()).unwrap_or_default();
            let date = match self.normalizer.normalize(raw_date) {
                Ok(date) => date,
                Err(e) => {
                    debug!("{}: line {}: {}", label, line, e);
                    stats.dropped_bad_date += 1;
                    continue;
                }
            };

            let Some(value) = value(&record, &schema) else {
                debug!("{}: line {}: missing price field", label, line);
                stats.dropped_missing_price += 1;
                continue;
            };

            if series.insert(date, value).is_some() {
                stats.duplicate_dates += 1;
            }
        }

        if stats.dropped_bad_date > 0 {
            warn!(
                "{}: dropped {} of {} rows with unparseable dates",
                label, stats.dropped_bad_date, stats.rows_read
            );
        }
        if stats.duplicate_dates > 0 {
            warn!(
                "{}: {} duplicate dates, keeping the last row for each",
                label, stats.duplicate_dates
            );
        }

        if series.is_empty() {
            return Err(Error::empty_after_filtering(label));
        }

        debug!(
            "{}: extracted {} {} rows ({} dropped)",
            label,
            series.len(),
            mode,
            stats.rows_dropped()
        );

        Ok(Extraction { series, stats })
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A price cell counts only if it holds a finite number.
fn parse_price(record: &StringRecord, idx: usize) -> Option<f64> {
    let value: f64 = record.get(idx)?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Never drops the row: a null close still contributes its date.
fn close_value(record: &StringRecord, schema: &Schema) -> Option<Option<f64>> {
    Some(parse_price(record, schema.close()))
}

fn count_null_closes(mut extraction: Extraction<Option<f64>>) -> Extraction<Option<f64>> {
    extraction.stats.null_closes = extraction
        .series
        .iter()
        .filter(|(_, close)| close.is_none())
        .count() as u64;
    extraction
}

fn ohlc_value(record: &StringRecord, schema: &Schema) -> Option<Ohlc> {
    match *schema {
        Schema::FullOhlc { open, high, low, close, .. } => Some(Ohlc::new(
            parse_price(record, open)?,
            parse_price(record, high)?,
            parse_price(record, low)?,
            parse_price(record, close)?,
        )),
        Schema::CloseOnly { .. } => None,
    }
}
