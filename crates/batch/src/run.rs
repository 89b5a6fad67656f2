//! Batch runs over a directory of per-asset price files.
//!
//! Each file is extracted, transformed and written independently. A file
//! that cannot be used is recorded in the [`BatchSummary`] and the run moves
//! on; only a missing input directory or an empty one halts it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use pricebook_alignment::{write_csv, AlignmentEngine};
use pricebook_core::{Config, Error, NormalizedDate, Result};
use pricebook_emitter::{EmitStats, FixedFormatEmitter};
use pricebook_ingestion::{asset_id, SeriesExtractor};
use tracing::{info, warn};

use crate::output::write_atomic;
use crate::summary::{BatchSummary, FileOutcome};

/// Result of a consolidation run.
#[derive(Debug, Clone, Default)]
pub struct ConsolidationReport {
    /// Per-file outcomes.
    pub summary: BatchSummary,
    /// Path written, or `None` when no series survived extraction.
    pub output: Option<PathBuf>,
    /// Date rows in the table.
    pub rows: usize,
    /// Asset columns in the table.
    pub columns: usize,
    /// First and last date of the table.
    pub date_range: Option<(NormalizedDate, NormalizedDate)>,
}

/// List input files of `dir` with the given extension, in path order.
///
/// The extension is matched case-insensitively.
pub fn discover_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::MissingInputDirectory(dir.to_path_buf()));
    }

    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(Error::NoInputFiles(dir.to_path_buf()));
    }

    files.sort();
    Ok(files)
}

/// Build the consolidated close-price table from every file in the input directory.
pub fn consolidate_directory(config: &Config) -> Result<ConsolidationReport> {
    let files = discover_inputs(&config.input.dir, &config.input.extension)?;
    info!("Found {} files. Processing...", files.len());

    let extractor = SeriesExtractor::new(&config.dates);
    let mut engine = AlignmentEngine::new();
    let mut summary = BatchSummary::default();

    for path in &files {
        let extraction = match extractor.extract_close(path) {
            Ok(extraction) => extraction,
            Err(e) => {
                summary.record(FileOutcome::from_error(path, &e));
                continue;
            }
        };

        let rows = extraction.series.len() as u64;
        let dropped = extraction.stats.rows_dropped();
        match engine.add(extraction.series) {
            Ok(()) => summary.record(FileOutcome::converted(path, rows, dropped)),
            Err(e) => summary.record(FileOutcome::from_error(path, &e)),
        }
    }

    let table = match engine.build() {
        Ok(table) => table,
        Err(Error::NoValidSeries) => {
            warn!("No valid data found to consolidate.");
            summary.log_totals();
            return Ok(ConsolidationReport {
                summary,
                ..ConsolidationReport::default()
            });
        }
        Err(e) => return Err(e),
    };

    let output = &config.consolidate.output_file;
    write_atomic(output, |w| write_csv(&table, w))?;

    let (rows, columns) = table.shape();
    let date_range = table.first_date().zip(table.last_date());
    info!("Successfully created consolidated data at: {}", output.display());
    info!("Shape: ({}, {})", rows, columns);
    if let Some((first, last)) = date_range {
        info!("Date range: {} to {}", first, last);
    }
    summary.log_totals();

    Ok(ConsolidationReport {
        summary,
        output: Some(output.clone()),
        rows,
        columns,
        date_range,
    })
}

/// Convert every file in the input directory to a fixed-format text file.
pub fn convert_directory(config: &Config) -> Result<BatchSummary> {
    let files = discover_inputs(&config.input.dir, &config.input.extension)?;
    info!("Found {} files. Converting...", files.len());

    let output_dir = &config.convert.output_dir;
    fs::create_dir_all(output_dir)?;

    let extractor = SeriesExtractor::new(&config.dates);
    let emitter = FixedFormatEmitter::new(config.convert.precision);
    let mut seen = HashSet::new();
    let mut summary = BatchSummary::default();

    for path in &files {
        // An identifier is taken only once one of its files has been written.
        let outcome = asset_id(path)
            .and_then(|asset| {
                if seen.contains(&asset) {
                    return Err(Error::duplicate_asset(asset));
                }
                let target = output_dir.join(format!("{}.{}", asset, config.convert.output_extension));
                let converted = convert_one(&extractor, &emitter, path, &target)?;
                seen.insert(asset);
                Ok(converted)
            })
            .map(|(rows, dropped)| FileOutcome::converted(path, rows, dropped))
            .unwrap_or_else(|e| FileOutcome::from_error(path, &e));
        summary.record(outcome);
    }

    info!("Conversion complete! Files saved to: {}", output_dir.display());
    summary.log_totals();
    Ok(summary)
}

/// Convert a single file to fixed format at `output`.
pub fn convert_file(input: &Path, output: &Path, config: &Config) -> Result<EmitStats> {
    let extractor = SeriesExtractor::new(&config.dates);
    let emitter = FixedFormatEmitter::new(config.convert.precision);
    let extraction = extractor.extract_ohlc(input)?;
    let stats = write_atomic(output, |w| emitter.write(&extraction.series, w))?;
    info!(
        "Converted {} -> {} ({} rows)",
        input.display(),
        output.display(),
        stats.rows_written
    );
    Ok(stats)
}

/// Returns (rows written, rows dropped).
fn convert_one(
    extractor: &SeriesExtractor,
    emitter: &FixedFormatEmitter,
    input: &Path,
    target: &Path,
) -> Result<(u64, u64)> {
    let extraction = extractor.extract_ohlc(input)?;
    let stats = write_atomic(target, |w| emitter.write(&extraction.series, w))?;
    Ok((
        stats.rows_written,
        extraction.stats.rows_dropped() + stats.rows_skipped,
    ))
}
