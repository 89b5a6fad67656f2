//! PyO3 bindings for the pricebook pipeline.
//!
//! Exposes to Python:
//! - Date normalization
//! - Directory consolidation into one close-price table
//! - Directory conversion to the fixed-format layout

use std::path::PathBuf;

use pyo3::exceptions::{PyFileNotFoundError, PyIOError, PyValueError};
use pyo3::prelude::*;

use pricebook_batch::{
    consolidate_directory, convert_directory, BatchSummary as RustBatchSummary,
    FileOutcome as RustFileOutcome, FileStatus,
};
use pricebook_core::{Config, Error as RustError};
use pricebook_ingestion::DateNormalizer;

fn to_py_err(err: RustError) -> PyErr {
    match err {
        RustError::MissingInputDirectory(_) | RustError::NoInputFiles(_) => {
            PyFileNotFoundError::new_err(err.to_string())
        }
        RustError::Io(_) => PyIOError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn config_with(input_dir: PathBuf, utc: bool) -> Config {
    let mut config = Config::default();
    config.input.dir = input_dir;
    if utc {
        config = config.with_utc_everywhere();
    }
    config
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Outcome of one input file.
#[pyclass]
#[derive(Clone)]
pub struct FileOutcome {
    #[pyo3(get)]
    pub file: String,
    /// "converted", "skipped" or "failed".
    #[pyo3(get)]
    pub status: String,
    #[pyo3(get)]
    pub rows: u64,
    #[pyo3(get)]
    pub dropped: u64,
    #[pyo3(get)]
    pub reason: Option<String>,
}

#[pymethods]
impl FileOutcome {
    fn __repr__(&self) -> String {
        format!(
            "FileOutcome(file={:?}, status={}, rows={}, dropped={})",
            self.file, self.status, self.rows, self.dropped
        )
    }
}

impl From<RustFileOutcome> for FileOutcome {
    fn from(o: RustFileOutcome) -> Self {
        let file = o.file.display().to_string();
        match o.status {
            FileStatus::Converted { rows, dropped } => FileOutcome {
                file,
                status: "converted".to_string(),
                rows,
                dropped,
                reason: None,
            },
            FileStatus::Skipped { reason } => FileOutcome {
                file,
                status: "skipped".to_string(),
                rows: 0,
                dropped: 0,
                reason: Some(reason),
            },
            FileStatus::Failed { reason } => FileOutcome {
                file,
                status: "failed".to_string(),
                rows: 0,
                dropped: 0,
                reason: Some(reason),
            },
        }
    }
}

/// Per-file outcomes of a batch run.
#[pyclass]
#[derive(Clone)]
pub struct BatchSummary {
    #[pyo3(get)]
    pub converted: usize,
    #[pyo3(get)]
    pub skipped: usize,
    #[pyo3(get)]
    pub failed: usize,
    #[pyo3(get)]
    pub outcomes: Vec<FileOutcome>,
    /// Output path of a consolidation run, if anything was written.
    #[pyo3(get)]
    pub output: Option<String>,
}

#[pymethods]
impl BatchSummary {
    #[getter]
    fn total(&self) -> usize {
        self.outcomes.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "BatchSummary(converted={}, skipped={}, failed={})",
            self.converted, self.skipped, self.failed
        )
    }
}

impl From<RustBatchSummary> for BatchSummary {
    fn from(s: RustBatchSummary) -> Self {
        BatchSummary {
            converted: s.converted(),
            skipped: s.skipped(),
            failed: s.failed(),
            outcomes: s.outcomes.into_iter().map(|o| o.into()).collect(),
            output: None,
        }
    }
}

// ============================================================================
// Python-exposed Functions
// ============================================================================

/// Normalize one date value to its `YYYYMMDD` form.
#[pyfunction]
#[pyo3(signature = (value, utc=false))]
fn normalize_date(value: &str, utc: bool) -> PyResult<String> {
    let config = if utc {
        Config::default().with_utc_everywhere()
    } else {
        Config::default()
    };
    DateNormalizer::new(&config.dates)
        .normalize(value)
        .map(|date| date.compact())
        .map_err(to_py_err)
}

/// Merge the close prices of every CSV in `input_dir` into `output_file`.
#[pyfunction]
#[pyo3(signature = (input_dir, output_file, utc=false))]
fn consolidate(input_dir: PathBuf, output_file: PathBuf, utc: bool) -> PyResult<BatchSummary> {
    let mut config = config_with(input_dir, utc);
    config.consolidate.output_file = output_file;

    let report = consolidate_directory(&config).map_err(to_py_err)?;
    let mut summary: BatchSummary = report.summary.into();
    summary.output = report.output.map(|p| p.display().to_string());
    Ok(summary)
}

/// Convert every CSV in `input_dir` to a fixed-format text file in `output_dir`.
#[pyfunction]
#[pyo3(signature = (input_dir, output_dir, precision=6, utc=false))]
fn convert(input_dir: PathBuf, output_dir: PathBuf, precision: usize, utc: bool) -> PyResult<BatchSummary> {
    let mut config = config_with(input_dir, utc);
    config.convert.output_dir = output_dir;
    config.convert.precision = precision;
    config.validate().map_err(to_py_err)?;

    convert_directory(&config).map(Into::into).map_err(to_py_err)
}

// ============================================================================
// Module Definition
// ============================================================================

/// Pricebook - price history normalization for Python.
#[pymodule]
fn pricebook(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<FileOutcome>()?;
    m.add_class::<BatchSummary>()?;

    // Functions
    m.add_function(wrap_pyfunction!(normalize_date, m)?)?;
    m.add_function(wrap_pyfunction!(consolidate, m)?)?;
    m.add_function(wrap_pyfunction!(convert, m)?)?;

    Ok(())
}
