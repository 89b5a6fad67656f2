//! Batch processing for the pricebook pipeline.
//!
//! This crate provides:
//! - Input discovery over a directory of per-asset files
//! - The consolidation and fixed-format conversion runs
//! - Per-file outcome tracking and final summaries
//! - Atomic output writes
//! - The `pricebook` command-line interface

pub mod cli;
pub mod output;
pub mod run;
pub mod summary;

pub use output::write_atomic;
pub use run::{consolidate_directory, convert_directory, convert_file, discover_inputs, ConsolidationReport};
pub use summary::{BatchSummary, FileOutcome, FileStatus};
