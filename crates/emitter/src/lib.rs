//! Fixed-format output for the pricebook pipeline.
//!
//! Converts a daily OHLC series into the positional text layout
//! `YYYYMMDD Open High Low Close`, one line per trading day.

pub mod fixed_format;

pub use fixed_format::{EmitStats, FixedFormatEmitter};
