//! Core types and configuration for the pricebook pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Normalized dates, OHLC tuples and per-asset series
//! - The consolidated multi-asset table
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
