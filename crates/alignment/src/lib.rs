//! Multi-asset alignment for the pricebook pipeline.
//!
//! This crate handles:
//! - Outer-join alignment of close-only series on a common calendar
//! - Serializing the consolidated table to CSV

pub mod engine;
pub mod writer;

pub use engine::{align, AlignmentEngine};
pub use writer::{format_value, write_csv};
