//! Pricebook CLI
//!
//! Provides commands for:
//! - `consolidate`: merge close prices of all inputs into one CSV
//! - `convert`: write per-asset fixed-format text files
//! - `convert-file`: convert one file
//! - `normalize-date`: check how a date value is read

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pricebook_batch::cli::{execute, Cli};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    execute(&cli)
}
