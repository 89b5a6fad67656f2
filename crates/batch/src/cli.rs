//! Command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pricebook_core::Config;
use pricebook_ingestion::DateNormalizer;
use tracing::info;

use crate::run::{consolidate_directory, convert_directory, convert_file};

/// Pricebook CLI
#[derive(Parser, Debug)]
#[command(name = "pricebook")]
#[command(about = "Normalize per-asset price history files into consolidated and fixed-format outputs")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Shift every timestamp to UTC before taking its date
    #[arg(long, global = true)]
    pub utc: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge the close prices of every input file into one date-aligned CSV
    Consolidate(ConsolidateArgs),
    /// Convert every input file to the fixed-format text layout
    Convert(ConvertArgs),
    /// Convert a single file to the fixed-format text layout
    ConvertFile(ConvertFileArgs),
    /// Print the YYYYMMDD form of one date value
    NormalizeDate(NormalizeDateArgs),
}

#[derive(Args, Debug)]
pub struct ConsolidateArgs {
    /// Directory of per-asset CSV files
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output CSV path
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Directory of per-asset CSV files
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving one text file per asset
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Decimal places per price field
    #[arg(long)]
    pub precision: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ConvertFileArgs {
    /// Input CSV file
    #[arg(long, short)]
    pub input: PathBuf,

    /// Output text file
    #[arg(long, short)]
    pub output: PathBuf,

    /// Decimal places per price field
    #[arg(long)]
    pub precision: Option<usize>,
}

#[derive(Args, Debug)]
pub struct NormalizeDateArgs {
    /// Raw date value, e.g. "05.05.2003 00:00:00.000 GMT+0900"
    pub value: String,
}

impl Cli {
    /// Configuration from `--config` (or defaults) with command-line overrides applied.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => Config::default(),
        };

        if self.utc {
            config = config.with_utc_everywhere();
        }

        match &self.command {
            Commands::Consolidate(args) => {
                if let Some(dir) = &args.input_dir {
                    config.input.dir = dir.clone();
                }
                if let Some(output) = &args.output {
                    config.consolidate.output_file = output.clone();
                }
            }
            Commands::Convert(args) => {
                if let Some(dir) = &args.input_dir {
                    config.input.dir = dir.clone();
                }
                if let Some(dir) = &args.output_dir {
                    config.convert.output_dir = dir.clone();
                }
                if let Some(precision) = args.precision {
                    config.convert.precision = precision;
                }
            }
            Commands::ConvertFile(args) => {
                if let Some(precision) = args.precision {
                    config.convert.precision = precision;
                }
            }
            Commands::NormalizeDate(_) => {}
        }

        config.validate()?;
        Ok(config)
    }
}

/// Run the selected command.
pub fn execute(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;

    match &cli.command {
        Commands::Consolidate(_) => {
            let report = consolidate_directory(&config)?;
            if report.output.is_none() {
                info!("Nothing written.");
            }
        }
        Commands::Convert(_) => {
            convert_directory(&config)?;
        }
        Commands::ConvertFile(args) => {
            convert_file(&args.input, &args.output, &config)
                .with_context(|| format!("converting {}", args.input.display()))?;
        }
        Commands::NormalizeDate(args) => {
            let date = DateNormalizer::new(&config.dates).normalize(&args.value)?;
            println!("{}", date.compact());
        }
    }

    Ok(())
}
