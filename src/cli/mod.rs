//! Command-line parsing for the mortgage rate charts.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the statistics code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::DEFAULT_MIN_ROWS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rate-charts", version, about = "Mortgage rate trends and spread vs delinquency charts")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins if set.
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 30-year fixed, 15-year fixed and 30-year conforming rates over time.
    Rates(ViewArgs),
    /// Standardized spread vs delinquency scatter with fitted line and correlation.
    Spread(ViewArgs),
    /// Launch the interactive TUI showing both charts.
    Tui(TuiArgs),
}

/// Where the data comes from.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Merged mortgage CSV.
    #[arg(
        short = 'f',
        long = "file",
        env = "RATES_CSV",
        value_name = "CSV",
        default_value = "merged_mortgage_data.csv"
    )]
    pub csv: PathBuf,

    /// Minimum complete rows required by the spread analysis.
    #[arg(long, default_value_t = DEFAULT_MIN_ROWS)]
    pub min_rows: usize,
}

/// Options shared by the `rates` and `spread` views.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Render the chart to an SVG file.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Export the view's rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full view output (including regression/counts) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for the interactive viewer.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,
}
