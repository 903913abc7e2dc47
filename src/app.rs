//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - runs the requested view pipeline
//! - prints reports/plots
//! - writes optional SVG and exports

use clap::Parser;

use crate::cli::{Command, DataArgs, ViewArgs};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `rate-charts` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may set RATES_CSV / RUST_LOG; load it before clap reads env vars.
    dotenvy::dotenv().ok();

    // `rate-charts` and `rate-charts -f data.csv` behave like `rate-charts tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let is_tui = matches!(cli.command, Command::Tui(_));
    crate::logging::init(cli.verbose, is_tui);

    match cli.command {
        Command::Rates(args) => handle_rates(&config_from_view_args(&args)),
        Command::Spread(args) => handle_spread(&config_from_view_args(&args)),
        Command::Tui(args) => crate::tui::run(config_from_data_args(&args.data)),
    }
}

fn handle_rates(config: &RunConfig) -> Result<(), AppError> {
    let trend = pipeline::run_rates(config)?;

    println!("{}", crate::report::format_rate_summary(&trend));
    if config.plot {
        println!(
            "{}",
            crate::plot::render_rate_plot(&trend, config.plot_width, config.plot_height)
        );
    }

    if let Some(path) = &config.svg {
        crate::render::write_rates_svg(path, &trend)?;
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_rates_csv(path, &trend)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_json(path, &trend)?;
    }

    Ok(())
}

fn handle_spread(config: &RunConfig) -> Result<(), AppError> {
    let analysis = pipeline::run_spread(config)?;

    println!("{}", crate::report::format_spread_summary(&analysis));
    if config.plot {
        println!(
            "{}",
            crate::plot::render_spread_plot(&analysis, config.plot_width, config.plot_height)
        );
    }

    if let Some(path) = &config.svg {
        crate::render::write_spread_svg(path, &analysis)?;
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_spread_csv(path, &analysis)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_json(path, &analysis)?;
    }

    Ok(())
}

pub fn config_from_view_args(args: &ViewArgs) -> RunConfig {
    RunConfig {
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        svg: args.svg.clone(),
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
        ..config_from_data_args(&args.data)
    }
}

pub fn config_from_data_args(args: &DataArgs) -> RunConfig {
    RunConfig {
        csv_path: args.csv.clone(),
        min_rows: args.min_rows,
        ..RunConfig::default()
    }
}

/// Rewrite argv so `rate-charts` defaults to `rate-charts tui`.
///
/// Rules:
/// - `rate-charts`                      -> `rate-charts tui`
/// - `rate-charts -f data.csv ...`      -> `rate-charts tui -f data.csv ...`
/// - `rate-charts --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "rates" | "spread" | "tui");
    if is_subcommand {
        return argv;
    }

    // A leading `-v` is a global flag; the subcommand may still follow it.
    if argv
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "rates" | "spread" | "tui"))
    {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
