//! `rate-charts` library crate.
//!
//! The binary (`rate-charts`) is a thin wrapper around this library so that:
//!
//! - the statistics and the view pipelines are testable without spawning processes
//! - the CLI, SVG and TUI front-ends share one implementation of each view

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod render;
pub mod report;
pub mod tui;
