//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input columns and raw CSV rows (`Column`, `RawRow`, `RawTable`)
//! - filtered observations (`Observation`)
//! - view outputs (`RateTrend`, `SpreadAnalysis`, `RegressionResult`)
//! - run configuration (`RunConfig`)

pub mod types;

pub use types::*;
