//! Export view results to CSV and JSON.
//!
//! The CSV exports are meant to be easy to consume in spreadsheets or
//! downstream scripts (one row per date); the JSON exports carry the whole
//! output structure, including the regression and row counts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::{RatePoint, RateTrend, SpreadAnalysis};
use crate::error::AppError;

/// Write the rate series as `date,fixed_30y,fixed_15y,conforming_30y`.
pub fn write_rates_csv(path: &Path, trend: &RateTrend) -> Result<(), AppError> {
    let file = create(path, "export CSV")?;
    write_rates_csv_to(file, trend)?;
    info!(path = %path.display(), rows = trend.len(), "wrote rates csv");
    Ok(())
}

/// Write one row per spread point (raw, derived, and z-scored columns).
pub fn write_spread_csv(path: &Path, analysis: &SpreadAnalysis) -> Result<(), AppError> {
    let file = create(path, "export CSV")?;
    write_spread_csv_to(file, analysis)?;
    info!(path = %path.display(), rows = analysis.n(), "wrote spread csv");
    Ok(())
}

/// Write any view output as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = create(path, "export JSON")?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::output(format!("Failed to write export JSON: {e}")))?;
    info!(path = %path.display(), "wrote json");
    Ok(())
}

pub fn write_rates_csv_to<W: Write>(writer: W, trend: &RateTrend) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (i, &date) in trend.dates.iter().enumerate() {
        let value = |k: usize| trend.traces.get(k).and_then(|t| t.values.get(i)).copied();
        let (Some(fixed_30y), Some(fixed_15y), Some(conforming_30y)) = (value(0), value(1), value(2)) else {
            return Err(AppError::output(format!("Rate traces are shorter than the date axis at row {i}.")));
        };
        wtr.serialize(RatePoint {
            date,
            fixed_30y,
            fixed_15y,
            conforming_30y,
        })
        .map_err(|e| AppError::output(format!("Failed to write export CSV row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::output(format!("Failed to flush export CSV: {e}")))
}

pub fn write_spread_csv_to<W: Write>(writer: W, analysis: &SpreadAnalysis) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for p in &analysis.points {
        wtr.serialize(p)
            .map_err(|e| AppError::output(format!("Failed to write export CSV row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::output(format!("Failed to flush export CSV: {e}")))
}

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create {what} '{}': {e}", path.display())))
}
