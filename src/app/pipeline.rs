//! Shared "view pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV load -> completeness filter -> date sort -> derive -> z-score -> regression
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{
    Column, Observation, RATE_FIELDS, RatePoint, RateKind, RateTrace, RateTrend, RawTable, RunConfig,
    SPREAD_FIELDS, SpreadAnalysis, SpreadPoint,
};
use crate::error::AppError;
use crate::io::ingest::{filter_complete, load_table, warn_missing_columns};
use crate::math::{linear_regression, zscore};

/// Load the configured CSV and build the rate-trend view.
pub fn run_rates(config: &RunConfig) -> Result<RateTrend, AppError> {
    let table = load_table(&config.csv_path)?;
    rate_trend(&table)
}

/// Load the configured CSV and build the spread/delinquency view.
pub fn run_spread(config: &RunConfig) -> Result<SpreadAnalysis, AppError> {
    let table = load_table(&config.csv_path)?;
    spread_analysis(&table, config.min_rows)
}

/// Build the three rate traces from a loaded table.
///
/// Rows need all three rates and a date; at least one such row must remain.
pub fn rate_trend(table: &RawTable) -> Result<RateTrend, AppError> {
    warn_missing_columns(table, &RATE_FIELDS);
    let (rows, dropped) = complete_dated_rows(table, &RATE_FIELDS);
    info!(valid = rows.len(), dropped, "rate rows after dropping incomplete");

    if rows.is_empty() {
        return Err(AppError::insufficient_data(0, &RATE_FIELDS));
    }

    let mut points = Vec::with_capacity(rows.len());
    for (date, obs) in &rows {
        points.push(RatePoint {
            date: *date,
            fixed_30y: field(obs, Column::Fixed30y)?,
            fixed_15y: field(obs, Column::Fixed15y)?,
            conforming_30y: field(obs, Column::Conforming30y)?,
        });
    }

    let traces: Vec<RateTrace> = RateKind::ALL
        .iter()
        .map(|&kind| RateTrace {
            kind,
            label: kind.label().to_string(),
            color: kind.hex(),
            values: points.iter().map(|p| kind.value(p)).collect(),
        })
        .collect();

    let y_max = traces
        .iter()
        .flat_map(|t| t.values.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(RateTrend {
        dates: points.iter().map(|p| p.date).collect(),
        traces,
        y_max,
        rows_read: table.rows.len(),
        rows_dropped: dropped,
    })
}

/// Build the standardized spread vs delinquency scatter and its regression.
///
/// # Errors
/// - `InsufficientData` if fewer than `min_rows` complete, dated rows remain
///   (checked before any statistic is computed)
/// - `UndefinedStatistic` if either series has zero spread
pub fn spread_analysis(table: &RawTable, min_rows: usize) -> Result<SpreadAnalysis, AppError> {
    warn_missing_columns(table, &SPREAD_FIELDS);
    let (rows, dropped) = complete_dated_rows(table, &SPREAD_FIELDS);
    info!(valid = rows.len(), dropped, "spread rows after dropping incomplete");

    if rows.len() < min_rows {
        return Err(AppError::insufficient_data(rows.len(), &SPREAD_FIELDS));
    }

    let mut points = Vec::with_capacity(rows.len());
    for (date, obs) in &rows {
        let nonconforming = field(obs, Column::Fixed30y)?;
        let conforming = field(obs, Column::Conforming30y)?;
        points.push(SpreadPoint {
            date: *date,
            nonconforming,
            conforming,
            delinquency: field(obs, Column::Delinquency)?,
            spread: nonconforming - conforming,
            spread_z: 0.0,
            delin_z: 0.0,
        });
    }

    let spreads: Vec<f64> = points.iter().map(|p| p.spread).collect();
    let delinquencies: Vec<f64> = points.iter().map(|p| p.delinquency).collect();

    let spread_z = zscore(&spreads).map_err(|e| AppError::undefined(format!("Spread z-score: {e}")))?;
    let delin_z =
        zscore(&delinquencies).map_err(|e| AppError::undefined(format!("Delinquency z-score: {e}")))?;

    for ((p, sz), dz) in points.iter_mut().zip(spread_z.iter()).zip(delin_z.iter()) {
        p.spread_z = *sz;
        p.delin_z = *dz;
    }

    let regression = linear_regression(&spread_z, &delin_z)?;
    debug!(
        slope = regression.slope,
        intercept = regression.intercept,
        r = regression.correlation,
        "fitted spread/delinquency regression"
    );

    let summary = crate::report::spread_title(regression.correlation, points.len());

    Ok(SpreadAnalysis {
        points,
        regression,
        rows_read: table.rows.len(),
        rows_dropped: dropped,
        summary,
    })
}

/// Filter to complete rows, drop undated ones, and sort ascending by date.
///
/// The sort is stable, so rows sharing a date keep their file order. The
/// returned drop count covers both incomplete and undated rows.
fn complete_dated_rows(table: &RawTable, required: &[&str]) -> (Vec<(NaiveDate, Observation)>, usize) {
    let outcome = filter_complete(&table.rows, required);
    let mut dropped = outcome.dropped;

    let mut rows = Vec::with_capacity(outcome.observations.len());
    for obs in outcome.observations {
        match obs.date {
            Some(date) => rows.push((date, obs)),
            None => {
                debug!(line = obs.line, "dropping row without a parseable observation_date");
                dropped += 1;
            }
        }
    }

    rows.sort_by_key(|(date, _)| *date);
    (rows, dropped)
}

fn field(obs: &Observation, column: Column) -> Result<f64, AppError> {
    obs.value(column.header()).ok_or_else(|| {
        AppError::undefined(format!(
            "Row on line {} has no `{}` value after filtering.",
            obs.line,
            column.header()
        ))
    })
}
