//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed from the pipeline to every front-end (terminal, SVG, TUI)
//! - exported to JSON/CSV
//! - asserted on directly in tests

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Input columns of the merged mortgage CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    ObservationDate,
    Fixed30y,
    Fixed15y,
    Conforming30y,
    Delinquency,
}

impl Column {
    /// Header name as it appears in the CSV (after lowercasing).
    pub fn header(self) -> &'static str {
        match self {
            Column::ObservationDate => "observation_date",
            Column::Fixed30y => "30yr_fixed_rate",
            Column::Fixed15y => "15yr_fixed_rate",
            Column::Conforming30y => "30yr_conforming_fico740",
            Column::Delinquency => "delinquency_rate_interpolated",
        }
    }
}

/// Numeric fields the rate-trend view needs on every row.
pub const RATE_FIELDS: [&str; 3] = ["30yr_fixed_rate", "15yr_fixed_rate", "30yr_conforming_fico740"];

/// Numeric fields the spread/delinquency view needs on every row.
pub const SPREAD_FIELDS: [&str; 3] = [
    "delinquency_rate_interpolated",
    "30yr_conforming_fico740",
    "30yr_fixed_rate",
];

/// Default minimum number of valid rows before the spread analysis runs.
pub const DEFAULT_MIN_ROWS: usize = 10;

/// One CSV data row: column name -> raw cell text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source file (0 for rows built in memory).
    pub line: usize,
    pub cells: BTreeMap<String, String>,
}

impl RawRow {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cells.get(name).map(String::as_str)
    }
}

/// A loaded CSV: header names (normalized) and rows.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

/// A row that passed the completeness filter: every required field parsed
/// to a finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub line: usize,
    /// `None` when the row has no parseable `observation_date`.
    pub date: Option<NaiveDate>,
    pub values: BTreeMap<String, f64>,
}

impl Observation {
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// One dated row of the three rate series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub fixed_30y: f64,
    pub fixed_15y: f64,
    pub conforming_30y: f64,
}

/// Which rate a trace plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    Fixed30y,
    Fixed15y,
    Conforming30y,
}

impl RateKind {
    pub const ALL: [RateKind; 3] = [RateKind::Fixed30y, RateKind::Fixed15y, RateKind::Conforming30y];

    /// Legend label.
    pub fn label(self) -> &'static str {
        match self {
            RateKind::Fixed30y => "30-Year Fixed",
            RateKind::Fixed15y => "15-Year Fixed",
            RateKind::Conforming30y => "30-Year Conforming",
        }
    }

    /// Line colour as RGB.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            RateKind::Fixed30y => (0x3b, 0x6e, 0xa1),
            RateKind::Fixed15y => (0xe8, 0x9a, 0x2f),
            RateKind::Conforming30y => (0x1e, 0x6b, 0x2d),
        }
    }

    /// Line colour as `#rrggbb`.
    pub fn hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn value(self, p: &RatePoint) -> f64 {
        match self {
            RateKind::Fixed30y => p.fixed_30y,
            RateKind::Fixed15y => p.fixed_15y,
            RateKind::Conforming30y => p.conforming_30y,
        }
    }
}

/// One line of the rate chart, parallel to `RateTrend::dates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTrace {
    pub kind: RateKind,
    pub label: String,
    pub color: String,
    pub values: Vec<f64>,
}

/// Output of the rate-trend view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTrend {
    pub dates: Vec<NaiveDate>,
    pub traces: Vec<RateTrace>,
    /// Upper bound of the y domain; the lower bound is always 0.
    pub y_max: f64,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

impl RateTrend {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }
}

/// A complete row for the spread analysis plus its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadPoint {
    pub date: NaiveDate,
    pub nonconforming: f64,
    pub conforming: f64,
    pub delinquency: f64,
    /// `nonconforming - conforming`.
    pub spread: f64,
    pub spread_z: f64,
    pub delin_z: f64,
}

/// Least-squares line and Pearson correlation over a full series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    pub correlation: f64,
}

impl RegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Output of the spread/delinquency view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadAnalysis {
    pub points: Vec<SpreadPoint>,
    pub regression: RegressionResult,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub summary: String,
}

impl SpreadAnalysis {
    pub fn n(&self) -> usize {
        self.points.len()
    }

    /// `(spread_z, delin_z)` pairs in date order.
    pub fn z_pairs(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.spread_z, p.delin_z)).collect()
    }

    /// Min/max of `spread_z`, the span the regression line is drawn over.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.points.iter().map(|p| p.spread_z))
    }

    pub fn y_extent(&self) -> Option<(f64, f64)> {
        extent(self.points.iter().map(|p| p.delin_z))
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo.is_finite() && hi.is_finite() { Some((lo, hi)) } else { None }
}

/// Which view a command renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Rates,
    Spread,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` / defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: PathBuf,
    /// Minimum valid rows for the spread analysis.
    pub min_rows: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub svg: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("merged_mortgage_data.csv"),
            min_rows: DEFAULT_MIN_ROWS,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            svg: None,
            export_csv: None,
            export_json: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_kind_hex_matches_palette() {
        assert_eq!(RateKind::Fixed30y.hex(), "#3b6ea1");
        assert_eq!(RateKind::Fixed15y.hex(), "#e89a2f");
        assert_eq!(RateKind::Conforming30y.hex(), "#1e6b2d");
    }

    #[test]
    fn column_headers_are_distinct() {
        let all = [
            Column::ObservationDate,
            Column::Fixed30y,
            Column::Fixed15y,
            Column::Conforming30y,
            Column::Delinquency,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.header(), b.header(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn field_lists_use_column_headers() {
        assert_eq!(
            RATE_FIELDS,
            [
                Column::Fixed30y.header(),
                Column::Fixed15y.header(),
                Column::Conforming30y.header()
            ]
        );
        assert!(SPREAD_FIELDS.contains(&Column::Delinquency.header()));
    }

    #[test]
    fn regression_predict_is_linear() {
        let r = RegressionResult { slope: 2.0, intercept: 1.0, correlation: 1.0 };
        assert_eq!(r.predict(3.0), 7.0);
    }
}
