//! Coordinate helpers shared by the ASCII, SVG and TUI renderers.

pub mod ascii;

pub use ascii::*;

use chrono::{Datelike, NaiveDate};

/// Map a date onto a continuous axis as a fractional year (e.g. 2024.5).
pub fn date_to_x(date: NaiveDate) -> f64 {
    let days_in_year = if date.leap_year() { 366.0 } else { 365.0 };
    date.year() as f64 + date.ordinal0() as f64 / days_in_year
}

/// Inverse of `date_to_x`, for axis labels.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    let year = x.floor() as i32;
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let days_in_year = if first.leap_year() { 366.0 } else { 365.0 };
    let ordinal0 = ((x - year as f64) * days_in_year).round() as u32;
    first.with_ordinal0(ordinal0.min(days_in_year as u32 - 1))
}

/// `YYYY-MM` axis label for a fractional-year coordinate.
pub fn fmt_year_month(x: f64) -> String {
    x_to_date(x)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Widen a zero-width range so scales never divide by zero.
pub fn nonempty_range(min: f64, max: f64) -> (f64, f64) {
    if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    }
}

/// Pad a range by `frac` of its span on both sides.
pub fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}
