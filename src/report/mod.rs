//! Reporting utilities: chart titles and formatted terminal summaries.
//!
//! We keep formatting code in one place so:
//! - the math/pipeline code stays clean and testable
//! - output changes are localized (the SVG, TUI and terminal all share titles)

use crate::domain::{RateTrend, SpreadAnalysis};

/// Title of the spread chart, embedding `r` (3 decimals) and the sample count.
pub fn spread_title(correlation: f64, n: usize) -> String {
    format!("Spread vs Delinquency (Z-Scores): r = {correlation:.3}, n = {n} days")
}

/// Format the rate-trend summary: coverage, per-series range, latest values.
pub fn format_rate_summary(trend: &RateTrend) -> String {
    let mut out = String::new();

    out.push_str("=== Mortgage Rates Over Time ===\n");
    out.push_str(&format!(
        "Rows: read={} | used={} | dropped={}\n",
        trend.rows_read,
        trend.len(),
        trend.rows_dropped
    ));
    if let Some((first, last)) = trend.date_range() {
        out.push_str(&format!("Dates: {first} .. {last}\n"));
    }
    out.push_str(&format!("Y domain: [0.00, {:.2}]\n", trend.y_max));

    out.push_str("\nSeries:\n");
    for trace in &trend.traces {
        let (lo, hi) = trace
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let latest = trace.values.last().copied().unwrap_or(f64::NAN);
        out.push_str(&format!(
            "  {} {:<20} min={:.2} max={:.2} latest={:.2}\n",
            trace.color, trace.label, lo, hi, latest
        ));
    }

    out
}

/// Format the spread/delinquency summary: title, counts, fitted line.
pub fn format_spread_summary(analysis: &SpreadAnalysis) -> String {
    let mut out = String::new();
    let r = &analysis.regression;

    out.push_str(&format!("=== {} ===\n", analysis.summary));
    out.push_str(&format!(
        "Rows: read={} | used={} | dropped={}\n",
        analysis.rows_read,
        analysis.n(),
        analysis.rows_dropped
    ));
    if let (Some(first), Some(last)) = (analysis.points.first(), analysis.points.last()) {
        out.push_str(&format!("Dates: {} .. {}\n", first.date, last.date));
    }

    out.push_str("\nRegression (delinquency_z on spread_z):\n");
    out.push_str(&format!("- slope      : {:.4}\n", r.slope));
    out.push_str(&format!("- intercept  : {:.4}\n", r.intercept));
    out.push_str(&format!("- correlation: {:.3}\n", r.correlation));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RateKind, RateTrace, RegressionResult, SpreadPoint};
    use chrono::NaiveDate;

    #[test]
    fn spread_title_rounds_to_three_decimals() {
        assert_eq!(
            spread_title(0.123456, 250),
            "Spread vs Delinquency (Z-Scores): r = 0.123, n = 250 days"
        );
        assert_eq!(
            spread_title(-0.9996, 12),
            "Spread vs Delinquency (Z-Scores): r = -1.000, n = 12 days"
        );
    }

    #[test]
    fn rate_summary_lists_each_series() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let trend = RateTrend {
            dates: vec![d(4), d(11)],
            traces: RateKind::ALL
                .iter()
                .map(|&kind| RateTrace {
                    kind,
                    label: kind.label().to_string(),
                    color: kind.hex(),
                    values: vec![6.0, 6.5],
                })
                .collect(),
            y_max: 6.5,
            rows_read: 3,
            rows_dropped: 1,
        };

        let txt = format_rate_summary(&trend);
        assert!(txt.contains("Rows: read=3 | used=2 | dropped=1"));
        assert!(txt.contains("Dates: 2024-01-04 .. 2024-01-11"));
        assert!(txt.contains("30-Year Conforming"));
        assert!(txt.contains("latest=6.50"));
    }

    #[test]
    fn spread_summary_shows_fit() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let point = SpreadPoint {
            date,
            nonconforming: 6.6,
            conforming: 6.3,
            delinquency: 1.7,
            spread: 0.3,
            spread_z: 0.0,
            delin_z: 0.0,
        };
        let analysis = SpreadAnalysis {
            points: vec![point.clone(), point],
            regression: RegressionResult { slope: 0.25, intercept: 0.0, correlation: 0.25 },
            rows_read: 2,
            rows_dropped: 0,
            summary: spread_title(0.25, 2),
        };

        let txt = format_spread_summary(&analysis);
        assert!(txt.starts_with("=== Spread vs Delinquency (Z-Scores): r = 0.250, n = 2 days ==="));
        assert!(txt.contains("- slope      : 0.2500"));
    }
}
