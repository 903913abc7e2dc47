//! CSV ingest and the completeness filter.
//!
//! This module is responsible for turning the merged mortgage CSV into rows
//! that are safe to analyze.
//!
//! Design goals:
//! - **Raw first**: loading keeps every cell as text; nothing is parsed until
//!   a view says which fields it needs
//! - **Row-level validation** (drop incomplete rows, but report how many)
//! - **Deterministic behavior** (stable order, no hidden defaults)
//! - **Separation of concerns**: no statistics here

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{Column, Observation, RawRow, RawTable};
use crate::error::AppError;

/// Result of `filter_complete`: surviving rows in input order + drop count.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub observations: Vec<Observation>,
    pub dropped: usize,
}

/// Load a CSV file into a `RawTable`.
pub fn load_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::load(format!("Error loading data from '{}': {e}", path.display()))
    })?;

    let table = load_table_from_reader(file).map_err(|e| {
        AppError::load(format!("Error loading data from '{}': {e}", path.display()))
    })?;

    debug!(path = %path.display(), rows = table.rows.len(), "loaded csv");
    Ok(table)
}

/// Load CSV text from any reader.
///
/// Ragged rows are accepted: a row shorter than the header simply has no
/// cell for the trailing columns. A record that cannot be decoded fails the
/// whole load.
pub fn load_table_from_reader<R: Read>(reader: R) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::load(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(normalize_header_name)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(AppError::load("CSV has no header row."));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::load(format!("CSV parse error on line {line}: {e}")))?;
        rows.push(raw_row(line, &headers, &record));
    }

    Ok(RawTable { headers, rows })
}

fn raw_row(line: usize, headers: &[String], record: &StringRecord) -> RawRow {
    let cells = headers
        .iter()
        .zip(record.iter())
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect();
    RawRow { line, cells }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM; if we
    // don't strip it, `observation_date` is never found.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Keep rows whose `required` fields are all present and finite numbers.
///
/// - an empty (or whitespace-only) cell is *missing*, never zero
/// - `NaN`, `inf` and unparseable text are invalid
/// - surviving rows keep input order
///
/// The date column is parsed when present but is not required here; callers
/// that need dates decide what to do with undated rows.
pub fn filter_complete(rows: &[RawRow], required: &[&str]) -> FilterOutcome {
    let mut observations = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        match complete_values(row, required) {
            Some(values) => observations.push(Observation {
                line: row.line,
                date: row
                    .get(Column::ObservationDate.header())
                    .and_then(|s| parse_date(s).ok()),
                values,
            }),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, kept = observations.len(), "dropped incomplete rows");
    }

    FilterOutcome { observations, dropped }
}

fn complete_values(row: &RawRow, required: &[&str]) -> Option<BTreeMap<String, f64>> {
    let mut values = BTreeMap::new();
    for &name in required {
        let v = parse_number(row.get(name))?;
        values.insert(name.to_string(), v);
    }
    Some(values)
}

/// Warn once per view about required columns the header doesn't have.
///
/// Every row will then be dropped by `filter_complete`, which surfaces as
/// insufficient data rather than a load failure.
pub fn warn_missing_columns(table: &RawTable, required: &[&str]) {
    for name in required {
        if !table.has_column(name) {
            warn!(column = *name, "required column not found in CSV header");
        }
    }
}

/// Parse an observation date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // The merged data uses ISO dates, but a CSV round-tripped through a
    // spreadsheet often comes back as `MM/DD/YYYY`. Accept a small fixed set.
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, MM/DD/YYYY, YYYY/MM/DD."
    ))
}

fn parse_number(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: usize, cells: &[(&str, &str)]) -> RawRow {
        RawRow {
            line,
            cells: cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn filter_complete_drops_rows_with_missing_fields() {
        let rows = vec![
            row(2, &[("a", "1"), ("b", "2")]),
            row(3, &[("a", ""), ("b", "2")]),
            row(4, &[("a", "3"), ("b", "")]),
        ];

        let out = filter_complete(&rows, &["a", "b"]);
        assert_eq!(out.dropped, 2);
        assert_eq!(out.observations.len(), 1);

        let kept = &out.observations[0];
        assert_eq!(kept.line, 2);
        assert_eq!(kept.value("a"), Some(1.0));
        assert_eq!(kept.value("b"), Some(2.0));
        assert_eq!(kept.date, None);
    }

    #[test]
    fn filter_complete_rejects_non_finite_and_garbage() {
        let rows = vec![
            row(2, &[("a", "NaN")]),
            row(3, &[("a", "inf")]),
            row(4, &[("a", "n/a")]),
            row(5, &[("a", "   ")]),
            row(6, &[("b", "1")]),
            row(7, &[("a", " 4.25 ")]),
        ];

        let out = filter_complete(&rows, &["a"]);
        assert_eq!(out.dropped, 5);
        assert_eq!(out.observations.len(), 1);
        assert_eq!(out.observations[0].value("a"), Some(4.25));
    }

    #[test]
    fn filter_complete_keeps_input_order() {
        let rows: Vec<RawRow> = [5.0, 1.0, 3.0, 2.0]
            .iter()
            .enumerate()
            .map(|(i, v)| row(i + 2, &[("a", v.to_string().as_str())]))
            .collect();

        let out = filter_complete(&rows, &["a"]);
        let values: Vec<f64> = out.observations.iter().filter_map(|o| o.value("a")).collect();
        assert_eq!(values, vec![5.0, 1.0, 3.0, 2.0]);
        assert_eq!(out.dropped, 0);
    }

    #[test]
    fn filter_complete_zero_is_a_value() {
        let out = filter_complete(&[row(2, &[("a", "0")])], &["a"]);
        assert_eq!(out.dropped, 0);
        assert_eq!(out.observations[0].value("a"), Some(0.0));
    }

    #[test]
    fn filter_complete_parses_dates_when_present() {
        let out = filter_complete(
            &[row(2, &[("observation_date", "2024-03-01"), ("a", "1")])],
            &["a"],
        );
        assert_eq!(out.observations[0].date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn load_table_normalizes_headers_and_handles_ragged_rows() {
        let csv = "\u{feff}Observation_Date, 30YR_FIXED_RATE ,15yr_fixed_rate\n\
                   2024-01-04,6.62,5.89\n\
                   2024-01-11,6.66\n";
        let table = load_table_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(
            table.headers,
            vec!["observation_date", "30yr_fixed_rate", "15yr_fixed_rate"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[0].get("15yr_fixed_rate"), Some("5.89"));
        assert_eq!(table.rows[1].get("30yr_fixed_rate"), Some("6.66"));
        assert_eq!(table.rows[1].get("15yr_fixed_rate"), None);
    }

    #[test]
    fn load_table_empty_input_is_a_load_failure() {
        let err = load_table_from_reader("".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::LoadFailure);
    }

    #[test]
    fn load_table_missing_file_is_a_load_failure() {
        let err = load_table(Path::new("definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::LoadFailure);
        assert!(err.to_string().starts_with("Error loading data"));
    }

    #[test]
    fn parse_date_accepts_known_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 7, 14).unwrap();
        assert_eq!(parse_date("2023-07-14").unwrap(), expected);
        assert_eq!(parse_date("07/14/2023").unwrap(), expected);
        assert_eq!(parse_date("2023/07/14").unwrap(), expected);
        assert!(parse_date("14.07.2023").is_err());
    }
}
