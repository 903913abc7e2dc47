//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - spread view: points `o`, regression line `-`
//! - rate view: one marker per series (`*`, `+`, `.`), connected

use crate::domain::{RateKind, RateTrend, SpreadAnalysis};
use crate::plot::{date_to_x, nonempty_range, pad_range};

/// One thing to draw on the grid.
struct Layer<'a> {
    points: &'a [(f64, f64)],
    ch: char,
    /// Join consecutive points with a line (drawn only into blank cells).
    connect: bool,
}

/// Marker character for a rate series.
pub fn rate_marker(kind: RateKind) -> char {
    match kind {
        RateKind::Fixed30y => '*',
        RateKind::Fixed15y => '+',
        RateKind::Conforming30y => '.',
    }
}

/// Render the spread/delinquency scatter with its regression line.
pub fn render_spread_plot(analysis: &SpreadAnalysis, width: usize, height: usize) -> String {
    let points = analysis.z_pairs();
    let (x_min, x_max) = analysis.x_extent().unwrap_or((-1.0, 1.0));
    let (x_min, x_max) = nonempty_range(x_min, x_max);

    let r = &analysis.regression;
    let line = [(x_min, r.predict(x_min)), (x_max, r.predict(x_max))];

    let (y_min, y_max) = points
        .iter()
        .chain(line.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    let (y_min, y_max) = if y_min.is_finite() && y_max.is_finite() {
        nonempty_range(y_min, y_max)
    } else {
        (-1.0, 1.0)
    };
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let header = format!(
        "Plot: spread_z=[{x_min:.3}, {x_max:.3}] | delin_z=[{y_min:.2}, {y_max:.2}] | r={:.3}\n",
        r.correlation
    );

    let layers = [
        Layer { points: &line, ch: '-', connect: true },
        Layer { points: &points, ch: 'o', connect: false },
    ];
    render_plot(&layers, (x_min, x_max), (y_min, y_max), width, height, header)
}

/// Render the three rate series over time.
pub fn render_rate_plot(trend: &RateTrend, width: usize, height: usize) -> String {
    let xs: Vec<f64> = trend.dates.iter().map(|&d| date_to_x(d)).collect();
    let (x_min, x_max) = match (xs.first(), xs.last()) {
        (Some(&a), Some(&b)) => nonempty_range(a, b),
        _ => (0.0, 1.0),
    };
    let y_max = if trend.y_max.is_finite() && trend.y_max > 0.0 { trend.y_max } else { 1.0 };

    let series: Vec<(char, Vec<(f64, f64)>)> = trend
        .traces
        .iter()
        .map(|t| {
            let pts = xs.iter().copied().zip(t.values.iter().copied()).collect();
            (rate_marker(t.kind), pts)
        })
        .collect();

    let layers: Vec<Layer<'_>> = series
        .iter()
        .map(|(ch, pts)| Layer { points: pts, ch: *ch, connect: true })
        .collect();

    let (first, last) = trend
        .date_range()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
    let legend: Vec<String> = trend
        .traces
        .iter()
        .map(|t| format!("{} {}", rate_marker(t.kind), t.label))
        .collect();
    let header = format!(
        "Plot: dates=[{first}, {last}] | rate=[0.00, {y_max:.2}] | {}\n",
        legend.join("  ")
    );

    render_plot(&layers, (x_min, x_max), (0.0, y_max), width, height, header)
}

fn render_plot(
    layers: &[Layer<'_>],
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
    width: usize,
    height: usize,
    header: String,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut grid = vec![vec![' '; width]; height];

    for layer in layers {
        if layer.connect {
            draw_polyline(&mut grid, layer.points, layer.ch, x_min, x_max, y_min, y_max);
        } else {
            for &(x, y) in layer.points {
                let col = map_x(x, x_min, x_max, width);
                let row = map_y(y, y_min, y_max, height);
                grid[row][col] = layer.ch;
            }
        }
    }

    let mut out = header;
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    ch: char,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, ch),
            None => grid[row][col] = ch,
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{RateTrace, RegressionResult, SpreadPoint};

    fn point(spread_z: f64, delin_z: f64) -> SpreadPoint {
        SpreadPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            nonconforming: 0.0,
            conforming: 0.0,
            delinquency: 0.0,
            spread: 0.0,
            spread_z,
            delin_z,
        }
    }

    #[test]
    fn spread_plot_golden_snapshot_small() {
        let analysis = SpreadAnalysis {
            points: vec![point(-1.0, -1.0), point(1.0, 1.0)],
            regression: RegressionResult { slope: 1.0, intercept: 0.0, correlation: 1.0 },
            rows_read: 2,
            rows_dropped: 0,
            summary: String::new(),
        };

        let txt = render_spread_plot(&analysis, 10, 5);
        let expected = concat!(
            "Plot: spread_z=[-1.000, 1.000] | delin_z=[-1.10, 1.10] | r=1.000\n",
            "        -o\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "o-        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn rate_plot_has_header_legend_and_fixed_grid() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let trend = RateTrend {
            dates: vec![d(4), d(11), d(18)],
            traces: RateKind::ALL
                .iter()
                .zip([6.6, 5.9, 6.3])
                .map(|(&kind, base)| RateTrace {
                    kind,
                    label: kind.label().to_string(),
                    color: kind.hex(),
                    values: vec![base, base + 0.1, base + 0.2],
                })
                .collect(),
            y_max: 6.8,
            rows_read: 3,
            rows_dropped: 0,
        };

        let txt = render_rate_plot(&trend, 40, 12);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("Plot: dates=[2024-01-04, 2024-01-18] | rate=[0.00, 6.80]"));
        assert!(lines[0].contains("* 30-Year Fixed"));
        assert!(lines[1..].iter().all(|l| l.chars().count() == 40));
        for marker in ['*', '+', '.'] {
            assert!(lines[1..].iter().any(|l| l.contains(marker)), "missing {marker}");
        }
    }
}
