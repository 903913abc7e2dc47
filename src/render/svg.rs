//! SVG chart files rendered with Plotters.
//!
//! Both charts are drawn from the pipeline outputs only; nothing here reads
//! the CSV or recomputes statistics. Fixed canvas sizes:
//! - rates: 1100×450, three 2px lines + legend
//! - spread: 800×500, translucent points + dashed fitted line across the x extent

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::domain::{RateTrend, SpreadAnalysis};
use crate::error::AppError;
use crate::plot::{date_to_x, fmt_year_month, nonempty_range, pad_range};

const RATES_SIZE: (u32, u32) = (1100, 450);
const SPREAD_SIZE: (u32, u32) = (800, 500);

const STEELBLUE: RGBColor = RGBColor(70, 130, 180);
const NOTE_GRAY: RGBColor = RGBColor(0x66, 0x66, 0x66);

/// Write the rate-trend chart as SVG.
pub fn write_rates_svg(path: &Path, trend: &RateTrend) -> Result<(), AppError> {
    draw_rates(path, trend)
        .map_err(|e| AppError::output(format!("Failed to render SVG '{}': {e}", path.display())))?;
    info!(path = %path.display(), "wrote rates chart");
    Ok(())
}

/// Write the spread/delinquency scatter as SVG.
pub fn write_spread_svg(path: &Path, analysis: &SpreadAnalysis) -> Result<(), AppError> {
    draw_spread(path, analysis)
        .map_err(|e| AppError::output(format!("Failed to render SVG '{}': {e}", path.display())))?;
    info!(path = %path.display(), "wrote spread chart");
    Ok(())
}

fn draw_rates(path: &Path, trend: &RateTrend) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, RATES_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let xs: Vec<f64> = trend.dates.iter().map(|&d| date_to_x(d)).collect();
    let (x0, x1) = match (xs.first(), xs.last()) {
        (Some(&a), Some(&b)) => nonempty_range(a, b),
        _ => (0.0, 1.0),
    };
    let y1 = if trend.y_max.is_finite() && trend.y_max > 0.0 { trend.y_max } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption("Mortgage Rates Over Time", ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, 0.0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(10)
        .y_labels(8)
        .x_label_formatter(&|v| fmt_year_month(*v))
        .y_label_formatter(&|v| format!("{v:.1}"))
        .y_desc("Rate (%)")
        .draw()?;

    for trace in &trend.traces {
        let (r, g, b) = trace.kind.rgb();
        let color = RGBColor(r, g, b);
        chart
            .draw_series(LineSeries::new(
                xs.iter().copied().zip(trace.values.iter().copied()),
                color.stroke_width(2),
            ))?
            .label(trace.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 7), (x + 18, y + 7)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_spread(path: &Path, analysis: &SpreadAnalysis) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, SPREAD_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (ex0, ex1) = analysis.x_extent().unwrap_or((-1.0, 1.0));
    let (ey0, ey1) = analysis.y_extent().unwrap_or((-1.0, 1.0));
    let (x0, x1) = nonempty_range(ex0, ex1);
    let (px0, px1) = pad_range(x0, x1, 0.03);
    let (ey0, ey1) = nonempty_range(ey0, ey1);
    let (py0, py1) = pad_range(ey0, ey1, 0.03);

    let r = &analysis.regression;
    let caption = format!("Spread vs Delinquency (Z-Scores): r = {:.3}", r.correlation);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(px0..px1, py0..py1)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Spread Z-Score")
        .y_desc("Delinquency Z-Score")
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    // SVG circle radii are integral, so the marker is 3px.
    chart.draw_series(
        analysis
            .points
            .iter()
            .map(|p| Circle::new((p.spread_z, p.delin_z), 3, STEELBLUE.mix(0.6).filled())),
    )?;

    // The fitted line spans the data's x extent, not the padded axis.
    chart.draw_series(DashedLineSeries::new(
        [(x0, r.predict(x0)), (x1, r.predict(x1))],
        5,
        5,
        RED.stroke_width(2),
    ))?;

    let (w, _) = SPREAD_SIZE;
    root.draw(&Text::new(
        format!("n = {} days", analysis.n()),
        (w as i32 - 130, 40),
        ("sans-serif", 12).into_font().color(&NOTE_GRAY),
    ))?;

    root.present()?;
    Ok(())
}
