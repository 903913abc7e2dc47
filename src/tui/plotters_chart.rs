//! Plotters-powered chart widget for Ratatui.
//!
//! Both TUI views (rate lines and the z-score scatter) go through this one
//! widget. Plotters output is drawn into the Ratatui buffer using
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Line,
    Dots,
}

/// One data series with its colour.
pub struct Series<'a> {
    pub points: &'a [(f64, f64)],
    pub color: RGBColor,
    pub mark: Mark,
}

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct PlottersChart<'a> {
    /// Drawn in order; later series paint over earlier ones.
    pub series: &'a [Series<'a>],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for PlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for series in self.series {
                match series.mark {
                    Mark::Line => {
                        chart.draw_series(LineSeries::new(series.points.iter().copied(), &series.color))?;
                    }
                    // `Circle` radii are mis-scaled by the ratatui backend; a
                    // coloured `Pixel` reads as a clean dot in a terminal.
                    Mark::Dots => {
                        chart.draw_series(
                            series
                                .points
                                .iter()
                                .map(|&(x, y)| Pixel::new((x, y), series.color)),
                        )?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
