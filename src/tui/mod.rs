//! Ratatui-based terminal UI.
//!
//! Two tabs over the same CSV: the rate trends and the spread/delinquency
//! scatter. The file can be reloaded in place.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
};

use crate::app::pipeline::{rate_trend, spread_analysis};
use crate::domain::{RateTrend, RunConfig, SpreadAnalysis, View};
use crate::error::AppError;
use crate::io::ingest::load_table;
use crate::plot::{date_to_x, fmt_year_month, nonempty_range, pad_range};

mod plotters_chart;

use plotters_chart::{Mark, PlottersChart, Series};

/// Start the TUI.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::output(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::output(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::output(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: RunConfig,
    view: View,
    status: String,
    rates: Result<RateTrend, AppError>,
    spread: Result<SpreadAnalysis, AppError>,
}

impl App {
    fn new(config: RunConfig) -> Self {
        let mut app = Self {
            config,
            view: View::Rates,
            status: String::new(),
            rates: Err(AppError::load("Not loaded yet.")),
            spread: Err(AppError::load("Not loaded yet.")),
        };
        app.reload();
        app
    }

    /// Re-read the CSV and rebuild both views. Failures land in the views and
    /// the status line; the UI keeps running.
    fn reload(&mut self) {
        let path = self.config.csv_path.display().to_string();
        match load_table(&self.config.csv_path) {
            Ok(table) => {
                self.rates = rate_trend(&table);
                self.spread = spread_analysis(&table, self.config.min_rows);
                self.status = format!("Loaded {path} ({} rows).", table.rows.len());
            }
            Err(err) => {
                self.status = err.to_string();
                self.rates = Err(err.clone());
                self.spread = Err(err);
            }
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::output(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::output(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::output(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.view = match self.view {
                    View::Rates => View::Spread,
                    View::Spread => View::Rates,
                };
            }
            KeyCode::Char('1') => self.view = View::Rates,
            KeyCode::Char('2') => self.view = View::Spread,
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_tabs(frame, chunks[0]);
        self.draw_header(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let selected = match self.view {
            View::Rates => 0,
            View::Spread => 1,
        };
        let tabs = Tabs::new(vec!["1 Rates", "2 Spread vs Delinquency"])
            .select(selected)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().title("rate-charts").borders(Borders::ALL));
        frame.render_widget(tabs, area);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = match self.view {
            View::Rates => rates_header(&self.rates),
            View::Spread => spread_header(&self.spread),
        };
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::LEFT | Borders::RIGHT));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.view {
            View::Rates => "Mortgage Rates Over Time",
            View::Spread => "Spread vs Delinquency (Z-Scores)",
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        match self.view {
            View::Rates => match &self.rates {
                Ok(trend) => {
                    let data = rate_series(trend);
                    let series: Vec<Series<'_>> = data
                        .iter()
                        .map(|(points, color)| Series {
                            points,
                            color: *color,
                            mark: Mark::Line,
                        })
                        .collect();
                    let (x_bounds, y_bounds) = rate_bounds(trend);
                    let chart = PlottersChart {
                        series: &series,
                        x_bounds,
                        y_bounds,
                        x_label: "date",
                        y_label: "rate (%)",
                        fmt_x: fmt_year_month,
                        fmt_y: fmt_axis_rate,
                    };
                    frame.render_widget(chart, inner);
                }
                Err(err) => render_error(frame, inner, err),
            },
            View::Spread => match &self.spread {
                Ok(analysis) => {
                    let points = analysis.z_pairs();
                    let (x_bounds, y_bounds) = spread_bounds(analysis);
                    let fit = fit_line(analysis, x_bounds);
                    let series = [
                        Series {
                            points: &points,
                            color: RGBColor(255, 255, 255),
                            mark: Mark::Dots,
                        },
                        Series {
                            points: &fit,
                            color: RGBColor(0, 255, 255),
                            mark: Mark::Line,
                        },
                    ];
                    let chart = PlottersChart {
                        series: &series,
                        x_bounds,
                        y_bounds,
                        x_label: "spread z",
                        y_label: "delinquency z",
                        fmt_x: fmt_axis_z,
                        fmt_y: fmt_axis_z,
                    };
                    frame.render_widget(chart, inner);
                }
                Err(err) => render_error(frame, inner, err),
            },
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/1/2 switch view  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn render_error(frame: &mut ratatui::Frame<'_>, area: Rect, err: &AppError) {
    let msg = Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red));
    frame.render_widget(msg, area);
}

fn rates_header(rates: &Result<RateTrend, AppError>) -> Vec<Line<'static>> {
    let Ok(trend) = rates else {
        return vec![Line::from(Span::styled("No rate data.", Style::default().fg(Color::Red)))];
    };

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "rows: used={} dropped={} | y: [0.00, {:.2}]",
            trend.len(),
            trend.rows_dropped,
            trend.y_max
        ),
        Style::default().fg(Color::Gray),
    ))];
    if let Some((first, last)) = trend.date_range() {
        lines.push(Line::from(Span::styled(
            format!("dates: {first} .. {last}"),
            Style::default().fg(Color::Gray),
        )));
    }

    // Legend: label in the trace colour with its latest value.
    let legend: Vec<Span<'static>> = trend
        .traces
        .iter()
        .flat_map(|trace| {
            let (r, g, b) = trace.kind.rgb();
            let latest = trace.values.last().copied().unwrap_or(f64::NAN);
            [
                Span::styled(format!("■ {}", trace.label), Style::default().fg(Color::Rgb(r, g, b))),
                Span::raw(format!(" {latest:.2}   ")),
            ]
        })
        .collect();
    lines.push(Line::from(legend));
    lines
}

fn spread_header(spread: &Result<SpreadAnalysis, AppError>) -> Vec<Line<'static>> {
    let Ok(analysis) = spread else {
        return vec![Line::from(Span::styled("No spread analysis.", Style::default().fg(Color::Red)))];
    };

    let r = &analysis.regression;
    vec![
        Line::from(Span::styled(analysis.summary.clone(), Style::default().fg(Color::Cyan))),
        Line::from(Span::styled(
            format!(
                "slope={:.4} intercept={:.4} | rows: used={} dropped={}",
                r.slope,
                r.intercept,
                analysis.n(),
                analysis.rows_dropped
            ),
            Style::default().fg(Color::Gray),
        )),
    ]
}

/// Per-trace `(x, y)` points with a terminal colour.
fn rate_series(trend: &RateTrend) -> Vec<(Vec<(f64, f64)>, RGBColor)> {
    let xs: Vec<f64> = trend.dates.iter().map(|&d| date_to_x(d)).collect();
    trend
        .traces
        .iter()
        .map(|trace| {
            let (r, g, b) = trace.kind.rgb();
            let points = xs.iter().copied().zip(trace.values.iter().copied()).collect();
            (points, RGBColor(r, g, b))
        })
        .collect()
}

/// X spans the dates; Y runs from 0 to the largest rate.
fn rate_bounds(trend: &RateTrend) -> ([f64; 2], [f64; 2]) {
    let (x0, x1) = match trend.date_range() {
        Some((first, last)) => nonempty_range(date_to_x(first), date_to_x(last)),
        None => (0.0, 1.0),
    };
    let y1 = if trend.y_max > 0.0 { trend.y_max } else { 1.0 };
    ([x0, x1], [0.0, y1])
}

fn spread_bounds(analysis: &SpreadAnalysis) -> ([f64; 2], [f64; 2]) {
    let (x0, x1) = analysis.x_extent().unwrap_or((-1.0, 1.0));
    let (y0, y1) = analysis.y_extent().unwrap_or((-1.0, 1.0));
    let (x0, x1) = pad_range(x0, x1, 0.05);
    let (y0, y1) = pad_range(y0, y1, 0.05);
    ([x0, x1], [y0, y1])
}

/// Fitted line across the x bounds, clipped to nothing when non-finite.
fn fit_line(analysis: &SpreadAnalysis, x_bounds: [f64; 2]) -> Vec<(f64, f64)> {
    x_bounds
        .iter()
        .map(|&x| (x, analysis.regression.predict(x)))
        .filter(|(_, y)| y.is_finite())
        .collect()
}

fn fmt_axis_rate(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt_axis_z(v: f64) -> String {
    format!("{v:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RateKind, RateTrace, RegressionResult, SpreadPoint};
    use chrono::NaiveDate;

    fn trend() -> RateTrend {
        RateTrend {
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            ],
            traces: vec![RateTrace {
                kind: RateKind::Fixed30y,
                label: RateKind::Fixed30y.label().to_string(),
                color: RateKind::Fixed30y.hex(),
                values: vec![6.5, 7.0],
            }],
            y_max: 7.0,
            rows_read: 2,
            rows_dropped: 0,
        }
    }

    fn app_with(rates: Result<RateTrend, AppError>) -> App {
        App {
            config: RunConfig::default(),
            view: View::Rates,
            status: String::new(),
            rates,
            spread: Err(AppError::load("none")),
        }
    }

    #[test]
    fn keys_switch_views_and_quit() {
        let mut app = app_with(Ok(trend()));
        assert!(!app.handle_key(KeyCode::Tab));
        assert_eq!(app.view, View::Spread);
        assert!(!app.handle_key(KeyCode::Char('1')));
        assert_eq!(app.view, View::Rates);
        assert!(!app.handle_key(KeyCode::Char('2')));
        assert_eq!(app.view, View::Spread);
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn reload_of_missing_file_reports_in_status() {
        let mut app = app_with(Ok(trend()));
        app.config.csv_path = std::env::temp_dir().join("rate_charts_tui_missing.csv");
        app.reload();
        assert!(app.status.starts_with("Error loading data from"));
        assert!(app.rates.is_err());
        assert!(app.spread.is_err());
    }

    #[test]
    fn rate_bounds_start_at_zero() {
        let (x, y) = rate_bounds(&trend());
        assert!(x[0] < x[1]);
        assert_eq!(y, [0.0, 7.0]);
    }

    #[test]
    fn rate_series_pairs_dates_with_values() {
        let series = rate_series(&trend());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].0.len(), 2);
        assert_eq!(series[0].0[1].1, 7.0);
        assert_eq!(series[0].1, RGBColor(0x3b, 0x6e, 0xa1));
    }

    #[test]
    fn fit_line_spans_x_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let point = |z: f64| SpreadPoint {
            date,
            nonconforming: 0.0,
            conforming: 0.0,
            delinquency: 0.0,
            spread: 0.0,
            spread_z: z,
            delin_z: z,
        };
        let analysis = SpreadAnalysis {
            points: vec![point(-1.0), point(1.0)],
            regression: RegressionResult {
                slope: 0.5,
                intercept: 0.0,
                correlation: 1.0,
            },
            rows_read: 2,
            rows_dropped: 0,
            summary: String::new(),
        };
        let line = fit_line(&analysis, [-2.0, 2.0]);
        assert_eq!(line, vec![(-2.0, -1.0), (2.0, 1.0)]);
    }
}
