use std::f64::consts::PI;

use anyhow::{anyhow, bail, Result};
use leptos::{html::Canvas, HtmlElement};
use tracing::{debug, error};
use wasm_bindgen::JsCast;
use web_sys::CanvasRenderingContext2d;

use super::derive::{DistributionSlice, ParameterSeries};

const BACKGROUND: &str = "#13171f";
const AXIS: &str = "#b0b8d4";
const GRID: &str = "rgba(255, 255, 255, 0.05)";

const SLICE_COLORS: [&str; 8] = [
    "rgba(26, 35, 126, 0.8)",
    "rgba(2, 136, 209, 0.8)",
    "rgba(0, 191, 165, 0.8)",
    "rgba(83, 75, 174, 0.8)",
    "rgba(94, 184, 255, 0.8)",
    "rgba(93, 242, 214, 0.8)",
    "rgba(0, 91, 159, 0.8)",
    "rgba(0, 142, 118, 0.8)",
];

const FLOWRATE_COLOR: &str = "rgba(0, 191, 165, 0.7)";
const PRESSURE_COLOR: &str = "rgba(2, 136, 209, 0.7)";
const TEMPERATURE_COLOR: &str = "rgba(245, 158, 11, 1)";
const TEMPERATURE_FILL: &str = "rgba(245, 158, 11, 0.2)";

const Y_TICKS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Distribution(Vec<DistributionSlice>),
    Parameters(ParameterSeries),
    Temperature(ParameterSeries),
}

/// Drawing region inside the canvas, leaving room for axis labels and legend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            left: 56.0,
            top: 32.0,
            right: (width - 16.0).max(56.0),
            bottom: (height - 40.0).max(32.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

pub struct ChartCanvas {
    ctx: CanvasRenderingContext2d,
}

impl ChartCanvas {
    pub fn try_new(node: &HtmlElement<Canvas>) -> Result<Self> {
        #[derive(serde::Serialize)]
        struct ContextOptions {
            alpha: bool,
        }

        let ctx = node
            .get_context_with_context_options(
                "2d",
                &serde_wasm_bindgen::to_value(&ContextOptions { alpha: false })
                    .map_err(|err| anyhow!("context options serialization error: {err}"))?,
            )
            .map_err(|err| anyhow!("{err:?}"))?;
        let Some(ctx) = ctx else {
            bail!("canvas' 2d context not found");
        };

        let ctx = ctx
            .dyn_into()
            .map_err(|err| anyhow!("context dyn conversion error: {err:?}"))?;

        Ok(Self { ctx })
    }

    pub fn render(&mut self, chart: &Chart, width: f64, height: f64, dpr: f64) {
        debug!("rendering chart");

        if width < f64::EPSILON || height < f64::EPSILON {
            return;
        }

        self.ctx.save();
        if let Err(err) = self.ctx.scale(dpr, dpr) {
            error!(dpr, "context scaling failed: {err:?}");
        }
        self.ctx.set_font("12px Inter, Arial");
        self.ctx.set_fill_style(&BACKGROUND.into());
        self.ctx.fill_rect(0.0, 0.0, width, height);

        match chart {
            Chart::Distribution(slices) => self.render_distribution(slices, width, height),
            Chart::Parameters(series) => self.render_parameters(series, width, height),
            Chart::Temperature(series) => self.render_temperature(series, width, height),
        }

        self.ctx.restore();
    }

    fn render_distribution(&mut self, slices: &[DistributionSlice], width: f64, height: f64) {
        debug!(slices = slices.len(), "rendering distribution");

        let angles = slice_angles(slices);
        if angles.is_empty() {
            self.render_empty("No equipment types", width, height);
            return;
        }

        let legend_width = 160.0_f64.min(width / 3.0);
        let radius = ((width - legend_width).min(height) / 2.0 - 16.0).max(8.0);
        let cx = (width - legend_width) / 2.0;
        let cy = height / 2.0;

        for (index, (start, end)) in angles.iter().enumerate() {
            self.ctx.begin_path();
            self.ctx.move_to(cx, cy);
            if let Err(err) = self.ctx.arc(cx, cy, radius, *start, *end) {
                error!("arc drawing error: {err:?}");
            }
            self.ctx.close_path();
            self.ctx.set_fill_style(&get_color(index).into());
            self.ctx.fill();
            self.ctx.set_stroke_style(&BACKGROUND.into());
            self.ctx.set_line_width(2.0);
            self.ctx.stroke();
        }

        let entries = slices
            .iter()
            .enumerate()
            .map(|(index, slice)| {
                (
                    format!("{} ({:.1}%)", slice.equipment_type, slice.percentage),
                    get_color(index),
                )
            })
            .collect::<Vec<_>>();
        self.render_legend(&entries, width - legend_width + 8.0, 24.0);
    }

    fn render_parameters(&mut self, series: &ParameterSeries, width: f64, height: f64) {
        debug!(types = series.labels.len(), "rendering parameters");

        if series.is_empty() {
            self.render_empty("No records to average", width, height);
            return;
        }

        let area = PlotArea::new(width, height);
        let (lower, upper) = value_range(series.flowrate.iter().chain(&series.pressure));
        self.render_axes(&series.labels, lower, upper, area);

        #[expect(clippy::cast_precision_loss)]
        let band = area.width() / series.labels.len() as f64;
        let bar_width = band * 0.35;
        let zero = value_to_y(0.0_f64.max(lower), lower, upper, area);

        for (index, (flowrate, pressure)) in series.flowrate.iter().zip(&series.pressure).enumerate() {
            let center = band_center(index, series.labels.len(), area);

            for (offset, value, color) in [
                (-bar_width, *flowrate, FLOWRATE_COLOR),
                (0.0, *pressure, PRESSURE_COLOR),
            ] {
                let y = value_to_y(value, lower, upper, area);
                self.ctx.set_fill_style(&color.into());
                self.ctx
                    .fill_rect(center + offset, y.min(zero), bar_width, (zero - y).abs());
            }
        }

        self.render_legend(
            &[
                ("Avg Flowrate (m³/h)".to_string(), FLOWRATE_COLOR),
                ("Avg Pressure (bar)".to_string(), PRESSURE_COLOR),
            ],
            area.left + 8.0,
            16.0,
        );
    }

    fn render_temperature(&mut self, series: &ParameterSeries, width: f64, height: f64) {
        debug!(types = series.labels.len(), "rendering temperature");

        if series.is_empty() {
            self.render_empty("No records to average", width, height);
            return;
        }

        let area = PlotArea::new(width, height);
        let (lower, upper) = value_range(series.temperature.iter());
        self.render_axes(&series.labels, lower, upper, area);

        let points = series
            .temperature
            .iter()
            .enumerate()
            .map(|(index, value)| {
                (
                    band_center(index, series.labels.len(), area),
                    value_to_y(*value, lower, upper, area),
                )
            })
            .collect::<Vec<_>>();

        let baseline = value_to_y(0.0_f64.max(lower), lower, upper, area);

        if let (Some((first_x, _)), Some((last_x, _))) = (points.first(), points.last()) {
            self.ctx.begin_path();
            self.ctx.move_to(*first_x, baseline);
            for (x, y) in &points {
                self.ctx.line_to(*x, *y);
            }
            self.ctx.line_to(*last_x, baseline);
            self.ctx.close_path();
            self.ctx.set_fill_style(&TEMPERATURE_FILL.into());
            self.ctx.fill();
        }

        self.ctx.begin_path();
        for (x, y) in &points {
            self.ctx.line_to(*x, *y);
        }
        self.ctx.set_stroke_style(&TEMPERATURE_COLOR.into());
        self.ctx.set_line_width(3.0);
        self.ctx.stroke();

        for (x, y) in &points {
            self.ctx.begin_path();
            if let Err(err) = self.ctx.arc(*x, *y, 6.0, 0.0, 2.0 * PI) {
                error!("arc drawing error: {err:?}");
            }
            self.ctx.set_fill_style(&TEMPERATURE_COLOR.into());
            self.ctx.fill();
            self.ctx.set_stroke_style(&"#fff".into());
            self.ctx.set_line_width(2.0);
            self.ctx.stroke();
        }

        self.render_legend(
            &[("Avg Temperature (°C)".to_string(), TEMPERATURE_COLOR)],
            area.left + 8.0,
            16.0,
        );
    }

    fn render_axes(&mut self, labels: &[String], lower: f64, upper: f64, area: PlotArea) {
        self.ctx.set_line_width(1.0);
        self.ctx.set_text_align("right");

        for tick in 0..=Y_TICKS {
            let value = lower + (upper - lower) * f64::from(tick) / f64::from(Y_TICKS);
            let y = value_to_y(value, lower, upper, area);

            self.ctx.begin_path();
            self.ctx.move_to(area.left, y);
            self.ctx.line_to(area.right, y);
            self.ctx.set_stroke_style(&GRID.into());
            self.ctx.stroke();

            self.ctx.set_fill_style(&AXIS.into());
            if let Err(err) = self.ctx.fill_text(&tick_label(value, upper - lower), area.left - 8.0, y + 4.0) {
                error!("fill text error: {err:?}");
            }
        }

        self.ctx.set_text_align("center");
        for (index, label) in labels.iter().enumerate() {
            let x = band_center(index, labels.len(), area);
            if let Err(err) = self.ctx.fill_text(label, x, area.bottom + 20.0) {
                error!("fill text error: {err:?}");
            }
        }

        self.ctx.begin_path();
        self.ctx.move_to(area.left, area.top);
        self.ctx.line_to(area.left, area.bottom);
        self.ctx.line_to(area.right, area.bottom);
        self.ctx.set_stroke_style(&AXIS.into());
        self.ctx.stroke();

        self.ctx.set_text_align("left");
    }

    fn render_legend(&mut self, entries: &[(String, &str)], x: f64, y: f64) {
        self.ctx.set_text_align("left");

        let mut y = y;
        for (label, color) in entries {
            self.ctx.set_fill_style(&(*color).into());
            self.ctx.fill_rect(x, y - 10.0, 12.0, 12.0);
            self.ctx.set_fill_style(&AXIS.into());
            if let Err(err) = self.ctx.fill_text(label, x + 18.0, y) {
                error!("fill text error: {err:?}");
            }
            y += 18.0;
        }
    }

    fn render_empty(&mut self, message: &str, width: f64, height: f64) {
        self.ctx.set_text_align("center");
        self.ctx.set_fill_style(&AXIS.into());
        if let Err(err) = self.ctx.fill_text(message, width / 2.0, height / 2.0) {
            error!("fill text error: {err:?}");
        }
    }
}

pub fn get_color(index: usize) -> &'static str {
    SLICE_COLORS[index % SLICE_COLORS.len()]
}

/// Start and end angle of every slice, starting at twelve o'clock.
/// Empty when there is nothing to draw.
pub fn slice_angles(slices: &[DistributionSlice]) -> Vec<(f64, f64)> {
    let total = slices.iter().map(|slice| slice.percentage).sum::<f64>();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut start = -PI / 2.0;
    slices
        .iter()
        .map(|slice| {
            let end = start + slice.percentage / total * 2.0 * PI;
            let angles = (start, end);
            start = end;
            angles
        })
        .collect()
}

/// Rounds up to 1, 2 or 5 times a power of ten.
pub fn nice_ceiling(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 1.0;
    }

    let magnitude = 10_f64.powf(value.log10().floor());
    let normalized = value / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * magnitude
}

/// Axis bounds covering every value, always including zero.
pub fn value_range<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (min, max) = values.fold((0.0_f64, 0.0_f64), |(min, max), value| {
        (min.min(*value), max.max(*value))
    });

    let lower = if min < 0.0 { -nice_ceiling(-min) } else { 0.0 };
    (lower, nice_ceiling(max))
}

pub fn value_to_y(value: f64, lower: f64, upper: f64, area: PlotArea) -> f64 {
    let span = upper - lower;
    if span <= 0.0 {
        return area.bottom;
    }

    area.bottom - (value - lower) / span * area.height()
}

#[expect(clippy::cast_precision_loss)]
pub fn band_center(index: usize, count: usize, area: PlotArea) -> f64 {
    let band = area.width() / count.max(1) as f64;
    area.left + band * (index as f64 + 0.5)
}

fn tick_label(value: f64, span: f64) -> String {
    if span < 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(equipment_type: &str, percentage: f64) -> DistributionSlice {
        DistributionSlice {
            equipment_type: equipment_type.to_string(),
            count: 0,
            percentage,
        }
    }

    #[test]
    fn slices_cover_the_full_circle() {
        let angles = slice_angles(&[slice("Pump", 50.0), slice("Valve", 25.0), slice("Reactor", 25.0)]);

        assert_eq!(angles.len(), 3);
        assert!((angles[0].0 + PI / 2.0).abs() < 1e-12);
        assert!((angles[0].1 - PI / 2.0).abs() < 1e-12);
        assert!((angles[2].1 - 3.0 * PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn no_slices_when_everything_is_zero() {
        assert!(slice_angles(&[]).is_empty());
        assert!(slice_angles(&[slice("Pump", 0.0)]).is_empty());
    }

    #[test]
    fn nice_ceilings() {
        assert!((nice_ceiling(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((nice_ceiling(5.0) - 5.0).abs() < 1e-9);
        assert!((nice_ceiling(37.0) - 50.0).abs() < 1e-9);
        assert!((nice_ceiling(120.0) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn range_includes_zero_and_negatives() {
        assert_eq!(value_range([12.0, 37.0].iter()), (0.0, 50.0));

        let (lower, upper) = value_range([-4.0, 80.0].iter());
        assert!((lower + 5.0).abs() < 1e-9);
        assert!((upper - 100.0).abs() < 1e-9);
    }

    #[test]
    fn values_map_into_the_plot_area() {
        let area = PlotArea::new(456.0, 272.0);

        assert!((value_to_y(0.0, 0.0, 100.0, area) - area.bottom).abs() < 1e-9);
        assert!((value_to_y(100.0, 0.0, 100.0, area) - area.top).abs() < 1e-9);
        assert!((value_to_y(5.0, 0.0, 0.0, area) - area.bottom).abs() < 1e-9);
    }

    #[test]
    fn bands_are_centered() {
        let area = PlotArea::new(456.0, 272.0);

        assert!((band_center(0, 2, area) - (area.left + area.width() / 4.0)).abs() < 1e-9);
        assert!((band_center(1, 2, area) - (area.left + area.width() * 0.75)).abs() < 1e-9);
    }
}
