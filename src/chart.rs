//! Multi-series line chart over history samples.
//!
//! All series share one key axis and one value axis. The first series is the
//! primary one and sets the vertical domain; any series may carry a `scale`
//! so that small counts stay visible next to large ones.

use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, GLYPH_HEIGHT};
use crate::colorize::Rgb;
use crate::engine::PopulationSample;

/// Smallest top of the vertical domain.
pub const MIN_Y_MAX: f64 = 10.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub grid_lines: usize,
    pub background: Rgb,
    pub grid_color: Rgb,
    pub label_color: Rgb,
    /// Left gutter reserved for axis labels.
    pub margin_left: usize,
    pub margin_top: usize,
    pub margin_bottom: usize,
    pub margin_right: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            grid_lines: 4,
            background: [20, 20, 28],
            grid_color: [55, 55, 70],
            label_color: [150, 150, 160],
            margin_left: 34,
            margin_top: 12,
            margin_bottom: 4,
            margin_right: 4,
        }
    }
}

pub struct Series<T> {
    pub label: String,
    pub color: Rgb,
    pub value: Box<dyn Fn(&T) -> f64>,
    /// Plot `raw * scale` instead of the raw value.
    pub scale: Option<f64>,
}

impl<T> Series<T> {
    pub fn new(label: impl Into<String>, color: Rgb, value: impl Fn(&T) -> f64 + 'static) -> Self {
        Self {
            label: label.into(),
            color,
            value: Box::new(value),
            scale: None,
        }
    }

    pub fn scaled(mut self, scale: Option<f64>) -> Self {
        self.scale = scale;
        self
    }

    #[inline]
    fn plotted(&self, point: &T) -> f64 {
        let raw = (self.value)(point);
        match self.scale {
            Some(k) => raw * k,
            None => raw,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
    pub scaled: bool,
}

/// Linear mapping from data space into the plot area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Axes {
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
    pub plot_left: f64,
    pub plot_top: f64,
    pub plot_width: f64,
    pub plot_height: f64,
}

impl Axes {
    pub fn x_for(&self, key: f64) -> f64 {
        let (min, max) = self.x_domain;
        let span = if max > min { max - min } else { 1.0 };
        self.plot_left + (key - min) / span * self.plot_width
    }

    pub fn y_for(&self, value: f64) -> f64 {
        let (min, max) = self.y_domain;
        let span = if max > min { max - min } else { 1.0 };
        self.plot_top + self.plot_height - (value - min) / span * self.plot_height
    }
}

pub struct TimeSeriesChart<T> {
    key: Box<dyn Fn(&T) -> f64>,
    series: Vec<Series<T>>,
    config: ChartConfig,
}

impl<T> TimeSeriesChart<T> {
    pub fn new(key: impl Fn(&T) -> f64 + 'static, config: ChartConfig) -> Self {
        Self {
            key: Box::new(key),
            series: Vec::new(),
            config,
        }
    }

    pub fn with_series(mut self, series: Series<T>) -> Self {
        self.series.push(series);
        self
    }

    pub fn series(&self) -> &[Series<T>] {
        &self.series
    }

    pub fn series_mut(&mut self) -> &mut [Series<T>] {
        &mut self.series
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.series
            .iter()
            .map(|s| LegendEntry {
                label: legend_label(&s.label, s.scale),
                color: s.color,
                scaled: s.scale.is_some(),
            })
            .collect()
    }

    /// Axes for `points` on a canvas of `size`. `None` with fewer than two points.
    pub fn axes(&self, points: &[T], size: (usize, usize)) -> Option<Axes> {
        if points.len() < 2 {
            return None;
        }
        let mut key_min = f64::INFINITY;
        let mut key_max = f64::NEG_INFINITY;
        for point in points {
            let key = (self.key)(point);
            key_min = key_min.min(key);
            key_max = key_max.max(key);
        }
        let primary_max = self
            .series
            .first()
            .map(|s| points.iter().map(|p| (s.value)(p)).fold(f64::NEG_INFINITY, f64::max))
            .unwrap_or(0.0);
        let y_max = if primary_max.is_finite() { primary_max.max(MIN_Y_MAX) } else { MIN_Y_MAX };

        let c = &self.config;
        let plot_width = size.0.saturating_sub(c.margin_left + c.margin_right) as f64;
        let plot_height = size.1.saturating_sub(c.margin_top + c.margin_bottom) as f64;
        Some(Axes {
            x_domain: (key_min, key_max),
            y_domain: (0.0, y_max),
            plot_left: c.margin_left as f64,
            plot_top: c.margin_top as f64,
            plot_width,
            plot_height,
        })
    }

    /// Screen-space polyline of one series.
    pub fn polyline(&self, series: &Series<T>, points: &[T], axes: &Axes) -> Vec<(f64, f64)> {
        points
            .iter()
            .map(|p| (axes.x_for((self.key)(p)), axes.y_for(series.plotted(p))))
            .collect()
    }

    /// Clear `canvas` and draw the chart. Returns the axes used, or `None`
    /// when there was nothing to connect.
    pub fn draw(&self, canvas: &mut Canvas, points: &[T]) -> Option<Axes> {
        canvas.fill(self.config.background);
        let axes = self.axes(points, canvas.size())?;
        self.draw_grid(canvas, &axes);

        for series in &self.series {
            let line = self.polyline(series, points, &axes);
            for pair in line.windows(2) {
                let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                canvas.draw_line(x0, y0, x1, y1, series.color);
            }
        }
        self.draw_legend(canvas);
        Some(axes)
    }

    fn draw_grid(&self, canvas: &mut Canvas, axes: &Axes) {
        let lines = self.config.grid_lines.max(1);
        let right = axes.plot_left + axes.plot_width;
        for i in 0..=lines {
            let value = axes.y_domain.1 * i as f64 / lines as f64;
            let y = axes.y_for(value);
            canvas.draw_line(axes.plot_left, y, right, y, self.config.grid_color);
            let label = format_tick(value);
            let label_y = (y - GLYPH_HEIGHT as f64 / 2.0).round() as i64;
            canvas.draw_text(2, label_y, &label, self.config.label_color);
        }
    }

    fn draw_legend(&self, canvas: &mut Canvas) {
        let mut x = self.config.margin_left as i64;
        for entry in self.legend() {
            canvas.fill_rect(x, 2, 5, 5, entry.color);
            canvas.draw_text(x + 7, 1, &entry.label, entry.color);
            x += 7 + crate::canvas::text_width(&entry.label) as i64 + 6;
        }
    }
}

/// `label (xK)` for scaled series.
pub fn legend_label(label: &str, scale: Option<f64>) -> String {
    match scale {
        Some(k) => format!("{label} (x{k})"),
        None => label.to_string(),
    }
}

/// Factor that lifts `series_max` to the height of `global_max`, rounded to
/// one decimal. `None` when no lift is needed or possible.
pub fn auto_scale(global_max: f64, series_max: f64) -> Option<f64> {
    if series_max.is_nan() || series_max <= 0.0 || !global_max.is_finite() || global_max <= series_max {
        return None;
    }
    let k = (global_max / series_max * 10.0).round() / 10.0;
    (k > 1.0).then_some(k)
}

fn format_tick(value: f64) -> String {
    if value >= 10_000.0 {
        format!("{:.0}K", value / 1000.0)
    } else {
        format!("{:.0}", value)
    }
}

/// Total, herbivore, carnivore and species-count lines for the ecology view.
/// Species are scaled up to the population range.
pub fn ecology_chart(samples: &[PopulationSample], config: ChartConfig) -> TimeSeriesChart<PopulationSample> {
    let mut chart = TimeSeriesChart::new(|s: &PopulationSample| s.tick as f64, config)
        .with_series(Series::new("Total", [230, 230, 230], |s: &PopulationSample| s.total as f64))
        .with_series(Series::new("Herbivores", [80, 200, 80], |s: &PopulationSample| s.herbivores as f64))
        .with_series(Series::new("Carnivores", [220, 70, 60], |s: &PopulationSample| s.carnivores as f64))
        .with_series(Series::new("Species", [90, 150, 240], |s: &PopulationSample| s.species_count as f64));
    rescale_species(&mut chart, samples);
    chart
}

/// Recompute the species scale of an [`ecology_chart`] for new samples.
pub fn rescale_species(chart: &mut TimeSeriesChart<PopulationSample>, samples: &[PopulationSample]) {
    let global_max = samples.iter().map(|s| s.total).max().unwrap_or(0) as f64;
    let species_max = samples.iter().map(|s| s.species_count).max().unwrap_or(0) as f64;
    if let Some(species) = chart.series_mut().last_mut() {
        species.scale = auto_scale(global_max, species_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Point {
        tick: f64,
        total: f64,
        other: f64,
    }

    fn point(tick: f64, total: f64) -> Point {
        Point { tick, total, other: total / 4.0 }
    }

    fn chart() -> TimeSeriesChart<Point> {
        TimeSeriesChart::new(|p: &Point| p.tick, ChartConfig::default())
            .with_series(Series::new("Total", [255, 255, 255], |p: &Point| p.total))
            .with_series(Series::new("Other", [255, 0, 0], |p: &Point| p.other))
    }

    #[test]
    fn test_domains_follow_history() {
        let points = [point(0.0, 10.0), point(5.0, 40.0)];
        let axes = chart().axes(&points, (300, 120)).unwrap();
        assert_eq!(axes.x_domain, (0.0, 5.0));
        assert_eq!(axes.y_domain, (0.0, 40.0));
    }

    #[test]
    fn test_vertical_floor_is_ten() {
        let points = [point(3.0, 1.0), point(4.0, 2.0)];
        let axes = chart().axes(&points, (300, 120)).unwrap();
        assert_eq!(axes.y_domain, (0.0, 10.0));
    }

    #[test]
    fn test_fewer_than_two_points_draws_nothing() {
        let mut canvas = Canvas::new(100, 50, [1, 1, 1]);
        assert!(chart().draw(&mut canvas, &[point(0.0, 5.0)]).is_none());
        assert!(chart().draw(&mut canvas, &[]).is_none());
    }

    #[test]
    fn test_scaled_series_plots_raw_times_k() {
        let points = [point(0.0, 10.0), point(5.0, 40.0), point(9.0, 20.0)];
        let mut chart = chart();
        let axes = chart.axes(&points, (300, 120)).unwrap();
        let primary_before = chart.polyline(&chart.series()[0], &points, &axes);

        chart.series_mut()[1].scale = Some(3.0);
        let axes_after = chart.axes(&points, (300, 120)).unwrap();
        assert_eq!(axes, axes_after);

        let scaled = chart.polyline(&chart.series()[1], &points, &axes);
        for (p, (_, y)) in points.iter().zip(&scaled) {
            assert!((y - axes.y_for(p.other * 3.0)).abs() < 1e-9);
        }
        assert_eq!(chart.polyline(&chart.series()[0], &points, &axes), primary_before);
    }

    #[test]
    fn test_legend_marks_scaled_series() {
        let mut chart = chart();
        chart.series_mut()[1].scale = Some(12.5);
        let legend = chart.legend();
        assert_eq!(legend[0].label, "Total");
        assert!(!legend[0].scaled);
        assert_eq!(legend[1].label, "Other (x12.5)");
        assert!(legend[1].scaled);
    }

    #[test]
    fn test_auto_scale() {
        assert_eq!(auto_scale(1000.0, 80.0), Some(12.5));
        assert_eq!(auto_scale(50.0, 50.0), None);
        assert_eq!(auto_scale(100.0, 0.0), None);
    }

    #[test]
    fn test_ecology_chart_scales_species() {
        let samples = vec![
            PopulationSample { tick: 0, total: 400, herbivores: 300, carnivores: 100, species_count: 7 },
            PopulationSample { tick: 10, total: 500, herbivores: 380, carnivores: 120, species_count: 7 },
        ];
        let chart = ecology_chart(&samples, ChartConfig::default());
        let legend = chart.legend();
        assert_eq!(legend.len(), 4);
        assert_eq!(legend[3].label, "Species (x71.4)");

        let mut canvas = Canvas::new(300, 120, [0, 0, 0]);
        let axes = chart.draw(&mut canvas, &samples).unwrap();
        assert_eq!(axes.y_domain, (0.0, 500.0));
    }

    #[test]
    fn test_rescale_follows_new_samples() {
        let mut chart = ecology_chart(&[], ChartConfig::default());
        assert_eq!(chart.legend()[3].label, "Species");

        let samples = vec![
            PopulationSample { tick: 0, total: 1000, herbivores: 900, carnivores: 100, species_count: 80 },
            PopulationSample { tick: 10, total: 900, herbivores: 800, carnivores: 100, species_count: 60 },
        ];
        rescale_species(&mut chart, &samples);
        assert_eq!(chart.legend()[3].label, "Species (x12.5)");
    }
}
