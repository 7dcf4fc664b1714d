//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use crate::charts::summary::{percent_label, CategoryChart, ChartKind, Rgb};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoint, PlotPoints, Polygon, Text};
use std::f64::consts::TAU;

/// Radians between consecutive points on a slice arc
const ARC_STEP: f64 = 0.03;

/// Draws category charts with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color(rgb: Rgb) -> Color32 {
        Color32::from_rgb(rgb.0, rgb.1, rgb.2)
    }

    /// Draw a chart according to its kind.
    ///
    /// `generation` identifies the view the chart belongs to; egui_plot
    /// remembers bounds per id, so a new view must not reuse the old ids.
    pub fn draw_chart(ui: &mut egui::Ui, chart: &CategoryChart, height: f32, generation: u64) {
        match chart.kind {
            ChartKind::Bar => Self::draw_bar_chart(ui, chart, height, generation),
            ChartKind::Pie => Self::draw_pie_chart(ui, chart, height, generation),
        }
    }

    /// Plot memory id for a chart within one view.
    pub fn plot_id(chart: &CategoryChart, generation: u64) -> String {
        let prefix = match chart.kind {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
        };
        format!("{}_{}_{}", prefix, chart.title, generation)
    }

    /// Horizontal bar chart, most frequent category on top.
    pub fn draw_bar_chart(ui: &mut egui::Ui, chart: &CategoryChart, height: f32, generation: u64) {
        let n = chart.categories.len();

        // Bars run bottom-up, so the first category gets the highest position
        let labels: Vec<String> = chart
            .categories
            .iter()
            .rev()
            .map(|c| c.label.clone())
            .collect();

        let bars: Vec<Bar> = chart
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Bar::new((n - 1 - i) as f64, c.count as f64)
                    .name(&c.label)
                    .fill(Self::color(chart.color(i)))
            })
            .collect();

        Plot::new(Self::plot_id(chart, generation))
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false)
            .x_axis_label(chart.y_label.clone())
            .include_x(0.0)
            .y_grid_spacer(move |_input| {
                (0..n)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < labels.len() && (mark.value - idx).abs() < 1e-6 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .horizontal()
                        .width(0.7)
                        .name(&chart.x_label),
                );
            });
    }

    /// Pie chart with a percentage label on each slice.
    pub fn draw_pie_chart(ui: &mut egui::Ui, chart: &CategoryChart, height: f32, generation: u64) {
        let slices = chart.pie_slices();

        Plot::new(Self::plot_id(chart, generation))
            .height(height)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false)
            .include_x(-1.1)
            .include_x(1.1)
            .include_y(-1.1)
            .include_y(1.1)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for slice in &slices {
                    if slice.end <= slice.start {
                        continue;
                    }

                    let color = Self::color(slice.color);
                    plot_ui.polygon(
                        Polygon::new(Self::slice_points(slice.start, slice.end, 1.0))
                            .fill_color(color)
                            .stroke(egui::Stroke::new(1.0, Color32::WHITE))
                            .name(&slice.label),
                    );

                    let mid = (slice.start + slice.end) / 2.0;
                    let (x, y) = Self::point_at(mid, 0.65);
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(percent_label(slice.percent))
                            .size(12.0)
                            .color(Color32::BLACK),
                    ));
                }
            });
    }

    /// Point at `angle` (clockwise from 12 o'clock) on a circle of `radius`.
    pub fn point_at(angle: f64, radius: f64) -> (f64, f64) {
        (radius * angle.sin(), radius * angle.cos())
    }

    /// Closed outline of a slice: center, arc from `start` to `end`, center.
    pub fn slice_points(start: f64, end: f64, radius: f64) -> PlotPoints {
        let span = (end - start).min(TAU);
        let steps = ((span / ARC_STEP).ceil() as usize).max(2);

        let mut points = Vec::with_capacity(steps + 2);
        points.push([0.0, 0.0]);
        for i in 0..=steps {
            let (x, y) = Self::point_at(start + span * i as f64 / steps as f64, radius);
            points.push([x, y]);
        }

        PlotPoints::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_at_starts_at_twelve_and_runs_clockwise() {
        let (x, y) = ChartPlotter::point_at(0.0, 1.0);
        assert!(x.abs() < 1e-9 && (y - 1.0).abs() < 1e-9);

        let (x, y) = ChartPlotter::point_at(TAU / 4.0, 1.0);
        assert!((x - 1.0).abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn slice_outline_starts_at_center() {
        let points = ChartPlotter::slice_points(0.0, TAU / 2.0, 1.0);
        let points = points.points();
        assert_eq!(points[0].x, 0.0);
        assert_eq!(points[0].y, 0.0);
        assert!(points.len() > 3);
    }
}
