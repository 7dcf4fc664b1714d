//! Static Chart Renderer
//! Renders the dashboard charts to a PNG image with plotters.
//!
//! Layout:
//! 1. Left half: the selected chart (bar or pie)
//! 2. Right half: operating status pie, when available

use crate::charts::summary::{percent_label, CategoryChart, ChartKind, Rgb};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::info;

const FONT: &str = "sans-serif";
/// Longest category label drawn under a bar before it is cut
const MAX_LABEL_CHARS: usize = 28;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the selected chart and the status pie side by side.
    pub fn render_dashboard_png(
        chart: &CategoryChart,
        status: Option<&CategoryChart>,
        path: &Path,
        size: (u32, u32),
    ) -> Result<()> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        // Start from a blank surface so nothing from a previous render survives
        root.fill(&WHITE)?;

        match status {
            Some(status) => {
                let (left, right) = root.split_horizontally(size.0 / 2);
                Self::draw_chart(&left, chart)?;
                Self::draw_chart(&right, status)?;
            }
            None => Self::draw_chart(&root, chart)?,
        }

        root.present()?;
        info!(path = %path.display(), "rendered chart image");
        Ok(())
    }

    fn draw_chart<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        chart: &CategoryChart,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        match chart.kind {
            ChartKind::Bar => Self::draw_bar(area, chart),
            ChartKind::Pie => Self::draw_pie(area, chart),
        }
    }

    fn rgb(color: Rgb) -> RGBColor {
        RGBColor(color.0, color.1, color.2)
    }

    fn short_label(label: &str) -> String {
        if label.chars().count() <= MAX_LABEL_CHARS {
            label.to_string()
        } else {
            let cut: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
            format!("{}…", cut)
        }
    }

    fn draw_bar<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        chart: &CategoryChart,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let n = chart.categories.len() as u32;
        let max = chart.max_count() as u32;
        let labels: Vec<String> = chart
            .categories
            .iter()
            .map(|c| Self::short_label(&c.label))
            .collect();

        let mut ctx = ChartBuilder::on(area)
            .caption(&chart.title, (FONT, 22))
            .margin(15)
            .x_label_area_size(170)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n.max(1)).into_segmented(), 0u32..(max + max / 10 + 1))?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&|v: &SegmentValue<u32>| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .axis_desc_style((FONT, 15))
            .draw()?;

        let style = Self::rgb(chart.color(0)).filled();
        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style(style)
                .margin(6)
                .data(
                    chart
                        .categories
                        .iter()
                        .enumerate()
                        .map(|(i, c)| (i as u32, c.count as u32)),
                ),
        )?;

        Ok(())
    }

    fn draw_pie<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        chart: &CategoryChart,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let area = area.titled(&chart.title, (FONT, 22))?;
        let (w, h) = area.dim_in_pixel();

        // Pie on the left two thirds, legend on the right
        let cx = (w as f64 * 0.38) as i32;
        let cy = (h as f64 * 0.5) as i32;
        let radius = (w as f64 * 0.3).min(h as f64 * 0.42);

        let centered = TextStyle::from((FONT, 15).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

        for slice in chart.pie_slices() {
            if slice.end <= slice.start {
                continue;
            }

            let steps = (((slice.end - slice.start) / 0.02).ceil() as usize).max(2);
            let mut points = Vec::with_capacity(steps + 2);
            points.push((cx, cy));
            for i in 0..=steps {
                let angle = slice.start + (slice.end - slice.start) * i as f64 / steps as f64;
                points.push(Self::polar(cx, cy, angle, radius));
            }

            points.push((cx, cy));
            area.draw(&Polygon::new(points.clone(), Self::rgb(slice.color).filled()))?;
            // Outline keeps same-colored neighbours apart
            area.draw(&PathElement::new(points, WHITE.stroke_width(2)))?;

            let mid = (slice.start + slice.end) / 2.0;
            area.draw(&Text::new(
                percent_label(slice.percent),
                Self::polar(cx, cy, mid, radius * 0.65),
                centered.clone(),
            ))?;
        }

        // Legend
        let legend_x = (w as f64 * 0.74) as i32;
        let mut legend_y = (h as f64 * 0.15) as i32;
        for (i, category) in chart.categories.iter().enumerate() {
            area.draw(&Rectangle::new(
                [(legend_x, legend_y), (legend_x + 14, legend_y + 14)],
                Self::rgb(chart.color(i)).filled(),
            ))?;
            area.draw(&Text::new(
                Self::short_label(&category.label),
                (legend_x + 20, legend_y),
                (FONT, 13).into_font(),
            ))?;
            legend_y += 22;
        }

        Ok(())
    }

    /// Backend coordinates of `angle` (clockwise from 12 o'clock).
    fn polar(cx: i32, cy: i32, angle: f64, radius: f64) -> (i32, i32) {
        (
            cx + (radius * angle.sin()).round() as i32,
            cy - (radius * angle.cos()).round() as i32,
        )
    }
}
