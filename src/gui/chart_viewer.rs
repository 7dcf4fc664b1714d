//! Chart Viewer Widget
//! Selected chart and operating status pie, side by side in chart cards.

use crate::charts::{CategoryChart, ChartPlotter};
use egui::{Color32, RichText};

const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 320.0;

/// Holds the charts of the current view; replaced wholesale on every change.
#[derive(Default)]
pub struct ChartViewer {
    pub chart: Option<CategoryChart>,
    pub status_chart: Option<CategoryChart>,
    /// Bumped on every new set of charts
    generation: u64,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous charts
    pub fn clear(&mut self) {
        self.chart = None;
        self.status_chart = None;
    }

    pub fn set_charts(&mut self, chart: Option<CategoryChart>, status_chart: Option<CategoryChart>) {
        self.clear();
        self.chart = chart;
        self.status_chart = status_chart;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Draw the chart cards
    pub fn show(&self, ui: &mut egui::Ui) {
        if self.chart.is_none() && self.status_chart.is_none() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Sin datos para graficar").size(18.0).color(Color32::GRAY));
            });
            return;
        }

        let card_width = ((ui.available_width() - CHART_SPACING) / 2.0).max(300.0);

        ui.horizontal_top(|ui| {
            if let Some(chart) = &self.chart {
                Self::draw_chart_card(ui, "Visualización de Datos", chart, card_width, self.generation);
            }
            ui.add_space(CHART_SPACING);
            if let Some(status) = &self.status_chart {
                Self::draw_chart_card(ui, "Estado de Funcionamiento", status, card_width, self.generation);
            }
        });
    }

    fn draw_chart_card(
        ui: &mut egui::Ui,
        heading: &str,
        chart: &CategoryChart,
        width: f32,
        generation: u64,
    ) {
        let border_color = Color32::from_rgb(100, 149, 237);

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.5, border_color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(width - 24.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(heading).size(16.0).strong().color(border_color));
                    ui.label(RichText::new(&chart.title).size(13.0));
                    ui.add_space(6.0);
                    ChartPlotter::draw_chart(ui, chart, CHART_HEIGHT, generation);
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::summary::type_distribution;
    use crate::data::columns::ESTABLISHMENT_TYPE;
    use polars::prelude::*;

    fn chart() -> CategoryChart {
        let df = df!(ESTABLISHMENT_TYPE => ["Posta", "Hospital"]).unwrap();
        type_distribution(&df).unwrap()
    }

    #[test]
    fn each_view_gets_fresh_plot_ids() {
        let mut viewer = ChartViewer::new();
        viewer.set_charts(Some(chart()), None);
        let first = ChartPlotter::plot_id(&chart(), viewer.generation);

        viewer.set_charts(Some(chart()), None);
        let second = ChartPlotter::plot_id(&chart(), viewer.generation);

        assert_ne!(first, second);
    }

    #[test]
    fn clear_drops_charts() {
        let mut viewer = ChartViewer::new();
        viewer.set_charts(Some(chart()), Some(chart()));
        viewer.clear();
        assert!(viewer.chart.is_none() && viewer.status_chart.is_none());
    }
}
