//! Table View Widget
//! Scrollable grid of the filtered establishments, rows drawn on demand.

use egui::{RichText, ScrollArea};
use polars::prelude::*;

const ROW_HEIGHT: f32 = 20.0;
const COLUMN_WIDTH: f32 = 170.0;

/// Cell text for the currently displayed rows.
#[derive(Default)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.headers.clear();
        self.rows.clear();
    }

    /// Replace the displayed rows with the contents of `df`.
    pub fn set_data(&mut self, df: &DataFrame) {
        self.headers = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let columns = df.get_columns();
        self.rows = (0..df.height())
            .map(|i| {
                columns
                    .iter()
                    .map(|col| match col.get(i) {
                        Ok(AnyValue::Null) | Err(_) => String::new(),
                        Ok(val) => val.to_string().trim_matches('"').to_string(),
                    })
                    .collect()
            })
            .collect();
    }

    /// Draw the table; nothing at all when there are no rows
    pub fn show(&self, ui: &mut egui::Ui, max_height: f32) {
        if self.rows.is_empty() {
            return;
        }

        ui.label(RichText::new(format!("{} establecimientos", self.rows.len())).size(12.0));
        ui.add_space(4.0);

        ScrollArea::horizontal()
            .id_salt("table_h")
            .max_height(max_height)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        for header in &self.headers {
                            ui.add_sized(
                                [COLUMN_WIDTH, ROW_HEIGHT],
                                egui::Label::new(RichText::new(header).strong().size(12.0)).truncate(),
                            );
                        }
                    });
                    ui.separator();

                    ScrollArea::vertical()
                        .id_salt("table_v")
                        .auto_shrink([false, true])
                        .show_rows(ui, ROW_HEIGHT, self.rows.len(), |ui, row_range| {
                            for row in &self.rows[row_range] {
                                ui.horizontal(|ui| {
                                    for cell in row {
                                        ui.add_sized(
                                            [COLUMN_WIDTH, ROW_HEIGHT],
                                            egui::Label::new(RichText::new(cell).size(11.0)).truncate(),
                                        );
                                    }
                                });
                            }
                        });
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_plain_text_and_nulls_blank() {
        let df = df!(
            "ComunaGlosa" => [Some("Temuco"), None],
            "RegionCodigo" => [9i64, 99]
        )
        .unwrap();

        let mut view = TableView::new();
        view.set_data(&df);

        assert_eq!(view.headers, vec!["ComunaGlosa", "RegionCodigo"]);
        assert_eq!(view.rows[0], vec!["Temuco", "9"]);
        assert_eq!(view.rows[1], vec!["", "99"]);

        view.clear();
        assert!(view.rows.is_empty());
    }
}
