//! Health Establishments Explorer Main Application
//! Main window with control panel, establishments table and charts.

use crate::charts::StaticChartRenderer;
use crate::config::{AppConfig, APP_TITLE, EXPORT_MIME};
use crate::data::DataFetcher;
use crate::export;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, PanelStatus, TableView};
use crate::pipeline::{self, Dataset};
use egui::{RichText, SidePanel};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use tracing::{error, info, warn};

/// Dataset loading result from background thread
enum LoadResult {
    Complete(Dataset),
    Empty,
    Error(String),
}

/// Main application window.
pub struct ExplorerApp {
    config: AppConfig,
    fetcher: Arc<Mutex<DataFetcher>>,
    dataset: Option<Dataset>,

    control_panel: ControlPanel,
    table_view: TableView,
    chart_viewer: ChartViewer,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self {
            config,
            fetcher: Arc::new(Mutex::new(DataFetcher::default())),
            dataset: None,
            control_panel: ControlPanel::new(),
            table_view: TableView::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Fetch and normalize the dataset in a background thread
    fn start_loading(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        self.table_view.clear();
        self.chart_viewer.clear();
        self.control_panel
            .set_status(PanelStatus::Loading("Cargando datos desde la API...".to_string()));
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let fetcher = Arc::clone(&self.fetcher);
        let url = self.config.source_url.clone();

        thread::spawn(move || {
            // Holding the lock for the whole fetch keeps it to one request per URL
            let mut fetcher = lock_fetcher(&fetcher);
            let message = match pipeline::load_dataset(&mut fetcher, &url) {
                Ok(Some(dataset)) => LoadResult::Complete(dataset),
                Ok(None) => LoadResult::Empty,
                Err(e) => {
                    error!(error = %e, "dataset load failed");
                    LoadResult::Error(e.user_message())
                }
            };
            let _ = tx.send(message);
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        let Some(result) = poll_load(&rx) else {
            self.load_rx = Some(rx);
            return;
        };

        match result {
            LoadResult::Complete(dataset) => {
                self.control_panel
                    .update_municipalities(dataset.municipalities.clone());
                self.dataset = Some(dataset);
                self.rebuild_view();
            }
            LoadResult::Empty => {
                self.control_panel.set_status(PanelStatus::Error(
                    "No se pudieron cargar los datos.".to_string(),
                ));
            }
            LoadResult::Error(message) => {
                self.control_panel.set_status(PanelStatus::Error(message));
            }
        }
        self.is_loading = false;
    }

    /// Re-run filter and summaries for the current selection
    fn rebuild_view(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };

        match pipeline::build_view(dataset, &self.control_panel.state) {
            Ok(view) => {
                let total = dataset.establishments.height();
                let matched = view.filtered.height();
                let loaded_at = dataset
                    .fetched_at
                    .map(|t| format!(" · cargados {}", t.format("%H:%M")))
                    .unwrap_or_default();

                self.table_view.set_data(&view.filtered);
                self.control_panel.charts_available = view.has_charts();
                self.chart_viewer.set_charts(view.chart, view.status_chart);
                self.control_panel.set_status(PanelStatus::Ready(format!(
                    "{} de {} establecimientos{}",
                    matched, total, loaded_at
                )));
            }
            Err(e) => {
                error!(error = %e, "view build failed");
                self.table_view.clear();
                self.chart_viewer.clear();
                self.control_panel.charts_available = false;
                self.control_panel
                    .set_status(PanelStatus::Error(e.user_message()));
            }
        }
    }

    /// Save the full normalized table, regardless of the active filter
    fn handle_export_csv(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter(format!("CSV ({})", EXPORT_MIME), &["csv"])
            .set_file_name(&self.config.export_file_name)
            .save_file()
        else {
            return; // User cancelled
        };

        let status = match export::write_csv(&dataset.establishments, &path) {
            Ok(()) => PanelStatus::Ready(format!("Datos exportados: {}", path.display())),
            Err(e) => {
                error!(error = %e, "CSV export failed");
                PanelStatus::Error(format!("Error inesperado: {}", e))
            }
        };
        self.control_panel.set_status(status);
    }

    /// Render the displayed charts to a PNG file
    fn handle_export_png(&mut self) {
        let Some(chart) = &self.chart_viewer.chart else {
            self.control_panel
                .set_status(PanelStatus::Error("No hay gráficos para exportar".to_string()));
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(&self.config.chart_file_name)
            .save_file()
        else {
            return;
        };

        let status = match StaticChartRenderer::render_dashboard_png(
            chart,
            self.chart_viewer.status_chart.as_ref(),
            &path,
            self.config.chart_image_size,
        ) {
            Ok(()) => PanelStatus::Ready(format!("Gráficos guardados: {}", path.display())),
            Err(e) => {
                error!(error = %e, "chart export failed");
                PanelStatus::Error(format!("Error inesperado: {}", e))
            }
        };
        self.control_panel.set_status(status);
    }
}

/// Lock the shared fetcher, recovering it if a previous load panicked.
///
/// The cache only ever holds fully parsed tables, so a poisoned fetcher is
/// still consistent.
fn lock_fetcher(fetcher: &Mutex<DataFetcher>) -> MutexGuard<'_, DataFetcher> {
    fetcher.lock().unwrap_or_else(|poisoned| {
        warn!("recovering data fetcher after a failed load");
        poisoned.into_inner()
    })
}

/// Next load result, if the background thread has finished.
///
/// A thread that died without reporting becomes an error result.
fn poll_load(rx: &Receiver<LoadResult>) -> Option<LoadResult> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            error!("dataset loader stopped without a result");
            Some(LoadResult::Error(
                "Error inesperado: la carga de datos se interrumpió".to_string(),
            ))
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::SelectionChanged => {
                            info!(state = ?self.control_panel.state, "selection changed");
                            self.rebuild_view();
                        }
                        ControlPanelAction::ExportCsv => self.handle_export_csv(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::Retry => self.start_loading(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - table and charts
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(APP_TITLE).size(24.0).strong());
                ui.label(
                    RichText::new(
                        "Visualiza y analiza los datos de establecimientos de salud en Chile proporcionados por el MINSAL.",
                    )
                    .size(13.0),
                );
            });
            ui.add_space(10.0);

            let table_height = ui.available_height() * 0.4;
            self.table_view.show(ui, table_height);

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(10.0);

            self.chart_viewer.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetcher_tests::{FakeTransport, SAMPLE_CSV};
    use std::sync::atomic::Ordering;

    const URL: &str = "https://example.test/establecimientos.csv";

    #[test]
    fn dead_loader_reports_error() {
        let (tx, rx) = channel::<LoadResult>();
        assert!(poll_load(&rx).is_none());

        drop(tx);
        match poll_load(&rx) {
            Some(LoadResult::Error(message)) => assert!(message.starts_with("Error inesperado")),
            _ => panic!("expected an error result"),
        }
    }

    #[test]
    fn finished_load_is_delivered() {
        let (tx, rx) = channel();
        tx.send(LoadResult::Empty).unwrap();
        assert!(matches!(poll_load(&rx), Some(LoadResult::Empty)));
    }

    #[test]
    fn poisoned_fetcher_still_loads() {
        let (transport, calls) = FakeTransport::serving(SAMPLE_CSV);
        let fetcher = Arc::new(Mutex::new(DataFetcher::new(Box::new(transport))));

        let shared = Arc::clone(&fetcher);
        let _ = thread::spawn(move || {
            let _guard = shared.lock().unwrap();
            panic!("loader crashed");
        })
        .join();
        assert!(fetcher.is_poisoned());

        let mut guard = lock_fetcher(&fetcher);
        let dataset = pipeline::load_dataset(&mut guard, URL).unwrap().unwrap();
        assert_eq!(dataset.establishments.height(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
