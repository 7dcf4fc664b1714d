//! Control Panel Widget
//! Left side panel with filter, chart and export controls.

use crate::charts::ChartChoice;
use crate::data::regions;
use crate::pipeline::{DashboardState, FilterKind};
use egui::{Color32, ComboBox, RichText, ScrollArea};

/// Maximum municipality suggestions listed under the search box
const MAX_SUGGESTIONS: usize = 8;

/// Load/processing status shown at the bottom of the panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelStatus {
    Loading(String),
    Ready(String),
    Error(String),
}

/// Left side control panel.
pub struct ControlPanel {
    pub state: DashboardState,
    /// Text typed in the municipality search box
    pub municipality_input: String,
    pub municipalities: Vec<String>,
    pub status: PanelStatus,
    pub data_loaded: bool,
    pub charts_available: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            state: DashboardState::default(),
            municipality_input: String::new(),
            municipalities: Vec::new(),
            status: PanelStatus::Loading("Cargando datos desde la API...".to_string()),
            data_loaded: false,
            charts_available: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update municipality choices after the dataset loads
    pub fn update_municipalities(&mut self, municipalities: Vec<String>) {
        self.municipalities = municipalities;
        self.data_loaded = true;
    }

    pub fn set_status(&mut self, status: PanelStatus) {
        self.status = status;
    }

    /// Known municipalities containing the typed text, ignoring case.
    pub fn suggestions(&self) -> Vec<&String> {
        let needle = self.municipality_input.trim().to_lowercase();
        self.municipalities
            .iter()
            .filter(|m| needle.is_empty() || m.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let before = self.state.clone();

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏥 Establecimientos de Salud")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Datos abiertos MINSAL")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔎 Filtrar Establecimientos").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(self.data_loaded, |ui| {
            ui.horizontal(|ui| {
                for kind in FilterKind::ALL {
                    ui.radio_value(&mut self.state.filter_mode, kind, kind.label());
                }
            });

            ui.add_space(8.0);

            match self.state.filter_mode {
                FilterKind::Region => self.show_region_picker(ui),
                FilterKind::Municipality => self.show_municipality_picker(ui),
                FilterKind::All => {
                    ui.label(RichText::new("Mostrando todo el país").color(Color32::GRAY));
                }
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart Section =====
        ui.label(RichText::new("📊 Visualización de Datos").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.label("Gráfico:");
            ComboBox::from_id_salt("chart_choice")
                .width(200.0)
                .selected_text(self.state.chart_choice.label())
                .show_ui(ui, |ui| {
                    for choice in ChartChoice::ALL {
                        ui.selectable_value(&mut self.state.chart_choice, choice, choice.label());
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(RichText::new("💾 Exportar Datos").size(14.0).strong());
        ui.add_space(5.0);

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.data_loaded, |ui| {
                let button = egui::Button::new(RichText::new("⬇ Descargar datos como CSV").size(14.0))
                    .min_size(egui::vec2(220.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCsv;
                }
            });

            ui.add_space(6.0);

            ui.add_enabled_ui(self.charts_available, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Guardar gráficos (PNG)").size(14.0))
                    .min_size(egui::vec2(220.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📡 Estado").size(14.0).strong());
        ui.add_space(5.0);

        let (text, color) = match &self.status {
            PanelStatus::Loading(text) => {
                ui.add(egui::Spinner::new());
                (text, Color32::GRAY)
            }
            PanelStatus::Ready(text) => (text, Color32::from_rgb(40, 167, 69)),
            PanelStatus::Error(text) => (text, Color32::from_rgb(220, 53, 69)),
        };
        ui.label(RichText::new(text).size(11.0).color(color));

        if matches!(self.status, PanelStatus::Error(_)) && !self.data_loaded {
            ui.add_space(5.0);
            if ui.button("🔄 Reintentar").clicked() {
                action = ControlPanelAction::Retry;
            }
        }

        if action == ControlPanelAction::None && self.state != before {
            action = ControlPanelAction::SelectionChanged;
        }

        action
    }

    fn show_region_picker(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Región:");
            ComboBox::from_id_salt("region")
                .width(200.0)
                .selected_text(&self.state.region_selection)
                .show_ui(ui, |ui| {
                    for name in regions::region_names() {
                        if ui
                            .selectable_label(self.state.region_selection == name, name)
                            .clicked()
                        {
                            self.state.region_selection = name.to_string();
                        }
                    }
                });
        });
    }

    fn show_municipality_picker(&mut self, ui: &mut egui::Ui) {
        ui.add(
            egui::TextEdit::singleline(&mut self.municipality_input)
                .hint_text("Escribe el nombre de una comuna")
                .desired_width(250.0),
        );

        let mut picked: Option<String> = None;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    for name in self.suggestions() {
                        let selected = self.state.municipality_query.as_deref() == Some(name.as_str());
                        if ui.selectable_label(selected, name).clicked() {
                            picked = Some(name.clone());
                        }
                    }
                });
            });

        if let Some(name) = picked {
            self.municipality_input = name;
        }

        let query = self.municipality_input.trim();
        self.state.municipality_query = if query.is_empty() {
            None
        } else {
            Some(query.to_string())
        };
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    ExportCsv,
    ExportPng,
    Retry,
}
