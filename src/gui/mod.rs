//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod table_view;

pub use app::ExplorerApp;
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction, PanelStatus};
pub use table_view::TableView;
