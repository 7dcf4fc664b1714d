//! Charts module - Chart summaries and rendering

mod plotter;
mod renderer;
pub mod summary;

pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;
pub use summary::{selected_chart, status_breakdown, CategoryChart, ChartChoice};
