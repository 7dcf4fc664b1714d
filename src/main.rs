//! Salud Explorer - Chilean Health Establishments Dashboard
//!
//! Downloads the MINSAL establishments dataset, filters it by region or
//! municipality, and charts establishment types, dependencies and status.

mod charts;
mod config;
mod data;
mod export;
mod gui;
mod pipeline;

use anyhow::anyhow;
use config::{AppConfig, APP_TITLE};
use eframe::egui;
use gui::ExplorerApp;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Configure logging
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    data::regions::validate()?;

    let config = AppConfig::default();
    info!(url = %config.source_url, "starting");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size)
            .with_title(APP_TITLE),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Salud Explorer",
        options,
        Box::new(|cc| Ok(Box::new(ExplorerApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
