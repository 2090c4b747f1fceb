mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use app::ResiliationsApp;
use config::DashboardConfig;
use data::loader::LoadCache;
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::resolve()?;
    log::info!(
        "Primary source: {} [{}]",
        config.data_path.display(),
        config.sheet
    );
    let cache = Arc::new(LoadCache::new());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Résiliations — Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(ResiliationsApp::new(config, cache)))),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}
