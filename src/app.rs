use std::sync::Arc;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::data::loader::LoadCache;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ResiliationsApp {
    pub state: AppState,
}

impl ResiliationsApp {
    /// Build the app and try the configured workbook straight away.
    pub fn new(config: DashboardConfig, cache: Arc<LoadCache>) -> Self {
        let mut state = AppState::new(config, cache);
        state.load_primary();
        Self { state }
    }
}

impl eframe::App for ResiliationsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &mut self.state);
        });
    }
}
