use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, LoadState};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtres");
    ui.separator();

    if state.load.dataset().is_none() {
        ui.label("Aucune donnée chargée.");
        return;
    }

    // Clone what we need so we can mutate state inside the closures.
    let products = state.dimensions.products.clone();
    let years = state.dimensions.years.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Products (multi-select) ----
            let header_text = format!(
                "Produits  ({}/{})",
                state.selection.products.len(),
                products.len()
            );
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("products")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if products.is_empty() {
                        ui.label("Pas de colonne produit.");
                        return;
                    }
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("Tous").clicked() {
                            state.select_all_products();
                        }
                        if ui.small_button("Aucun").clicked() {
                            state.select_no_products();
                        }
                    });
                    for product in &products {
                        let mut checked = state.selection.products.contains(product);
                        let text = RichText::new(product).color(state.colors.color_for(product));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_product(product);
                        }
                    }
                });
            ui.separator();

            // ---- Bar / line years (single select) ----
            let bar_year = state.selection.bar_year;
            if let Some(year) = year_combo(ui, "bar_year", "Année (barres)", bar_year, &years) {
                state.set_bar_year(year);
            }
            let line_year = state.selection.line_year;
            if let Some(year) = year_combo(ui, "line_year", "Année (courbe)", line_year, &years) {
                state.set_line_year(year);
            }
            ui.separator();

            // ---- Averaging window (multi-select) ----
            ui.strong("Années pour la moyenne");
            for &year in &years {
                let mut checked = state.selection.mean_years.contains(&year);
                if ui.checkbox(&mut checked, year.to_string()).changed() {
                    state.toggle_mean_year(year);
                }
            }
        });
}

/// Year drop-down; returns the newly picked year, if any.
fn year_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    current: Option<i32>,
    years: &[i32],
) -> Option<i32> {
    let mut picked = None;
    ui.strong(label);
    let selected_text = current.map(|y| y.to_string()).unwrap_or_default();
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            for &year in years {
                if ui
                    .selectable_label(current == Some(year), year.to_string())
                    .clicked()
                {
                    picked = Some(year);
                }
            }
        });
    picked
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Fichier", |ui: &mut Ui| {
            if ui.button("Importer…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Recharger").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui.button("Recharger tout").clicked() {
                state.reload_all();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(tables)) = (state.load.dataset(), &state.summaries) {
            ui.label(format!(
                "{} résiliations chargées, {} après filtre",
                ds.len(),
                tables.filtered_len
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Waiting for input
// ---------------------------------------------------------------------------

/// Central-panel prompt while no dataset is loaded.
pub fn upload_prompt(ui: &mut Ui, state: &mut AppState) {
    let (text, color) = match &state.load {
        LoadState::AwaitingInput { reason } => (
            format!(
                "📄 Fichier non trouvé ({reason}).\n\
                 Téléverse le fichier Excel pour continuer.\n\
                 ⏳ En attente du fichier…"
            ),
            Color32::from_rgb(200, 140, 0),
        ),
        LoadState::Failed { error } => (
            format!("Fichier illisible : {error}\nImporte un autre fichier."),
            Color32::RED,
        ),
        LoadState::Loaded(_) => return,
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.label(RichText::new(text).color(color).size(16.0));
        ui.add_space(12.0);
        let file_name = state
            .config
            .data_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if ui.button(format!("Importer {file_name}")).clicked() {
            open_file_dialog(state);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Importer le fichier des résiliations")
        .add_filter("Excel", &["xlsx"])
        .pick_file();

    // A cancelled dialog leaves the current state untouched.
    if let Some(path) = file {
        state.load_upload(&path);
    }
}
