use eframe::egui::{self, Align2, FontId, RichText, ScrollArea, Sense, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{self, SeriesColors};
use crate::config::AnnexRow;
use crate::data::aggregate::{GroupedTable, HeatmapTable, MonthComparison, SummaryTables};
use crate::data::month;
use crate::state::AppState;
use crate::ui::panels;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render every chart section, or the upload prompt when nothing is loaded.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.summaries.is_none() {
        panels::upload_prompt(ui, state);
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(tables) = &state.summaries {
                sections(ui, tables, &state.colors);
            }
        });
}

fn sections(ui: &mut Ui, tables: &SummaryTables, colors: &SeriesColors) {
    ui.heading("📊 Résiliations — Dashboard");
    ui.add_space(8.0);

    section(ui, "Toutes offres — selon date de saisie");
    heatmap(ui, &tables.heatmap);

    if let Some(table) = &tables.class_by_product {
        section(ui, "Valeur client en étoiles des démissionnaires");
        grouped_bars(ui, "class_by_product", table, colors);
    }

    section(ui, &tables.comparison.title());
    comparison(ui, &tables.comparison);

    if let Some(table) = &tables.division_by_product {
        section(ui, "Résiliations par Direction des Ventes (DV) et produit");
        grouped_bars(ui, "division_by_product", table, colors);
    }

    section(ui, "Annexe — Écarts (réf. 2005–2006)");
    annex(ui, &tables.annex);
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.label(RichText::new(title).heading().strong());
    ui.separator();
}

fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Label for integer grid marks that fall on a category slot.
fn category_label(categories: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    categories.get(i as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Month × year heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, table: &HeatmapTable) {
    if table.years.is_empty() {
        ui.label("Aucune donnée.");
        return;
    }

    let max = table.max();
    let columns = table.years.len() as f32 + 1.0;
    let width = (ui.available_width() / columns - 4.0).clamp(36.0, 120.0);
    let cell = Vec2::new(width, 22.0);

    egui::Grid::new("heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Mois \\ Année");
            for year in &table.years {
                ui.strong(year.to_string());
            }
            ui.end_row();

            for (row, label) in month::LABELS_FR.iter().enumerate() {
                ui.label(*label);
                for (col, value) in table.values[row].iter().enumerate() {
                    let (rect, response) = ui.allocate_exact_size(cell, Sense::hover());
                    let t = if max > 0.0 { (value / max) as f32 } else { 0.0 };
                    let painter = ui.painter();
                    painter.rect_filled(rect, 2.0, color::sequential_blue(t));
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        format_count(*value),
                        FontId::proportional(12.0),
                        color::text_on_blue(t),
                    );
                    response.on_hover_text(format!(
                        "{label} {} : {} sorties",
                        table.years[col],
                        format_count(*value)
                    ));
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Category × product grouped bars
// ---------------------------------------------------------------------------

fn grouped_bars(ui: &mut Ui, id: &str, table: &GroupedTable, colors: &SeriesColors) {
    let group_width = 0.8;
    let bar_width = group_width / table.series.len().max(1) as f64;

    let charts: Vec<BarChart> = table
        .series
        .iter()
        .enumerate()
        .map(|(j, product)| {
            let offset = -group_width / 2.0 + bar_width * (j as f64 + 0.5);
            let bars: Vec<Bar> = table
                .categories
                .iter()
                .enumerate()
                .filter_map(|(i, category)| {
                    let value = table.value(category, product)?;
                    Some(
                        Bar::new(i as f64 + offset, value)
                            .width(bar_width)
                            .name(format!("{category} / {product}")),
                    )
                })
                .collect();
            BarChart::new(bars)
                .name(product)
                .color(colors.color_for(product))
        })
        .collect();

    let categories = table.categories.clone();
    Plot::new(id.to_string())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Sorties")
        .x_axis_formatter(move |mark, _range| category_label(&categories, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Monthly comparison: bars + two lines
// ---------------------------------------------------------------------------

fn comparison(ui: &mut Ui, cmp: &MonthComparison) {
    let year = |y: Option<i32>| y.map(|y| y.to_string()).unwrap_or_default();
    let bar_color = egui::Color32::from_rgb(99, 110, 250);
    let line_color = egui::Color32::from_rgb(239, 85, 59);
    let mean_color = egui::Color32::from_rgb(0, 204, 150);

    let bars: Vec<Bar> = cmp
        .bar
        .iter()
        .enumerate()
        .map(|(i, v)| Bar::new(i as f64, *v).width(0.6))
        .collect();
    let bar_chart = BarChart::new(bars)
        .name(format!("Sorties {}", year(cmp.bar_year)))
        .color(bar_color);

    let series_points = |values: &[f64; 12]| -> Vec<[f64; 2]> {
        values.iter().enumerate().map(|(i, v)| [i as f64, *v]).collect()
    };
    let line_name = format!("Sorties {}", year(cmp.line_year));
    let line_pts = series_points(&cmp.line);
    let mean_pts = series_points(&cmp.mean);

    let labels = month::axis_labels();
    Plot::new("month_comparison")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Sorties")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(bar_chart);
            for (name, pts, color) in [
                (line_name.as_str(), line_pts, line_color),
                ("Moyenne", mean_pts, mean_color),
            ] {
                plot_ui.line(
                    Line::new(PlotPoints::from(pts.clone()))
                        .name(name)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(pts))
                        .name(name)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Annex table
// ---------------------------------------------------------------------------

fn annex(ui: &mut Ui, rows: &[AnnexRow]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(320.0))
        .column(Column::auto().at_least(80.0))
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Indicateur");
            });
            header.col(|ui| {
                ui.strong("Valeur");
            });
        })
        .body(|mut body| {
            for row in rows {
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(&row.label);
                    });
                    table_row.col(|ui| {
                        ui.label(row.value.to_string());
                    });
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_only_on_slots() {
        let cats = vec!["1*".to_string(), "2*".to_string()];
        assert_eq!(category_label(&cats, 0.0), "1*");
        assert_eq!(category_label(&cats, 1.0000000001), "2*");
        assert_eq!(category_label(&cats, 0.5), "");
        assert_eq!(category_label(&cats, -1.0), "");
        assert_eq!(category_label(&cats, 5.0), "");
    }

    #[test]
    fn counts_format_without_trailing_zeroes() {
        assert_eq!(format_count(8.0), "8");
        assert_eq!(format_count(2.5), "2.5");
    }
}
