use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::ChartKind;
use crate::data::filter::FilterOptions;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – upload + filter form
// ---------------------------------------------------------------------------

/// Render the left panel: upload button, then the filter form.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📂 Suba o arquivo bancário");
    if ui.button("Escolher arquivo CSV ou Excel…").clicked() {
        open_file_dialog(state);
    }
    if let Some(upload) = &state.upload {
        ui.label(RichText::new(&upload.name).weak());
    }
    ui.separator();

    // Clone what we need so the form can mutate state.
    let options = match &state.view {
        Ok(view) => view.options.clone(),
        Err(_) => {
            ui.label("Nenhum dataset carregado.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            filter_form(ui, state, &options);
        });
}

fn filter_form(ui: &mut Ui, state: &mut AppState, options: &FilterOptions) {
    ui.heading("⚙️ Filtros dos dados");
    ui.add_space(4.0);

    // ---- Chart kind ----
    ui.strong("Tipo de gráfico:");
    ui.horizontal(|ui: &mut Ui| {
        for kind in ChartKind::ALL {
            ui.radio_value(&mut state.draft_chart, kind, kind.label());
        }
    });
    ui.separator();

    // ---- Numeric range ----
    ui.strong(&options.range_label);
    match (options.range_bounds, state.draft_spec.range.as_mut()) {
        (Some((min, max)), Some(range)) => {
            ui.add(
                egui::Slider::new(&mut range.low, min..=max)
                    .step_by(1.0)
                    .text("mín"),
            );
            ui.add(
                egui::Slider::new(&mut range.high, min..=max)
                    .step_by(1.0)
                    .text("máx"),
            );
            // Keep the pair ordered while dragging.
            if range.low > range.high {
                range.high = range.low;
            }
        }
        _ => {
            ui.label(RichText::new("sem valores numéricos").weak());
        }
    }
    ui.separator();

    // ---- Per-column multi-selects (collapsible) ----
    for cat in &options.categories {
        let Some(selection) = state.draft_spec.selection(&cat.column) else {
            continue;
        };

        let summary = if selection.all {
            "all".to_string()
        } else {
            format!("{}/{}", selection.values.len(), cat.values.len())
        };
        let header_text = format!("{}  ({summary})", cat.label);

        egui::CollapsingHeader::new(RichText::new(header_text).strong())
            .id_salt(&cat.column)
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("Todos").clicked() {
                        state.select_all(&cat.column);
                    }
                    if ui.small_button("Nenhum").clicked() {
                        state.select_none(&cat.column);
                    }
                });

                // Re-read after potential mutation from Todos/Nenhum.
                let Some(selection) = state.draft_spec.selection(&cat.column).cloned() else {
                    return;
                };

                let mut all = selection.all;
                if ui.checkbox(&mut all, RichText::new("all").italics()).changed() {
                    state.toggle_all(&cat.column);
                }

                for value in &cat.values {
                    let mut checked = selection.values.contains(value);
                    if ui.checkbox(&mut checked, value.label()).changed() {
                        state.toggle_filter_value(&cat.column, value);
                    }
                }
            });
    }

    ui.add_space(8.0);
    if ui.button("Aplicar filtros").clicked() {
        state.apply_filters();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("📊 Análise Bancária – Campanha de Telemarketing");
        ui.separator();

        if let Ok(view) = &state.view {
            ui.label(format!(
                "{} linhas carregadas, {} após filtros",
                view.raw.len(),
                view.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Escolha um arquivo CSV ou Excel")
        .add_filter("Arquivos suportados", &["csv", "xlsx", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
