use anyhow::Context;
use eframe::egui::{RichText, ScrollArea, Ui};

use crate::data::export::ExportFormat;
use crate::error::DashboardError;
use crate::pipeline::DashboardView;
use crate::state::{AppState, Tab};
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Central panel – tab strip + active tab
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.title());
        }
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.tab {
            Tab::Data => data_tab(ui, state),
            Tab::Filtered => filtered_tab(ui, state),
            Tab::Charts => charts_tab(ui, state),
            Tab::Downloads => downloads_tab(ui, state),
        });
}

/// The view when there is one, otherwise a prompt explaining why not.
fn view_or_prompt<'a>(ui: &mut Ui, state: &'a AppState, prompt: &str) -> Option<&'a DashboardView> {
    match &state.view {
        Ok(view) => Some(view),
        Err(DashboardError::MissingFile) => {
            tables::placeholder(ui, prompt);
            None
        }
        Err(e) => {
            tables::placeholder(ui, &e.to_string());
            None
        }
    }
}

fn data_tab(ui: &mut Ui, state: &AppState) {
    ui.heading("📁 Upload & visão inicial dos dados");
    let Some(view) = view_or_prompt(
        ui,
        state,
        "Nenhum arquivo foi carregado ainda. Use a barra lateral para subir o dataset.",
    ) else {
        return;
    };

    ui.label(RichText::new("Visualização das primeiras linhas da base original (sem filtros):").strong());
    tables::dataset_table(ui, "raw_preview", &view.raw_preview);
    ui.add_space(12.0);

    ui.label(RichText::new("Resumo das colunas:").strong());
    tables::summary_table(ui, "raw_summary", &view.raw_summary);
}

fn filtered_tab(ui: &mut Ui, state: &AppState) {
    ui.heading("🧹 Dados após aplicação dos filtros");
    let Some(view) = view_or_prompt(ui, state, "Suba um arquivo na barra lateral para aplicar filtros.")
    else {
        return;
    };

    ui.label(RichText::new("Primeiras linhas da tabela filtrada:").strong());
    tables::dataset_table(ui, "filtered_preview", &view.filtered_preview);
    ui.add_space(8.0);
    ui.label(RichText::new(format!("Quantidade de linhas após filtros: {}", view.filtered.len())).strong());
}

fn charts_tab(ui: &mut Ui, state: &AppState) {
    ui.heading(format!("📊 Proporção de aceite (variável alvo `{}`)", state.config.target_column));
    let Some(view) = view_or_prompt(
        ui,
        state,
        "Suba o arquivo e aplique filtros para visualizar os gráficos.",
    ) else {
        return;
    };

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].heading("Proporção original");
        tables::distribution_table(&mut cols[0], "raw_distribution", &view.raw_distribution);
        cols[1].heading("Proporção com filtros");
        tables::distribution_table(&mut cols[1], "filtered_distribution", &view.filtered_distribution);
    });
    ui.separator();

    if view.is_empty_result() {
        tables::placeholder(ui, "Nenhuma linha atende aos filtros: nada para plotar.");
    } else if let Some(chart) = &view.chart {
        plot::chart_panels(ui, chart);
    }
}

fn downloads_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📥 Downloads");
    if view_or_prompt(ui, state, "Suba um arquivo e aplique filtros para gerar downloads.").is_none() {
        return;
    }

    ui.label("Você pode baixar a tabela filtrada em Excel ou CSV.");
    ui.add_space(8.0);
    ui.horizontal(|ui: &mut Ui| {
        for format in [ExportFormat::Xlsx, ExportFormat::Csv] {
            let label = format!(
                "📥 Download {} ({})",
                format.extension().to_uppercase(),
                format.file_name()
            );
            if ui.button(label).clicked() {
                save_export(state, format);
            }
        }
    });
}

/// Ask where to save, then serialize and write the filtered dataset.
fn save_export(state: &mut AppState, format: ExportFormat) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Salvar tabela filtrada")
        .add_filter(format.extension().to_uppercase(), &[format.extension()])
        .set_file_name(format.file_name())
        .save_file()
    else {
        return;
    };

    let written = state
        .export(format)
        .map_err(anyhow::Error::from)
        .and_then(|blob| {
            std::fs::write(&path, &blob.bytes)
                .with_context(|| format!("writing {}", path.display()))
        });

    match written {
        Ok(()) => {
            log::info!("Saved {}", path.display());
            state.status_message = Some(format!("Arquivo salvo em {}", path.display()));
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Erro: {e:#}"));
        }
    }
}
