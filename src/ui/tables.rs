use eframe::egui::{self, Align, Layout, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::Distribution;
use crate::data::model::Dataset;
use crate::data::summary::ColumnSummary;

const ROW_HEIGHT: f32 = 20.0;

/// Striped table with one text cell per column, horizontally scrollable.
fn text_table(ui: &mut Ui, id: &str, headers: &[String], rows: &[Vec<String>]) {
    ScrollArea::horizontal()
        .id_salt(("hscroll", id))
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            ui.push_id(id, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .vscroll(false)
                    .cell_layout(Layout::left_to_right(Align::Center))
                    .columns(Column::auto().at_least(60.0).resizable(true), headers.len())
                    .header(ROW_HEIGHT + 4.0, |mut header| {
                        for h in headers {
                            header.col(|ui: &mut Ui| {
                                ui.strong(h);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                            let cells = &rows[row.index()];
                            for cell in cells {
                                row.col(|ui: &mut Ui| {
                                    ui.label(cell);
                                });
                            }
                        });
                    });
            });
        });
}

/// Render the rows of a dataset, with a leading row-number column.
pub fn dataset_table(ui: &mut Ui, id: &str, dataset: &Dataset) {
    let headers: Vec<String> = std::iter::once(String::new())
        .chain(dataset.column_names().map(str::to_string))
        .collect();
    let rows: Vec<Vec<String>> = (0..dataset.len())
        .map(|i| {
            std::iter::once(i.to_string())
                .chain(dataset.row(i).map(|cell| cell.label()))
                .collect()
        })
        .collect();
    text_table(ui, id, &headers, &rows);
}

/// Render per-column statistics, one row per column.
pub fn summary_table(ui: &mut Ui, id: &str, summaries: &[ColumnSummary]) {
    let headers: Vec<String> = [
        "", "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();

    let num = |v: Option<f64>| v.map(|v| format!("{v:.4}")).unwrap_or_default();
    let int = |v: Option<usize>| v.map(|v| v.to_string()).unwrap_or_default();

    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.count.to_string(),
                int(s.unique),
                s.top.as_ref().map(|t| t.label()).unwrap_or_default(),
                int(s.freq),
                num(s.mean),
                num(s.std),
                num(s.min),
                num(s.q25),
                num(s.q50),
                num(s.q75),
                num(s.max),
            ]
        })
        .collect();
    text_table(ui, id, &headers, &rows);
}

/// Render a distribution as a `label | percentual` table.
pub fn distribution_table(ui: &mut Ui, id: &str, dist: &Distribution) {
    if dist.is_empty() {
        ui.label(RichText::new("Sem dados").weak());
        return;
    }
    let headers = vec![dist.column.clone(), "percentual".to_string()];
    let rows: Vec<Vec<String>> = dist
        .entries()
        .iter()
        .map(|(label, pct)| vec![label.label(), format!("{pct:.6}")])
        .collect();
    text_table(ui, id, &headers, &rows);
}

/// Small helper for the "nothing to show yet" states.
pub fn placeholder(ui: &mut Ui, text: &str) {
    ui.add_space(12.0);
    ui.label(RichText::new(format!("⚠ {text}")).color(egui::Color32::from_rgb(200, 150, 0)));
}
