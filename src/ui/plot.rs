use std::f32::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::chart::{Chart, ChartKind, ChartPanel, PERCENT_AXIS};

const PANEL_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Two-panel chart (Gráficos tab)
// ---------------------------------------------------------------------------

/// Draw both panels of `chart` side by side.
pub fn chart_panels(ui: &mut Ui, chart: &Chart) {
    ui.columns(2, |cols: &mut [Ui]| {
        for (ui, panel) in cols.iter_mut().zip(chart.panels.iter()) {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.heading(panel.title);
            });
            match chart.kind {
                ChartKind::Bars => bar_panel(ui, panel),
                ChartKind::Pie => pie_panel(ui, panel),
            }
        }
    });

    if chart.kind == ChartKind::Pie {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for (label, color) in chart.colors.legend_entries() {
                ui.label(RichText::new("■").color(color));
                ui.label(label);
            }
        });
    }
}

fn bar_panel(ui: &mut Ui, panel: &ChartPanel) {
    let labels: Vec<String> = panel.slices.iter().map(|s| s.label.clone()).collect();

    Plot::new(("bar_panel", panel.title))
        .legend(Legend::default())
        .height(PANEL_HEIGHT)
        .y_axis_label(PERCENT_AXIS)
        .include_y(0.0)
        .include_y(100.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (i, slice) in panel.slices.iter().enumerate() {
                // One chart per category so each gets its own legend entry.
                let bar = Bar::new(i as f64, slice.percentage)
                    .width(0.6)
                    .name(&slice.label)
                    .fill(slice.color);
                let chart = BarChart::new(vec![bar])
                    .name(&slice.label)
                    .color(slice.color);
                plot_ui.bar_chart(chart);
            }
        });
}

fn pie_panel(ui: &mut Ui, panel: &ChartPanel) {
    let size = egui::vec2(ui.available_width(), PANEL_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.4;

    let mut start = -TAU / 4.0;
    for slice in &panel.slices {
        let sweep = (slice.percentage / 100.0) as f32 * TAU;
        for points in wedge_points(center, radius, start, sweep) {
            painter.add(Shape::convex_polygon(points, slice.color, Stroke::NONE));
        }

        let mid = start + sweep / 2.0;
        let label_at = center + radius * 0.6 * egui::vec2(mid.cos(), mid.sin());
        painter.text(
            label_at,
            Align2::CENTER_CENTER,
            slice.percent_text(),
            FontId::proportional(13.0),
            Color32::BLACK,
        );
        let name_at = center + radius * 1.15 * egui::vec2(mid.cos(), mid.sin());
        painter.text(
            name_at,
            Align2::CENTER_CENTER,
            &slice.label,
            FontId::proportional(13.0),
            ui.visuals().text_color(),
        );
        start += sweep;
    }
}

/// Split a wedge into convex pieces of at most a quarter turn each.
fn wedge_points(center: Pos2, radius: f32, start: f32, sweep: f32) -> Vec<Vec<Pos2>> {
    const MAX_PIECE: f32 = TAU / 4.0;
    const STEPS_PER_PIECE: usize = 24;

    let pieces = (sweep / MAX_PIECE).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f32;

    (0..pieces)
        .map(|p| {
            let a0 = start + p as f32 * piece_sweep;
            std::iter::once(center)
                .chain((0..=STEPS_PER_PIECE).map(|s| {
                    let a = a0 + piece_sweep * s as f32 / STEPS_PER_PIECE as f32;
                    center + radius * egui::vec2(a.cos(), a.sin())
                }))
                .collect()
        })
        .collect()
}
