//! Chart model for the before/after target distributions.
//!
//! Building a [`Chart`] is pure; `ui::plot` only draws what it describes.

use eframe::egui::Color32;

use crate::color::CategoryColors;
use crate::data::aggregate::Distribution;

pub const RAW_TITLE: &str = "Dados brutos";
pub const FILTERED_TITLE: &str = "Dados filtrados";
pub const PERCENT_AXIS: &str = "Percentual (%)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bars,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::Bars, ChartKind::Pie];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bars => "Barras",
            ChartKind::Pie => "Pizza",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub percentage: f64,
    pub color: Color32,
}

impl Slice {
    /// Pie annotation, two decimals.
    pub fn percent_text(&self) -> String {
        format!("{:.2}%", self.percentage)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub title: &'static str,
    pub slices: Vec<Slice>,
}

/// Two side-by-side panels drawn with one label → colour mapping.
#[derive(Debug, Clone)]
pub struct Chart {
    pub kind: ChartKind,
    pub panels: [ChartPanel; 2],
    pub colors: CategoryColors,
}

/// Lay out the raw and filtered distributions as a two-panel chart.
pub fn render(distributions: (&Distribution, &Distribution), kind: ChartKind) -> Chart {
    let (raw, filtered) = distributions;
    let colors = CategoryColors::for_labels(raw.labels().chain(filtered.labels()));

    let panel = |title, dist: &Distribution| ChartPanel {
        title,
        slices: dist
            .entries()
            .iter()
            .map(|(label, pct)| Slice {
                label: label.label(),
                percentage: *pct,
                color: colors.color_for(label),
            })
            .collect(),
    };

    Chart {
        kind,
        panels: [panel(RAW_TITLE, raw), panel(FILTERED_TITLE, filtered)],
        colors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::distribution;
    use crate::data::model::{Column, Dataset};

    fn dist(values: &[&str]) -> Distribution {
        let ds = Dataset::new(vec![Column::new(
            "y",
            values.iter().map(|v| (*v).into()).collect(),
        )])
        .unwrap();
        distribution(&ds, "y").unwrap()
    }

    #[test]
    fn panels_share_colors() {
        let raw = dist(&["no", "no", "yes"]);
        let filtered = dist(&["yes"]);
        let chart = render((&raw, &filtered), ChartKind::Pie);

        assert_eq!(chart.kind, ChartKind::Pie);
        assert_eq!(chart.panels[0].title, "Dados brutos");
        assert_eq!(chart.panels[1].title, "Dados filtrados");
        let yes_raw = &chart.panels[0].slices[1];
        let yes_filtered = &chart.panels[1].slices[0];
        assert_eq!(yes_raw.label, "yes");
        assert_eq!(yes_raw.color, yes_filtered.color);
        assert_eq!(yes_filtered.percent_text(), "100.00%");
    }

    #[test]
    fn empty_distribution_gives_empty_panel() {
        let raw = dist(&["no"]);
        let chart = render((&raw, &Distribution::default()), ChartKind::Bars);
        assert!(chart.panels[1].slices.is_empty());
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ChartKind::Bars.label(), "Barras");
        assert_eq!(ChartKind::Pie.label(), "Pizza");
        assert_eq!(ChartKind::default(), ChartKind::Bars);
    }
}
