use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
///
/// The hue wheel starts at blue so a two-category target reads like the
/// usual blue/orange pair.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue % 360.0, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Category colours shared by both chart panels
// ---------------------------------------------------------------------------

/// Maps category labels to distinct colours.
///
/// Built over the union of labels of every panel, so one label keeps its
/// colour even when it is missing from the filtered side.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<CellValue, Color32>,
}

impl CategoryColors {
    pub fn for_labels<'a>(labels: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let unique: BTreeSet<&CellValue> = labels.into_iter().collect();
        let palette = generate_palette(unique.len());
        let mapping = unique
            .into_iter()
            .cloned()
            .zip(palette)
            .collect();
        Self { mapping }
    }

    /// Look up the colour for a label, grey if it was never registered.
    pub fn color_for(&self, label: &CellValue) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }

    /// Legend entries (label text → colour), sorted by label.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(label, c)| (label.label(), *c))
            .collect()
    }
}
