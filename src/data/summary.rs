use std::collections::HashMap;

use super::model::{CellValue, Column, Dataset};

/// Descriptive statistics for one column.
///
/// Numeric columns fill the numeric fields; every other column fills
/// `unique`, `top` and `freq`. Fields that do not apply stay `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnSummary {
    pub name: String,
    /// Non-null cells.
    pub count: usize,
    pub unique: Option<usize>,
    pub top: Option<CellValue>,
    pub freq: Option<usize>,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Per-column statistics, one entry per column in column order.
pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset.columns().iter().map(summarize).collect()
}

fn summarize(column: &Column) -> ColumnSummary {
    let present: Vec<&CellValue> = column.values.iter().filter(|v| !v.is_null()).collect();
    let count = present.len();

    if count > 0 && column.is_numeric() {
        let mut values: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
        values.sort_by(f64::total_cmp);
        return numeric_summary(&column.name, &values);
    }

    // Most frequent value, ties going to the one seen first.
    let mut counts: HashMap<&CellValue, (usize, usize)> = HashMap::new();
    for (pos, value) in present.iter().enumerate() {
        counts.entry(*value).or_insert((0, pos)).0 += 1;
    }
    let top = counts
        .iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(value, (n, _))| ((*value).clone(), *n));

    ColumnSummary {
        name: column.name.clone(),
        count,
        unique: Some(counts.len()),
        freq: top.as_ref().map(|(_, n)| *n),
        top: top.map(|(value, _)| value),
        ..ColumnSummary::default()
    }
}

/// `sorted` must be non-empty and ascending.
fn numeric_summary(name: &str, sorted: &[f64]) -> ColumnSummary {
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let std = (sorted.len() > 1).then(|| {
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    });

    ColumnSummary {
        name: name.to_string(),
        count: sorted.len(),
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        q25: Some(quantile(sorted, 0.25)),
        q50: Some(quantile(sorted, 0.50)),
        q75: Some(quantile(sorted, 0.75)),
        max: sorted.last().copied(),
        ..ColumnSummary::default()
    }
}

/// Linear interpolation between the closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
