use std::collections::BTreeMap;

use super::model::{CellValue, Dataset};
use crate::error::SchemaError;

/// Percentage breakdown of one column's values, sorted by label ascending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Distribution {
    pub column: String,
    entries: Vec<(CellValue, f64)>,
    /// Non-null cells the percentages were computed over.
    total: usize,
}

impl Distribution {
    pub fn entries(&self) -> &[(CellValue, f64)] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &CellValue> {
        self.entries.iter().map(|(label, _)| label)
    }

    pub fn percentage(&self, label: &CellValue) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, pct)| *pct)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Relative frequency of each distinct value of `target_column`, in percent.
///
/// Null cells are left out of both the counts and the total. With no
/// non-null cells the distribution is empty.
pub fn distribution(dataset: &Dataset, target_column: &str) -> Result<Distribution, SchemaError> {
    let column = dataset.require_column(target_column)?;

    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for value in column.values.iter().filter(|v| !v.is_null()) {
        *counts.entry(value).or_default() += 1;
    }
    let total: usize = counts.values().sum();

    let entries = if total == 0 {
        Vec::new()
    } else {
        counts
            .into_iter()
            .map(|(label, n)| (label.clone(), n as f64 * 100.0 / total as f64))
            .collect()
    };

    Ok(Distribution {
        column: target_column.to_string(),
        entries,
        total,
    })
}
