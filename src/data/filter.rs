use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use super::model::{CellValue, Dataset};
use crate::config::DashboardConfig;
use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Filter predicate: numeric range + which values are selected per column
// ---------------------------------------------------------------------------

/// Inclusive `[low, high]` bounds over one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRange {
    pub column: String,
    pub low: f64,
    pub high: f64,
}

impl NumericRange {
    pub fn contains(&self, value: &CellValue) -> bool {
        value
            .as_f64()
            .is_some_and(|v| v >= self.low && v <= self.high)
    }
}

/// Selection state of one categorical column.
///
/// `all` is the "no restriction" sentinel: while it is set, `values` is
/// ignored. With `all` unset and nothing in `values`, no row passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategorySelection {
    pub all: bool,
    pub values: BTreeSet<CellValue>,
}

impl CategorySelection {
    /// The sentinel alone, i.e. show everything.
    pub fn all() -> Self {
        Self {
            all: true,
            values: BTreeSet::new(),
        }
    }

    pub fn only(values: impl IntoIterator<Item = CellValue>) -> Self {
        Self {
            all: false,
            values: values.into_iter().collect(),
        }
    }

    pub fn permits(&self, value: &CellValue) -> bool {
        self.all || self.values.contains(value)
    }

    /// Toggle one value in or out of the permitted set.
    pub fn toggle(&mut self, value: &CellValue) {
        if !self.values.remove(value) {
            self.values.insert(value.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFilter {
    pub column: String,
    pub selection: CategorySelection,
}

/// The combined numeric-range and categorical-inclusion predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    /// `None` when the range column had no numeric values to bound.
    pub range: Option<NumericRange>,
    pub categories: Vec<CategoryFilter>,
}

impl FilterSpec {
    /// Stable hash of the spec, used as a memo key.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        if let Some(range) = &self.range {
            range.column.hash(&mut hasher);
            range.low.to_bits().hash(&mut hasher);
            range.high.to_bits().hash(&mut hasher);
        }
        for cat in &self.categories {
            cat.column.hash(&mut hasher);
            cat.selection.hash(&mut hasher);
        }
        hasher.finish()
    }

    pub fn selection(&self, column: &str) -> Option<&CategorySelection> {
        self.categories
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.selection)
    }

    pub fn selection_mut(&mut self, column: &str) -> Option<&mut CategorySelection> {
        self.categories
            .iter_mut()
            .find(|c| c.column == column)
            .map(|c| &mut c.selection)
    }
}

// ---------------------------------------------------------------------------
// Filter options: what the selectors offer for a given dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOptions {
    pub column: String,
    pub label: String,
    /// Sorted distinct non-null values.
    pub values: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub range_column: String,
    pub range_label: String,
    /// Slider bounds: floor of the observed minimum, ceil of the maximum.
    pub range_bounds: Option<(f64, f64)>,
    pub categories: Vec<CategoryOptions>,
}

impl FilterOptions {
    /// Enumerate selector options from the loaded dataset.
    pub fn from_dataset(dataset: &Dataset, config: &DashboardConfig) -> Result<Self, SchemaError> {
        dataset.require_columns(config.required_columns())?;

        let range_col = dataset.require_column(&config.range_column)?;
        if !range_col.is_numeric() {
            return Err(SchemaError::NotNumeric(config.range_column.clone()));
        }
        let range_bounds = range_col
            .numeric_range()
            .map(|(lo, hi)| (lo.floor(), hi.ceil()));

        let categories = config
            .categorical_columns
            .iter()
            .map(|cat| -> Result<CategoryOptions, SchemaError> {
                let column = dataset.require_column(&cat.name)?;
                Ok(CategoryOptions {
                    column: cat.name.clone(),
                    label: cat.label.clone(),
                    values: column.unique_values().into_iter().collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            range_column: config.range_column.clone(),
            range_label: config.range_label.clone(),
            range_bounds,
            categories,
        })
    }

    /// Full range and `all` on every categorical column.
    pub fn default_spec(&self) -> FilterSpec {
        FilterSpec {
            range: self.range_bounds.map(|(low, high)| NumericRange {
                column: self.range_column.clone(),
                low,
                high,
            }),
            categories: self
                .categories
                .iter()
                .map(|c| CategoryFilter {
                    column: c.column.clone(),
                    selection: CategorySelection::all(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Applying the predicate
// ---------------------------------------------------------------------------

/// Return indices of rows that pass every predicate, in original order.
///
/// A row passes when:
/// * its range-column value is numeric and inside `[low, high]`
/// * for each categorical filter, the sentinel is set or its value is selected
pub fn matching_rows(dataset: &Dataset, spec: &FilterSpec) -> Result<Vec<usize>, SchemaError> {
    let range = match &spec.range {
        Some(range) => Some((range, dataset.require_column(&range.column)?)),
        None => None,
    };

    // Sentinel columns never reject a row, skip them up front.
    let active = spec
        .categories
        .iter()
        .filter(|c| !c.selection.all)
        .map(|c| dataset.require_column(&c.column).map(|col| (&c.selection, col)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((0..dataset.len())
        .filter(|&row| {
            if let Some((range, column)) = &range {
                if !range.contains(&column.values[row]) {
                    return false;
                }
            }
            active
                .iter()
                .all(|(selection, column)| selection.permits(&column.values[row]))
        })
        .collect())
}

/// Dataset of the rows matching `spec`, reindexed from zero.
pub fn filter(dataset: &Dataset, spec: &FilterSpec) -> Result<Dataset, SchemaError> {
    let rows = matching_rows(dataset, spec)?;
    log::debug!("filter kept {} of {} rows", rows.len(), dataset.len());
    Ok(dataset.take_rows(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn bank() -> Dataset {
        Dataset::new(vec![
            Column::new("age", vec![25.into(), 40.into(), 60.into()]),
            Column::new("job", vec!["admin.".into(), "services".into(), "admin.".into()]),
            Column::new("y", vec!["no".into(), "yes".into(), "no".into()]),
        ])
        .unwrap()
    }

    fn spec(low: f64, high: f64, job: CategorySelection) -> FilterSpec {
        FilterSpec {
            range: Some(NumericRange {
                column: "age".into(),
                low,
                high,
            }),
            categories: vec![CategoryFilter {
                column: "job".into(),
                selection: job,
            }],
        }
    }

    #[test]
    fn range_is_inclusive() {
        let out = filter(&bank(), &spec(30.0, 50.0, CategorySelection::all())).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.column("age").unwrap().values, vec![CellValue::from(40)]);

        let out = filter(&bank(), &spec(25.0, 60.0, CategorySelection::all())).unwrap();
        assert_eq!(out, bank());
    }

    #[test]
    fn selected_values_restrict_rows() {
        let only_admin = CategorySelection::only(["admin.".into()]);
        let out = filter(&bank(), &spec(0.0, 100.0, only_admin)).unwrap();
        assert_eq!(out.column("age").unwrap().values, vec![CellValue::from(25), 60.into()]);
    }

    #[test]
    fn sentinel_wins_over_selected_values() {
        let mut selection = CategorySelection::only(["services".into()]);
        selection.all = true;
        let out = filter(&bank(), &spec(0.0, 100.0, selection)).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn empty_selection_keeps_nothing() {
        let out = filter(&bank(), &spec(0.0, 100.0, CategorySelection::only([]))).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.columns().len(), 3);
    }

    #[test]
    fn null_range_value_fails_the_range() {
        let ds = Dataset::new(vec![Column::new("age", vec![CellValue::Null, 30.into()])]).unwrap();
        let spec = FilterSpec {
            range: Some(NumericRange {
                column: "age".into(),
                low: 0.0,
                high: 100.0,
            }),
            categories: vec![],
        };
        assert_eq!(matching_rows(&ds, &spec).unwrap(), vec![1]);
    }

    #[test]
    fn unknown_column_is_a_schema_error() {
        let mut s = spec(0.0, 100.0, CategorySelection::only([]));
        s.categories[0].column = "loan".into();
        assert_eq!(
            filter(&bank(), &s).unwrap_err(),
            SchemaError::MissingColumns(vec!["loan".into()])
        );
    }

    #[test]
    fn options_follow_the_dataset() {
        let config = DashboardConfig {
            categorical_columns: vec![crate::config::CategoricalColumn::new("job", "Profissão")],
            ..DashboardConfig::default()
        };
        let options = FilterOptions::from_dataset(&bank(), &config).unwrap();
        assert_eq!(options.range_bounds, Some((25.0, 60.0)));
        assert_eq!(options.categories[0].values, vec![CellValue::from("admin."), "services".into()]);

        let default = options.default_spec();
        assert!(default.selection("job").unwrap().all);
        assert_eq!(filter(&bank(), &default).unwrap(), bank());
    }

    #[test]
    fn text_range_column_is_rejected() {
        let config = DashboardConfig {
            range_column: "job".into(),
            categorical_columns: vec![],
            ..DashboardConfig::default()
        };
        assert_eq!(
            FilterOptions::from_dataset(&bank(), &config).unwrap_err(),
            SchemaError::NotNumeric("job".into())
        );
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = CategorySelection::only([]);
        selection.toggle(&"admin.".into());
        assert!(selection.permits(&"admin.".into()));
        selection.toggle(&"admin.".into());
        assert!(!selection.permits(&"admin.".into()));
    }

    #[test]
    fn fingerprint_tracks_selection() {
        let a = spec(0.0, 100.0, CategorySelection::all());
        let b = spec(0.0, 100.0, CategorySelection::only([]));
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
