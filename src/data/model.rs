use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{DatasetError, SchemaError};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a dataframe would infer.
/// Option lists and distributions live in `BTreeMap` / `BTreeSet`, so
/// `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

/// Renders the cell the way it is written to CSV: floats always keep a
/// decimal point so they read back as floats, `Null` is an empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for range predicates and stats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text used in tables and chart labels (`<null>` instead of blank).
    pub fn label(&self) -> String {
        match self {
            CellValue::Null => "<null>".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Whether every non-null cell is numeric.
    pub fn is_numeric(&self) -> bool {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .all(|v| v.as_f64().is_some())
    }

    /// Sorted set of distinct non-null values.
    pub fn unique_values(&self) -> BTreeSet<CellValue> {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }

    /// Observed `(min, max)` over the numeric cells, `None` if there are none.
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter_map(CellValue::as_f64)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An immutable table of equally long, uniquely named columns.
///
/// Every transformation returns a new `Dataset`. The fingerprint is a hash
/// of the full contents taken at construction and serves as the dataset's
/// identity for memoization.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
    fingerprint: u64,
}

impl Dataset {
    /// Build a dataset, checking the equal-length and unique-name invariants.
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let row_count = columns.first().map_or(0, |c| c.values.len());

        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
            if col.values.len() != row_count {
                return Err(DatasetError::RaggedColumn {
                    column: col.name.clone(),
                    expected: row_count,
                    found: col.values.len(),
                });
            }
        }

        Ok(Self::assemble(columns, row_count))
    }

    fn assemble(columns: Vec<Column>, row_count: usize) -> Self {
        let mut hasher = DefaultHasher::new();
        for col in &columns {
            col.name.hash(&mut hasher);
            col.values.hash(&mut hasher);
        }
        Self {
            columns,
            row_count,
            fingerprint: hasher.finish(),
        }
    }

    /// Build a dataset from a header and row-major records.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, DatasetError> {
        let width = headers.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for (row_no, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(DatasetError::RaggedRow {
                    row: row_no,
                    expected: width,
                    found: row.len(),
                });
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.values.push(value);
            }
        }

        Self::new(columns)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column or fail with a [`SchemaError`].
    pub fn require_column(&self, name: &str) -> Result<&Column, SchemaError> {
        self.column(name)
            .ok_or_else(|| SchemaError::MissingColumns(vec![name.to_string()]))
    }

    /// Check that every named column exists, reporting all missing ones at once.
    pub fn require_columns<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), SchemaError> {
        let missing: Vec<String> = names
            .into_iter()
            .filter(|name| self.column(name).is_none())
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingColumns(missing))
        }
    }

    /// Cells of row `index` in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.columns.iter().map(move |c| &c.values[index])
    }

    /// New dataset holding the given rows, in the given order, reindexed from zero.
    pub fn take_rows(&self, indices: &[usize]) -> Dataset {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        // Names and lengths are inherited from an already valid dataset.
        Self::assemble(columns, indices.len())
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        let indices: Vec<usize> = (0..n.min(self.row_count)).collect();
        self.take_rows(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new("age", vec![25.into(), 40.into(), CellValue::Null]),
            Column::new("y", vec!["yes".into(), "no".into(), "no".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Dataset::new(vec![
            Column::new("a", vec![1.into()]),
            Column::new("b", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, DatasetError::RaggedColumn { found: 0, .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Dataset::new(vec![
            Column::new("a", vec![]),
            Column::new("a", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn from_rows_transposes_records() {
        let ds = Dataset::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![1.into(), "x".into()], vec![2.into(), "y".into()]],
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("b").unwrap().values[1], CellValue::from("y"));
    }

    #[test]
    fn take_rows_reindexes() {
        let ds = sample();
        let sub = ds.take_rows(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.column("age").unwrap().values, vec![CellValue::Null, 25.into()]);
        assert_eq!(sub.column_names().collect::<Vec<_>>(), vec!["age", "y"]);
    }

    #[test]
    fn fingerprint_follows_content() {
        assert_eq!(sample().fingerprint(), sample().fingerprint());
        assert_ne!(sample().fingerprint(), sample().head(1).fingerprint());
    }

    #[test]
    fn unique_values_skip_nulls() {
        let ds = sample();
        let unique = ds.column("age").unwrap().unique_values();
        assert_eq!(unique.len(), 2);
        assert_eq!(ds.column("age").unwrap().numeric_range(), Some((25.0, 40.0)));
    }

    #[test]
    fn require_columns_lists_every_missing_name() {
        let err = sample().require_columns(["age", "job", "loan"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns(vec!["job".to_string(), "loan".to_string()])
        );
    }

    #[test]
    fn float_display_keeps_decimal_point() {
        assert_eq!(CellValue::Float(3.0).to_string(), "3.0");
        assert_eq!(CellValue::Float(1.25).to_string(), "1.25");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Null.label(), "<null>");
    }
}
