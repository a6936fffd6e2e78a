use std::collections::HashSet;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use thiserror::Error;

use super::model::{CellValue, Column, Dataset};
use crate::error::{DashboardError, DatasetError, Result};

/// Strings read as missing values, matching the usual dataframe defaults.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Why a single parser rejected the upload.
#[derive(Debug, Error)]
enum ParseError {
    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("{0}")]
    Dataset(#[from] DatasetError),

    #[error("no header row")]
    NoHeader,

    #[error("workbook has no worksheet")]
    NoWorksheet,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse an uploaded byte stream.
///
/// Delimited text with `delimiter` is tried first; on any failure the bytes
/// are read as a spreadsheet (first worksheet, first row is the header).
/// A dataset either loads completely or not at all.
pub fn load(bytes: &[u8], delimiter: u8) -> Result<Dataset> {
    let delimited_err = match parse_delimited(bytes, delimiter) {
        Ok(dataset) => {
            log::debug!("parsed upload as delimited text ({} rows)", dataset.len());
            return Ok(dataset);
        }
        Err(e) => e,
    };
    log::debug!("delimited parse failed ({delimited_err}), trying spreadsheet");

    match parse_spreadsheet(bytes) {
        Ok(dataset) => {
            log::debug!("parsed upload as spreadsheet ({} rows)", dataset.len());
            Ok(dataset)
        }
        Err(spreadsheet_err) => Err(DashboardError::Format {
            delimited: delimited_err.to_string(),
            spreadsheet: spreadsheet_err.to_string(),
        }),
    }
}

/// Parse delimited text with a header row.
///
/// Ragged rows, invalid UTF-8 and a missing header are all errors.
pub fn parse_delimited_text(bytes: &[u8], delimiter: u8) -> Result<Dataset> {
    parse_delimited(bytes, delimiter).map_err(|e| DashboardError::Format {
        delimited: e.to_string(),
        spreadsheet: "not attempted".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

fn parse_delimited(bytes: &[u8], delimiter: u8) -> std::result::Result<Dataset, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let raw_headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if raw_headers.is_empty() {
        return Err(ParseError::NoHeader);
    }
    let headers = normalize_headers(raw_headers);

    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        for (col, field) in raw_columns.iter_mut().zip(record.iter()) {
            col.push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw_columns)
        .map(|(name, raw)| Column::new(name, infer_column(raw)))
        .collect();

    Ok(Dataset::new(columns)?)
}

/// Type a column of raw text as a whole: integers, then floats, then
/// booleans, otherwise the original strings.
fn infer_column(raw: Vec<String>) -> Vec<CellValue> {
    let present = || raw.iter().filter(|s| !is_na(s));

    if present().all(|s| s.trim().parse::<i64>().is_ok()) {
        return typed(&raw, |s| s.trim().parse().ok().map(CellValue::Integer));
    }
    if present().all(|s| s.trim().parse::<f64>().is_ok()) {
        return typed(&raw, |s| s.trim().parse().ok().map(CellValue::Float));
    }
    if present().all(|s| parse_bool(s).is_some()) {
        return typed(&raw, |s| parse_bool(s).map(CellValue::Bool));
    }
    raw.into_iter()
        .map(|s| {
            if is_na(&s) {
                CellValue::Null
            } else {
                CellValue::String(s)
            }
        })
        .collect()
}

fn typed(raw: &[String], parse: impl Fn(&str) -> Option<CellValue>) -> Vec<CellValue> {
    raw.iter()
        .map(|s| {
            if is_na(s) {
                CellValue::Null
            } else {
                parse(s).unwrap_or(CellValue::Null)
            }
        })
        .collect()
}

fn is_na(s: &str) -> bool {
    NA_VALUES.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet
// ---------------------------------------------------------------------------

fn parse_spreadsheet(bytes: &[u8]) -> std::result::Result<Dataset, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)??;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(ParseError::NoHeader)?;
    let headers = normalize_headers(
        header_row
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string(),
            })
            .collect(),
    );

    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    let dataset = Dataset::from_rows(headers, rows)?;
    Ok(unify_numeric_columns(dataset))
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        // Excel stores every number as a float.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if is_na(s) => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Empty | Data::Error(_) => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

/// Columns mixing integers and floats become float columns.
fn unify_numeric_columns(dataset: Dataset) -> Dataset {
    let needs_promotion = |col: &Column| {
        col.is_numeric() && col.values.iter().any(|v| matches!(v, CellValue::Float(_)))
    };
    if !dataset.columns().iter().any(needs_promotion) {
        return dataset;
    }

    let columns: Vec<Column> = dataset
        .columns()
        .iter()
        .map(|col| {
            if !needs_promotion(col) {
                return col.clone();
            }
            let values = col
                .values
                .iter()
                .map(|v| v.as_f64().map_or(CellValue::Null, CellValue::Float))
                .collect();
            Column::new(col.name.clone(), values)
        })
        .collect();
    Dataset::new(columns).unwrap_or(dataset)
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Name blank headers `Unnamed: {i}` and suffix repeats with `.1`, `.2`, …
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 0;
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{base}.{n}");
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK_CSV: &str = "\"age\";\"job\";\"marital\";\"y\"\n\
        56;\"housemaid\";\"married\";\"no\"\n\
        37;\"services\";\"married\";\"yes\"\n\
        40;\"admin.\";\"single\";\"no\"\n";

    #[test]
    fn loads_semicolon_text() {
        let ds = load(BANK_CSV.as_bytes(), b';').unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.column_names().collect::<Vec<_>>(),
            vec!["age", "job", "marital", "y"]
        );
        assert_eq!(
            ds.column("age").unwrap().values,
            vec![CellValue::from(56), 37.into(), 40.into()]
        );
        assert_eq!(ds.column("job").unwrap().values[2], CellValue::from("admin."));
    }

    #[test]
    fn infers_each_column_as_a_whole() {
        let ds = load(b"a;b;c;d\n1;1.5;true;x\n2;2;False;3\n;NA;;\n", b';').unwrap();
        assert_eq!(ds.column("a").unwrap().values, vec![1.into(), 2.into(), CellValue::Null]);
        assert_eq!(
            ds.column("b").unwrap().values,
            vec![1.5.into(), 2.0.into(), CellValue::Null]
        );
        assert_eq!(
            ds.column("c").unwrap().values,
            vec![CellValue::Bool(true), CellValue::Bool(false), CellValue::Null]
        );
        // A single non-numeric cell keeps the whole column as text.
        assert_eq!(ds.column("d").unwrap().values, vec!["x".into(), "3".into(), CellValue::Null]);
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let ds = load(b"age;job;y\n", b';').unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.columns().len(), 3);
    }

    #[test]
    fn binary_content_is_a_format_error() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff, 0xfe, 0x10];
        let err = load(&png, b';').unwrap_err();
        assert!(matches!(err, DashboardError::Format { .. }), "{err}");
    }

    #[test]
    fn empty_upload_is_a_format_error() {
        assert!(matches!(load(b"", b';'), Err(DashboardError::Format { .. })));
    }

    #[test]
    fn ragged_text_is_rejected_by_the_text_parser() {
        assert!(parse_delimited_text(b"a;b\n1;2;3\n", b';').is_err());
    }

    #[test]
    fn headers_are_made_unique() {
        let headers = normalize_headers(vec!["a".into(), "".into(), "a".into(), "a".into()]);
        assert_eq!(headers, vec!["a", "Unnamed: 1", "a.1", "a.2"]);
    }

    #[test]
    fn spreadsheet_floats_collapse_to_integers() {
        assert_eq!(spreadsheet_cell(&Data::Float(40.0)), CellValue::Integer(40));
        assert_eq!(spreadsheet_cell(&Data::Float(1.1)), CellValue::Float(1.1));
        assert_eq!(spreadsheet_cell(&Data::Empty), CellValue::Null);
    }
}
