use rust_xlsxwriter::Workbook;

use super::model::{CellValue, Dataset};
use crate::error::{DashboardError, Result};

pub const EXPORT_STEM: &str = "analise_bancaria_filtrada";
pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Xlsx => XLSX_MIME,
        }
    }

    pub fn file_name(self) -> String {
        format!("{EXPORT_STEM}.{}", self.extension())
    }
}

/// A dataset serialized for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

pub fn export(dataset: &Dataset, format: ExportFormat) -> Result<ExportBlob> {
    let bytes = match format {
        ExportFormat::Csv => csv_bytes(dataset)?,
        ExportFormat::Xlsx => xlsx_bytes(dataset)?,
    };
    log::info!(
        "exported {} rows as {} ({} bytes)",
        dataset.len(),
        format.extension(),
        bytes.len()
    );
    Ok(ExportBlob {
        bytes,
        mime: format.mime(),
        file_name: format.file_name(),
    })
}

/// UTF-8, comma separated, header row, no index column.
pub fn export_csv(dataset: &Dataset) -> Result<ExportBlob> {
    export(dataset, ExportFormat::Csv)
}

/// Single `Sheet1` worksheet with a header row.
pub fn export_spreadsheet(dataset: &Dataset) -> Result<ExportBlob> {
    export(dataset, ExportFormat::Xlsx)
}

fn csv_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    let csv_err = |e: csv::Error| DashboardError::Export(e.to_string());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(dataset.column_names()).map_err(csv_err)?;
    for row in 0..dataset.len() {
        writer
            .write_record(dataset.row(row).map(|cell| cell.to_string()))
            .map_err(csv_err)?;
    }
    writer
        .into_inner()
        .map_err(|e| DashboardError::Export(e.to_string()))
}

fn xlsx_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, column) in dataset.columns().iter().enumerate() {
        let col = u16::try_from(col)
            .map_err(|_| DashboardError::Export("too many columns for a worksheet".into()))?;
        sheet.write_string(0, col, column.name.as_str())?;

        for (row, cell) in column.values.iter().enumerate() {
            let row = u32::try_from(row + 1)
                .map_err(|_| DashboardError::Export("too many rows for a worksheet".into()))?;
            match cell {
                CellValue::String(s) => {
                    sheet.write_string(row, col, s.as_str())?;
                }
                CellValue::Integer(i) => {
                    sheet.write_number(row, col, *i as f64)?;
                }
                CellValue::Float(v) => {
                    sheet.write_number(row, col, *v)?;
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(row, col, *b)?;
                }
                CellValue::Null => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
