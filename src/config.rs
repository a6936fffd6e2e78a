use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "BANKDASH_CONFIG";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// A categorical column offered as a multi-select filter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    /// Caption shown above the selector.
    pub label: String,
}

impl CategoricalColumn {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
        }
    }
}

/// Which columns drive the dashboard and how uploads are read.
///
/// Every field has a default matching the bank telemarketing dataset, so a
/// config file only needs the keys it overrides:
///
/// ```json
/// { "range_column": "duration", "preview_rows": 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Separator tried first when parsing an upload as delimited text.
    pub delimiter: char,
    /// Numeric column filtered by the range sliders.
    pub range_column: String,
    pub range_label: String,
    pub categorical_columns: Vec<CategoricalColumn>,
    /// Column whose distribution is charted.
    pub target_column: String,
    /// Rows shown in the data previews.
    pub preview_rows: usize,
    /// Entries kept per memo table; 0 disables memoization.
    pub cache_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            range_column: "age".to_string(),
            range_label: "Faixa de idade".to_string(),
            categorical_columns: vec![
                CategoricalColumn::new("job", "Profissão"),
                CategoricalColumn::new("marital", "Estado civil"),
                CategoricalColumn::new("default", "Default"),
                CategoricalColumn::new("housing", "Financiamento imóvel?"),
                CategoricalColumn::new("loan", "Empréstimo?"),
                CategoricalColumn::new("contact", "Meio de contato"),
                CategoricalColumn::new("month", "Mês do contato"),
                CategoricalColumn::new("day_of_week", "Dia da semana"),
            ],
            target_column: "y".to_string(),
            preview_rows: 5,
            cache_capacity: 8,
        }
    }
}

impl DashboardConfig {
    /// Load from the file named by `BANKDASH_CONFIG`, or fall back to defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        // The delimiter is handed to the csv reader as a single byte.
        anyhow::ensure!(
            config.delimiter.is_ascii(),
            "delimiter must be an ASCII character, got {:?}",
            config.delimiter
        );
        Ok(config)
    }

    /// Delimiter as the byte the csv reader expects.
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b';')
    }

    /// Every column the upload must contain.
    pub fn required_columns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.range_column.as_str())
            .chain(self.categorical_columns.iter().map(|c| c.name.as_str()))
            .chain(std::iter::once(self.target_column.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_bank_columns() {
        let config = DashboardConfig::default();
        let required: Vec<&str> = config.required_columns().collect();
        assert_eq!(
            required,
            vec![
                "age", "job", "marital", "default", "housing", "loan", "contact", "month",
                "day_of_week", "y"
            ]
        );
        assert_eq!(config.delimiter_byte(), b';');
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = DashboardConfig::from_json(r#"{ "preview_rows": 10, "delimiter": "," }"#).unwrap();
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.delimiter_byte(), b',');
        assert_eq!(config.target_column, "y");
    }

    #[test]
    fn rejects_non_ascii_delimiter() {
        assert!(DashboardConfig::from_json(r#"{ "delimiter": "§" }"#).is_err());
    }
}
