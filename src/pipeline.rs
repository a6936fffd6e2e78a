//! One call per interaction: upload bytes + filter selections in, everything
//! the dashboard shows out.
//!
//! ```text
//!  Upload ──load──▶ raw Dataset ──filter──▶ filtered Dataset
//!                      │                        │
//!                  distribution             distribution
//!                      └──────── render ────────┘
//!                                  │
//!                                Chart
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::chart::{self, Chart, ChartKind};
use crate::config::DashboardConfig;
use crate::data::aggregate::{distribution, Distribution};
use crate::data::export::{ExportBlob, ExportFormat};
use crate::data::filter::{FilterOptions, FilterSpec};
use crate::data::model::Dataset;
use crate::data::summary::ColumnSummary;
use crate::error::{DashboardError, Result};
use crate::memo::PipelineCache;

/// The raw bytes of an uploaded file. Never changes once created.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }
}

/// Everything the dashboard renders for one interaction.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub raw: Arc<Dataset>,
    pub raw_preview: Dataset,
    pub raw_summary: Arc<Vec<ColumnSummary>>,
    /// Values offered by the filter selectors.
    pub options: FilterOptions,
    /// The filters actually applied (the defaults right after an upload).
    pub spec: FilterSpec,
    pub filtered: Arc<Dataset>,
    pub filtered_preview: Dataset,
    pub raw_distribution: Distribution,
    pub filtered_distribution: Distribution,
    /// `None` when no row survives the filters.
    pub chart: Option<Chart>,
}

impl DashboardView {
    /// Filters matched nothing. Views fall back to their "no data" state.
    pub fn is_empty_result(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Run the whole pipeline for the current inputs.
///
/// `spec == None` means "no selections yet": the default spec derived from
/// the loaded dataset is applied and returned in the view.
pub fn compute_view_state(
    upload: Option<&Upload>,
    spec: Option<&FilterSpec>,
    chart_kind: ChartKind,
    config: &DashboardConfig,
    cache: &mut PipelineCache,
) -> Result<DashboardView> {
    let upload = upload.ok_or(DashboardError::MissingFile)?;
    let raw = cache.load(&upload.bytes, config.delimiter_byte())?;

    let options = FilterOptions::from_dataset(&raw, config)?;
    let spec = spec.cloned().unwrap_or_else(|| options.default_spec());
    let filtered = cache.filter(&raw, &spec)?;

    let raw_distribution = distribution(&raw, &config.target_column)?;
    let filtered_distribution = distribution(&filtered, &config.target_column)?;

    let chart = if filtered.is_empty() {
        log::info!("filters matched no rows, skipping chart");
        None
    } else {
        Some(chart::render(
            (&raw_distribution, &filtered_distribution),
            chart_kind,
        ))
    };

    log::debug!(
        "view for '{}': {} raw rows, {} filtered",
        upload.name,
        raw.len(),
        filtered.len()
    );

    Ok(DashboardView {
        raw_preview: raw.head(config.preview_rows),
        raw_summary: cache.describe(&raw),
        filtered_preview: filtered.head(config.preview_rows),
        raw,
        options,
        spec,
        filtered,
        raw_distribution,
        filtered_distribution,
        chart,
    })
}

/// Serialize the filtered dataset of `view` for download.
pub fn export_filtered(
    view: &DashboardView,
    format: ExportFormat,
    cache: &mut PipelineCache,
) -> Result<Arc<ExportBlob>> {
    cache.export(&view.filtered, format)
}
