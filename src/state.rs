use std::path::Path;
use std::sync::Arc;

use crate::chart::ChartKind;
use crate::config::DashboardConfig;
use crate::data::export::{ExportBlob, ExportFormat};
use crate::data::filter::{CategorySelection, FilterSpec};
use crate::data::model::CellValue;
use crate::error::{DashboardError, Result};
use crate::memo::PipelineCache;
use crate::pipeline::{compute_view_state, export_filtered, DashboardView, Upload};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Data,
    Filtered,
    Charts,
    Downloads,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Data, Tab::Filtered, Tab::Charts, Tab::Downloads];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Data => "📁 Upload & Dados",
            Tab::Filtered => "🧹 Filtros & Tabela",
            Tab::Charts => "📊 Gráficos",
            Tab::Downloads => "📥 Downloads",
        }
    }
}

/// The full UI state, independent of rendering.
///
/// The side-panel form edits `draft_spec` / `draft_chart`; nothing is
/// recomputed until [`AppState::apply_filters`] copies them over.
pub struct AppState {
    pub config: DashboardConfig,
    cache: PipelineCache,

    /// Uploaded file (None until the user picks one).
    pub upload: Option<Upload>,

    /// Selections applied to the current view.
    applied_spec: Option<FilterSpec>,
    chart_kind: ChartKind,

    /// Selections being edited in the form.
    pub draft_spec: FilterSpec,
    pub draft_chart: ChartKind,

    /// Result of the last pipeline run.
    pub view: Result<DashboardView>,

    pub tab: Tab,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = PipelineCache::new(config.cache_capacity);
        Self {
            config,
            cache,
            upload: None,
            applied_spec: None,
            chart_kind: ChartKind::default(),
            draft_spec: FilterSpec::default(),
            draft_chart: ChartKind::default(),
            view: Err(DashboardError::MissingFile),
            tab: Tab::default(),
            status_message: None,
        }
    }

    /// Ingest a newly uploaded file; selections reset to the dataset defaults.
    ///
    /// An unreadable upload is reported and the previous file stays active.
    pub fn set_upload(&mut self, upload: Upload) {
        let previous = self.upload.replace(upload);
        let previous_spec = self.applied_spec.take();
        self.recompute();

        let outcome = match &self.view {
            Ok(view) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    view.raw.len(),
                    view.raw.column_names().collect::<Vec<_>>()
                );
                Ok(view.spec.clone())
            }
            Err(e) => Err((matches!(e, DashboardError::Format { .. }), e.to_string())),
        };

        match outcome {
            Ok(spec) => {
                self.draft_spec = spec;
                self.status_message = None;
            }
            Err((unreadable, message)) => {
                self.status_message = Some(format!("Erro: {message}"));
                if unreadable {
                    log::error!("Failed to load upload: {message}");
                    self.upload = previous;
                    self.applied_spec = previous_spec;
                    self.recompute();
                } else {
                    log::warn!("Upload loaded but unusable: {message}");
                }
            }
        }
    }

    /// Load a file from disk and make it the current upload.
    pub fn open_path(&mut self, path: &Path) {
        match Upload::from_path(path) {
            Ok(upload) => self.set_upload(upload),
            Err(e) => {
                log::error!("Failed to read file: {e:#}");
                self.status_message = Some(format!("Erro: {e:#}"));
            }
        }
    }

    /// Submit the form: the draft selections become the applied ones.
    pub fn apply_filters(&mut self) {
        self.applied_spec = Some(self.draft_spec.clone());
        self.chart_kind = self.draft_chart;
        self.recompute();
        self.status_message = match &self.view {
            Ok(_) | Err(DashboardError::MissingFile) => None,
            Err(e) => Some(format!("Erro: {e}")),
        };
    }

    /// Re-run the pipeline for the current upload and applied selections.
    pub fn recompute(&mut self) {
        self.view = compute_view_state(
            self.upload.as_ref(),
            self.applied_spec.as_ref(),
            self.chart_kind,
            &self.config,
            &mut self.cache,
        );
        let (hits, misses) = self.cache.stats();
        log::debug!("pipeline cache: {hits} hits, {misses} misses");
    }

    /// Toggle a single value in a column's draft selection.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        if let Some(selection) = self.draft_spec.selection_mut(column) {
            selection.toggle(value);
        }
    }

    /// Toggle the `all` sentinel of a column's draft selection.
    pub fn toggle_all(&mut self, column: &str) {
        if let Some(selection) = self.draft_spec.selection_mut(column) {
            selection.all = !selection.all;
        }
    }

    /// Reset a column's draft selection to just the sentinel.
    pub fn select_all(&mut self, column: &str) {
        if let Some(selection) = self.draft_spec.selection_mut(column) {
            *selection = CategorySelection::all();
        }
    }

    /// Clear a column's draft selection, sentinel included.
    pub fn select_none(&mut self, column: &str) {
        if let Some(selection) = self.draft_spec.selection_mut(column) {
            *selection = CategorySelection::only([]);
        }
    }

    /// Serialize the current filtered dataset.
    pub fn export(&mut self, format: ExportFormat) -> Result<Arc<ExportBlob>> {
        match &self.view {
            Ok(view) => export_filtered(view, format, &mut self.cache),
            Err(_) => Err(DashboardError::MissingFile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: &str = "age;job;marital;default;housing;loan;contact;month;day_of_week;y\n\
        30;admin.;single;no;yes;no;cellular;may;mon;no\n\
        45;services;married;no;no;no;telephone;jun;tue;yes\n";

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_upload(Upload::new("bank.csv", BANK.as_bytes().to_vec()));
        state
    }

    #[test]
    fn starts_without_data() {
        let state = AppState::default();
        assert!(matches!(state.view, Err(DashboardError::MissingFile)));
    }

    #[test]
    fn draft_changes_wait_for_submit() {
        let mut state = loaded();
        state.toggle_all("job");
        state.toggle_filter_value("job", &"admin.".into());
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 2);

        state.apply_filters();
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 1);
    }

    #[test]
    fn chart_kind_applies_on_submit() {
        let mut state = loaded();
        state.draft_chart = ChartKind::Pie;
        let kind = |s: &AppState| s.view.as_ref().unwrap().chart.as_ref().unwrap().kind;
        assert_eq!(kind(&state), ChartKind::Bars);
        state.apply_filters();
        assert_eq!(kind(&state), ChartKind::Pie);
    }

    #[test]
    fn bad_upload_keeps_previous_dataset() {
        let mut state = loaded();
        state.set_upload(Upload::new("junk.bin", vec![0xff, 0xfe, 0x00, 0x89]));
        assert!(state.status_message.is_some());
        assert_eq!(state.upload.as_ref().unwrap().name, "bank.csv");
        assert_eq!(state.view.as_ref().unwrap().raw.len(), 2);
    }

    #[test]
    fn submit_clears_stale_error() {
        let mut state = loaded();
        state.set_upload(Upload::new("junk.bin", vec![0xff, 0xfe, 0x00, 0x89]));
        assert!(state.status_message.is_some());

        state.apply_filters();
        assert!(state.status_message.is_none());
        assert_eq!(state.view.as_ref().unwrap().filtered.len(), 2);
    }

    #[test]
    fn bad_first_upload_leaves_prompt() {
        let mut state = AppState::default();
        state.set_upload(Upload::new("junk.bin", vec![0xff, 0xfe, 0x00, 0x89]));
        assert!(state.upload.is_none());
        assert!(matches!(state.view, Err(DashboardError::MissingFile)));
    }

    #[test]
    fn select_none_then_export_header_only() {
        let mut state = loaded();
        state.select_none("marital");
        state.apply_filters();
        let blob = state.export(ExportFormat::Csv).unwrap();
        assert_eq!(blob.bytes.iter().filter(|&&b| b == b'\n').count(), 1);
    }
}
