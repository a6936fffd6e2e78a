//! End-to-end tests: upload bytes in, dashboard view and downloads out.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader};

use bankdash::chart::ChartKind;
use bankdash::config::DashboardConfig;
use bankdash::data::export::{export_spreadsheet, ExportFormat, XLSX_MIME};
use bankdash::data::filter::CategorySelection;
use bankdash::data::loader::load;
use bankdash::data::model::{CellValue, Column, Dataset};
use bankdash::error::DashboardError;
use bankdash::memo::PipelineCache;
use bankdash::pipeline::{compute_view_state, export_filtered, Upload};

const BANK_CSV: &str = "\
age;job;marital;default;housing;loan;contact;month;day_of_week;duration;y
25;admin.;single;no;yes;no;cellular;may;mon;120;no
40;services;married;no;no;no;telephone;jun;tue;310;yes
60;retired;married;no;yes;yes;cellular;may;fri;95;no
33;admin.;divorced;unknown;yes;no;cellular;aug;thu;402;yes
";

fn bank_upload() -> Upload {
    Upload::new("bank-additional-full.csv", BANK_CSV.as_bytes().to_vec())
}

fn config() -> DashboardConfig {
    DashboardConfig::default()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn semicolon_csv_loads_typed() {
    let dataset = load(BANK_CSV.as_bytes(), b';').unwrap();
    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.columns().len(), 11);
    assert!(dataset.require_column("age").unwrap().is_numeric());
    assert!(!dataset.require_column("job").unwrap().is_numeric());
}

#[test]
fn spreadsheet_export_reloads() {
    let original = Dataset::new(vec![
        Column::new("age", vec![25.into(), 40.into(), 60.into()]),
        Column::new("job", vec!["admin.".into(), "services".into(), "retired".into()]),
        Column::new("rate", vec![1.5.into(), 2.0.into(), 0.25.into()]),
        Column::new("y", vec!["no".into(), "yes".into(), "no".into()]),
    ])
    .unwrap();

    let blob = export_spreadsheet(&original).unwrap();
    assert_eq!(blob.mime, XLSX_MIME);
    assert_eq!(blob.file_name, "analise_bancaria_filtrada.xlsx");

    let workbook = open_workbook_auto_from_rs(Cursor::new(blob.bytes.clone())).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);

    let reloaded = load(&blob.bytes, b';').unwrap();
    assert_eq!(reloaded, original);
}

#[test]
fn binary_upload_is_a_format_error() {
    let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0xff, 0xfe];
    let err = load(&png, b';').unwrap_err();
    assert!(matches!(err, DashboardError::Format { .. }), "{err}");
}

#[test]
fn upload_from_disk_feeds_the_pipeline() {
    let dir = std::env::temp_dir().join(format!("bankdash-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bank.csv");
    std::fs::write(&path, BANK_CSV).unwrap();

    let upload = Upload::from_path(&path).unwrap();
    assert_eq!(upload.name, "bank.csv");
    let view = compute_view_state(
        Some(&upload),
        None,
        ChartKind::Bars,
        &config(),
        &mut PipelineCache::default(),
    )
    .unwrap();
    assert_eq!(view.raw.len(), 4);

    let err = Upload::from_path(&dir.join("nope.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("nope.csv"));

    std::fs::remove_dir_all(&dir).ok();
}

// =============================================================================
// Full pipeline
// =============================================================================

#[test]
fn filters_flow_into_distributions_and_chart() {
    let mut cache = PipelineCache::new(4);
    let upload = bank_upload();
    let first = compute_view_state(Some(&upload), None, ChartKind::Bars, &config(), &mut cache).unwrap();
    assert_eq!(first.raw_distribution.percentage(&"yes".into()), Some(50.0));

    let mut spec = first.spec.clone();
    *spec.selection_mut("job").unwrap() = CategorySelection::only([CellValue::from("admin.")]);
    let view = compute_view_state(Some(&upload), Some(&spec), ChartKind::Pie, &config(), &mut cache).unwrap();

    assert_eq!(view.filtered.len(), 2);
    assert_eq!(view.filtered_distribution.percentage(&"yes".into()), Some(50.0));
    let chart = view.chart.as_ref().unwrap();
    assert_eq!(chart.kind, ChartKind::Pie);
    assert_eq!(chart.panels[1].slices.len(), 2);
}

#[test]
fn empty_result_has_no_chart_but_exports_header() {
    let mut cache = PipelineCache::default();
    let upload = bank_upload();
    let mut spec = compute_view_state(Some(&upload), None, ChartKind::Bars, &config(), &mut cache)
        .unwrap()
        .spec;
    spec.range.as_mut().unwrap().low = 90.0;
    spec.range.as_mut().unwrap().high = 95.0;

    let view = compute_view_state(Some(&upload), Some(&spec), ChartKind::Bars, &config(), &mut cache).unwrap();
    assert!(view.is_empty_result());
    assert!(view.chart.is_none());
    assert!(view.filtered_distribution.is_empty());

    let blob = export_filtered(&view, ExportFormat::Csv, &mut cache).unwrap();
    let text = String::from_utf8(blob.bytes.clone()).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("age,job,marital"));
}

#[test]
fn memoized_and_uncached_views_agree() {
    let upload = bank_upload();
    let mut cached = PipelineCache::new(8);
    let mut uncached = PipelineCache::disabled();

    let mut spec = None;
    for _ in 0..3 {
        let a = compute_view_state(Some(&upload), spec.as_ref(), ChartKind::Bars, &config(), &mut cached).unwrap();
        let b = compute_view_state(Some(&upload), spec.as_ref(), ChartKind::Bars, &config(), &mut uncached).unwrap();

        assert_eq!(a.raw, b.raw);
        assert_eq!(a.filtered, b.filtered);
        assert_eq!(a.raw_summary, b.raw_summary);
        assert_eq!(a.filtered_distribution, b.filtered_distribution);
        assert_eq!(a.spec, b.spec);

        let mut next = a.spec.clone();
        next.selection_mut("marital").unwrap().all = false;
        next.selection_mut("marital").unwrap().toggle(&"married".into());
        spec = Some(next);
    }

    let (hits, _) = cached.stats();
    assert!(hits > 0);
    assert_eq!(uncached.stats().0, 0);
}
