//! Integration tests for dataset, report and profile files.

use lendprep_data::LoadOptions;
use lendprep_data::loader::read_table;
use lendprep_output::{
    BuildReport, DatasetProfile, ExportFormat, Exporter, ReportBuilder, TargetBalance,
    save_dataset,
};
use polars::prelude::*;
use std::fs;
use std::path::PathBuf;

fn dataset() -> DataFrame {
    DataFrame::new(vec![
        Column::new("ID".into(), [100i64, 200, 300]),
        Column::new("Gender".into(), [1i32, 0, 0]),
        Column::new("Age".into(), [32.85, 39.97, 54.76]),
        Column::new("Occupation_type".into(), ["Laborers", "Other", "Managers"]),
        Column::new("Target".into(), [1i32, 0, 0]),
    ])
    .unwrap()
}

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join("lendprep_output_it").join(name)
}

#[test]
fn test_csv_save_reads_back() {
    let path = scratch("dataset.csv");
    save_dataset(&dataset(), &path, ExportFormat::Csv).unwrap();

    let back = read_table(&path, &LoadOptions::default()).unwrap();
    assert_eq!(back.shape(), (3, 5));
    assert_eq!(
        back.get_column_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>(),
        vec!["ID", "Gender", "Age", "Occupation_type", "Target"]
    );
    assert_eq!(back.column("ID").unwrap().i64().unwrap().get(2), Some(300));

    fs::remove_file(&path).ok();
}

#[test]
fn test_json_save_is_record_array() {
    let path = scratch("dataset.json");
    save_dataset(&dataset(), &path, ExportFormat::Json).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1]["ID"], 200);
    assert_eq!(records[1]["Occupation_type"], "Other");

    fs::remove_file(&path).ok();
}

#[test]
fn test_report_file_round_trip() {
    let df = dataset();
    let report = ReportBuilder::new()
        .inputs("application_record.csv", "credit_record.csv")
        .stage("encode", &df)
        .target_balance(TargetBalance::from_column(&df, "Target").unwrap())
        .build();

    let path = scratch("report.json");
    report.export_to_file(&path, ExportFormat::PrettyJson).unwrap();

    let parsed: BuildReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.stages, report.stages);
    assert_eq!(parsed.target_balance, report.target_balance);

    fs::remove_file(&path).ok();
}

#[test]
fn test_profile_of_saved_dataset() {
    let profile = DatasetProfile::from_frame(&dataset(), Some("Target")).unwrap();
    assert_eq!(profile.correlation.columns, vec!["ID", "Gender", "Age", "Target"]);

    let path = scratch("profile.csv");
    profile.export_to_file(&path, ExportFormat::Csv).unwrap();
    let csv = fs::read_to_string(&path).unwrap();
    assert!(csv.lines().any(|l| l.starts_with("Occupation_type,str,0,,")));

    fs::remove_file(&path).ok();
}
