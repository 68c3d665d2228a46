//! End-to-end builds from CSV files.

use approx::assert_relative_eq;
use lendprep::data::ErrorKind;
use lendprep::output::ExportFormat;
use lendprep::{DatasetBuilder, PipelineConfig};
use polars::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};

const APPLICATIONS: &str = "\
ID,CODE_GENDER,FLAG_OWN_CAR,FLAG_OWN_REALTY,CNT_CHILDREN,AMT_INCOME_TOTAL,NAME_INCOME_TYPE,NAME_EDUCATION_TYPE,NAME_FAMILY_STATUS,NAME_HOUSING_TYPE,DAYS_BIRTH,DAYS_EMPLOYED,FLAG_MOBIL,FLAG_WORK_PHONE,FLAG_PHONE,FLAG_EMAIL,OCCUPATION_TYPE,CNT_FAM_MEMBERS
100,M,Y,Y,0,427500.0,Working,Higher education,Civil marriage,Rented apartment,-12005,-4542,1,1,0,0,,2.0
200,F,N,Y,0,112500.0,Pensioner,Secondary / secondary special,Married,House / apartment,-14600,365243,1,0,0,0,,2.0
300,F,N,N,1,270000.0,Commercial associate,Secondary / secondary special,Single / not married,House / apartment,-19110,-3051,1,0,1,1,Sales staff,2.0
400,M,Y,N,2,,Working,Higher education,Married,House / apartment,-15000,-200,1,0,0,0,Managers,4.0
400,M,Y,N,2,,Working,Higher education,Married,House / apartment,-15000,-200,1,0,0,0,Managers,4.0
";

const CREDIT: &str = "\
ID,MONTHS_BALANCE,STATUS
100,-5,C
100,-4,C
100,-3,1
100,-2,C
100,-1,X
100,0,C
200,0,X
200,-1,0
300,0,0
300,-1,0
300,-2,0
500,0,5
";

struct Fixture {
    dir: PathBuf,
    applications: PathBuf,
    credit: PathBuf,
}

impl Fixture {
    fn new(name: &str, applications: &str, credit: &str) -> Self {
        let dir = std::env::temp_dir().join("lendprep_pipeline_it").join(name);
        fs::create_dir_all(&dir).unwrap();
        let fixture = Self {
            applications: dir.join("application_record.csv"),
            credit: dir.join("credit_record.csv"),
            dir,
        };
        fs::write(&fixture.applications, applications).unwrap();
        fs::write(&fixture.credit, credit).unwrap();
        fixture
    }

    fn build(&self) -> lendprep::Result<lendprep::BuiltDataset> {
        DatasetBuilder::new().build(&self.applications, &self.credit)
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.dir).ok();
    }
}

fn row_of(df: &DataFrame, id: i64) -> usize {
    df.column("ID")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .position(|v| v == Some(id))
        .unwrap()
}

fn i32_at(df: &DataFrame, name: &str, row: usize) -> Option<i32> {
    df.column(name).unwrap().i32().unwrap().get(row)
}

#[test]
fn test_output_rows_are_applicants_in_both_tables() {
    let fixture = Fixture::new("rows", APPLICATIONS, CREDIT);
    let built = fixture.build().unwrap();

    // 400 has no history and 500 has no application
    let ids: Vec<i64> = built
        .frame
        .column("ID")
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(ids, vec![100, 200, 300]);
}

#[test]
fn test_account_length_and_target() {
    let fixture = Fixture::new("known", APPLICATIONS, CREDIT);
    let df = fixture.build().unwrap().frame;

    let a = row_of(&df, 100);
    assert_eq!(df.column("Account_length").unwrap().i64().unwrap().get(a), Some(5));
    assert_eq!(i32_at(&df, "Target", a), Some(1));

    let c = row_of(&df, 300);
    assert_eq!(df.column("Account_length").unwrap().i64().unwrap().get(c), Some(2));
    assert_eq!(i32_at(&df, "Target", c), Some(0));
}

#[test]
fn test_age_and_employment_sentinel() {
    let fixture = Fixture::new("sentinel", APPLICATIONS, CREDIT);
    let df = fixture.build().unwrap().frame;

    let b = row_of(&df, 200);
    let age = df.column("Age").unwrap().f64().unwrap().get(b).unwrap();
    assert_relative_eq!(age, 39.97, epsilon = 1e-2);
    assert_eq!(i32_at(&df, "Unemployed", b), Some(1));
    assert_eq!(df.column("Years_employed").unwrap().f64().unwrap().get(b), Some(0.0));
    assert_eq!(i32_at(&df, "Target", b), Some(0));

    for column in ["Age", "Years_employed"] {
        let min = df.column(column).unwrap().f64().unwrap().min().unwrap();
        assert!(min >= 0.0, "{column} has negative values");
    }
}

#[test]
fn test_cleaning_visible_in_output_and_report() {
    let fixture = Fixture::new("clean", APPLICATIONS, CREDIT);
    let built = fixture.build().unwrap();
    let df = &built.frame;

    assert!(df.column("FLAG_MOBIL").is_err());
    assert_eq!(
        df.column("Occupation_type").unwrap().str().unwrap().get(row_of(df, 100)),
        Some("Other")
    );
    assert_eq!(i32_at(df, "Gender", row_of(df, 100)), Some(1));
    for column in df.get_columns() {
        assert_eq!(column.null_count(), 0, "{} has nulls", column.name());
    }

    let report = &built.report;
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.missing_after_join.get("AMT_INCOME_TOTAL"), Some(&2));
    assert_eq!(report.missing_after_join.get("STATUS"), Some(&2));
    let imputed = |column: &str, strategy: &str| {
        report
            .imputations
            .iter()
            .any(|i| i.column == column && i.strategy == strategy)
    };
    assert!(imputed("OCCUPATION_TYPE", "constant"));
    assert!(imputed("AMT_INCOME_TOTAL", "mean"));
    assert_eq!(report.applications.as_deref(), fixture.applications.to_str());
}

#[test]
fn test_build_is_deterministic() {
    let fixture = Fixture::new("repeat", APPLICATIONS, CREDIT);
    let first = fixture.build().unwrap().frame;
    let second = fixture.build().unwrap().frame;
    assert!(first.equals(&second));
}

#[test]
fn test_build_from_frames_matches_files() {
    let fixture = Fixture::new("frames", APPLICATIONS, CREDIT);
    let builder = DatasetBuilder::new();
    let sources = builder.load(&fixture.applications, &fixture.credit).unwrap();
    assert_eq!(sources.application_rows, 5);

    let from_files = fixture.build().unwrap().frame;
    let apps = lendprep::data::loader::read_applications(
        &fixture.applications,
        &builder.config().load,
    )
    .unwrap();
    let credit =
        lendprep::data::loader::read_credit_history(&fixture.credit, &builder.config().load)
            .unwrap();
    let from_frames = builder.build_from_frames(apps, credit).unwrap().frame;
    assert!(from_files.equals(&from_frames));
}

#[test]
fn test_save_and_reload() {
    let fixture = Fixture::new("save", APPLICATIONS, CREDIT);
    let built = fixture.build().unwrap();

    let csv_path = fixture.dir.join("out").join("dataset.csv");
    built.save(&csv_path, ExportFormat::Csv).unwrap();
    let header = fs::read_to_string(&csv_path).unwrap();
    assert!(header.lines().next().unwrap().contains("Account_length"));
    assert_eq!(header.lines().count(), 4);

    let json_path = fixture.dir.join("out").join("dataset.json");
    built.save(&json_path, ExportFormat::Json).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 3);
}

#[rstest]
#[case::unknown_gender("100,U,", ErrorKind::Encoding)]
#[case::unreadable_status("", ErrorKind::Parse)]
fn test_bad_values_fail_the_build(#[case] gender_row_prefix: &str, #[case] kind: ErrorKind) {
    let (applications, credit) = if gender_row_prefix.is_empty() {
        (APPLICATIONS.to_string(), CREDIT.replace("300,-2,0", "300,-2,Q"))
    } else {
        (APPLICATIONS.replace("100,M,", gender_row_prefix), CREDIT.to_string())
    };
    let fixture = Fixture::new(&format!("bad_{kind:?}"), &applications, &credit);
    let err = fixture.build().unwrap_err();
    assert_eq!(err.kind(), kind);
}

#[test]
fn test_missing_file_is_ingestion_error() {
    let err = DatasetBuilder::new()
        .build(Path::new("/nonexistent/apps.csv"), Path::new("/nonexistent/credit.csv"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Ingestion);
}

#[test]
fn test_positive_month_offset_is_data_quality_error() {
    let fixture = Fixture::new("future", APPLICATIONS, &CREDIT.replace("300,0,0", "300,2,0"));
    assert_eq!(fixture.build().unwrap_err().kind(), ErrorKind::DataQuality);
}

#[test]
fn test_letter_statuses_after_long_numeric_history() {
    let mut credit = String::from("ID,MONTHS_BALANCE,STATUS\n");
    for _ in 0..10_001 {
        credit.push_str("300,0,0\n");
    }
    credit.push_str("100,0,X\n100,-1,1\n200,0,C\n");

    let fixture = Fixture::new("long_history", APPLICATIONS, &credit);
    let df = fixture.build().unwrap().frame;
    assert_eq!(i32_at(&df, "Target", row_of(&df, 100)), Some(1));
    assert_eq!(i32_at(&df, "Target", row_of(&df, 200)), Some(0));
    assert_eq!(i32_at(&df, "Target", row_of(&df, 300)), Some(0));
}

#[test]
fn test_custom_renames_from_config() {
    let config = PipelineConfig::from_json_str(
        r#"{"renames": [{"from": "TARGET", "to": "label"}, {"from": "AGE_YEARS", "to": "age"}]}"#,
    )
    .unwrap();
    let fixture = Fixture::new("config", APPLICATIONS, CREDIT);
    let built = DatasetBuilder::with_config(config)
        .unwrap()
        .build(&fixture.applications, &fixture.credit)
        .unwrap();
    assert!(built.frame.column("label").is_ok());
    assert!(built.frame.column("age").is_ok());
    assert!(built.frame.column("ACCOUNT_LENGTH").is_ok());
    assert_eq!(built.target_column(), "label");
    assert!(built.report.target_balance.is_some());
}
