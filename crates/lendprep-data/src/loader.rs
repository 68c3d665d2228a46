//! CSV ingestion and the application/credit left join.
//!
//! Both inputs are read in full with the polars CSV reader. The `ID` key is
//! validated and normalized to `Int64` so the two tables always join on the
//! same dtype. Known columns are parsed with fixed dtypes (`STATUS` as text,
//! income as float) whatever the first rows look like; only extra columns
//! go through inference.

use crate::error::{PrepError, Result};
use crate::schema::{self, ID, credit, is_integer};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const APP_ROW: &str = "__application_row";
const CREDIT_ROW: &str = "__credit_row";

/// Reader configuration shared by both inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Field separator byte (default: `,`)
    pub separator: u8,
    /// Rows scanned to infer columns without a fixed dtype, `None` scans the
    /// whole file (default: 10 000)
    pub infer_schema_rows: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            infer_schema_rows: Some(10_000),
        }
    }
}

/// The two tables every later stage reads from.
#[derive(Debug, Clone)]
pub struct SourceTables {
    /// Applications left-joined with their credit history, one row per (applicant, month).
    pub merged: DataFrame,
    /// Untouched credit history, one row per (applicant, month).
    pub credit: DataFrame,
    /// Row count of the application table before the join.
    pub application_rows: usize,
}

/// Read a delimited file with a header row.
pub fn read_table(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PrepError::ingestion(path, "file does not exist"));
    }

    let header = csv_options(options)
        .with_n_rows(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| PrepError::ingestion(path, e.to_string()))?;
    let pinned = Schema::from_iter(header.get_column_names().into_iter().filter_map(|name| {
        schema::source_dtype(name).map(|dtype| Field::new(name.clone(), dtype))
    }));

    let df = csv_options(options)
        .with_schema_overwrite(Some(Arc::new(pinned)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| PrepError::ingestion(path, e.to_string()))?;

    debug!(path = %path.display(), rows = df.height(), cols = df.width(), "read table");
    Ok(df)
}

fn csv_options(options: &LoadOptions) -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_rows)
        .with_parse_options(CsvParseOptions::default().with_separator(options.separator))
}

/// Read and validate `application_record`.
pub fn read_applications(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let df = read_table(path, options)?;
    normalize_applications(df, path)
}

/// Read and validate `credit_record`.
pub fn read_credit_history(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let df = read_table(path, options)?;
    normalize_credit(df, path)
}

/// Load both inputs from disk and join them.
pub fn load(
    applications_path: &Path,
    credit_path: &Path,
    options: &LoadOptions,
) -> Result<SourceTables> {
    let applications = read_applications(applications_path, options)?;
    let credit = read_credit_history(credit_path, options)?;
    left_join(applications, credit)
}

/// Join in-memory frames the same way [`load`] joins files.
///
/// The frames go through the same key validation; errors name the pseudo
/// paths `<applications>` and `<credit>`.
pub fn join_sources(applications: DataFrame, credit: DataFrame) -> Result<SourceTables> {
    let applications = normalize_applications(applications, Path::new("<applications>"))?;
    let credit = normalize_credit(credit, Path::new("<credit>"))?;
    left_join(applications, credit)
}

fn normalize_applications(df: DataFrame, origin: &Path) -> Result<DataFrame> {
    normalize_key(df, origin)
}

fn normalize_credit(df: DataFrame, origin: &Path) -> Result<DataFrame> {
    let df = normalize_key(df, origin)?;
    for name in [credit::MONTHS_BALANCE, credit::STATUS] {
        if !schema::has_column(&df, name) {
            return Err(PrepError::ingestion(
                origin,
                format!("missing required column '{name}'"),
            ));
        }
    }

    Ok(df
        .lazy()
        .with_column(col(credit::STATUS).cast(DataType::String))
        .collect()?)
}

fn normalize_key(df: DataFrame, origin: &Path) -> Result<DataFrame> {
    let key = df
        .column(ID)
        .map_err(|_| PrepError::ingestion(origin, format!("missing required column '{ID}'")))?;

    if !is_integer(key.dtype()) {
        return Err(PrepError::ingestion(
            origin,
            format!("column '{ID}' must hold integers, found {}", key.dtype()),
        ));
    }
    if key.null_count() > 0 {
        return Err(PrepError::ingestion(
            origin,
            format!("column '{ID}' has {} missing values", key.null_count()),
        ));
    }

    Ok(df.lazy().with_column(col(ID).cast(DataType::Int64)).collect()?)
}

fn left_join(applications: DataFrame, credit: DataFrame) -> Result<SourceTables> {
    let application_rows = applications.height();

    // Row indices pin the output to source order: application rows first,
    // then each applicant's months as they appear in the history.
    let merged = applications
        .clone()
        .lazy()
        .with_row_index(APP_ROW, None)
        .join(
            credit.clone().lazy().with_row_index(CREDIT_ROW, None),
            [col(ID)],
            [col(ID)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([APP_ROW, CREDIT_ROW], Default::default())
        .collect()?
        .drop(APP_ROW)?
        .drop(CREDIT_ROW)?;

    info!(
        applications = application_rows,
        credit_rows = credit.height(),
        merged_rows = merged.height(),
        "joined applications with credit history"
    );

    Ok(SourceTables {
        merged,
        credit,
        application_rows,
    })
}
