//! Writing datasets, reports and profiles to CSV and JSON.

use polars::prelude::*;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame writer error.
    #[error("Frame writer error: {0}")]
    Polars(#[from] PolarsError),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Guess the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
            Self::PrettyJson => f.write_str("pretty-json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        create_parent(path)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Serialize records with a header row.
pub(crate) fn records_to_csv<T: serde::Serialize>(
    records: impl IntoIterator<Item = T>,
) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    utf8(bytes)
}

fn utf8(bytes: Vec<u8>) -> Result<String, ExportError> {
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn create_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_frame<W: Write>(
    df: &DataFrame,
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    let mut df = df.clone();
    match format {
        ExportFormat::Csv => CsvWriter::new(writer)
            .include_header(true)
            .finish(&mut df)?,
        ExportFormat::Json => JsonWriter::new(writer)
            .with_json_format(JsonFormat::Json)
            .finish(&mut df)?,
        ExportFormat::PrettyJson => {
            let mut compact = Vec::new();
            JsonWriter::new(&mut compact)
                .with_json_format(JsonFormat::Json)
                .finish(&mut df)?;
            let value: serde_json::Value = serde_json::from_slice(&compact)?;
            serde_json::to_writer_pretty(writer, &value)?;
        }
    }
    Ok(())
}

/// Render a table as CSV (with header) or as a JSON array of records.
pub fn dataset_to_string(df: &DataFrame, format: ExportFormat) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_frame(df, format, &mut buffer)?;
    utf8(buffer)
}

/// Write a table to `path`, creating parent directories as needed.
pub fn save_dataset(df: &DataFrame, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
    create_parent(path)?;
    let file = File::create(path)?;
    write_frame(df, format, file)?;
    info!(
        path = %path.display(),
        %format,
        rows = df.height(),
        cols = df.width(),
        "saved dataset"
    );
    Ok(())
}
