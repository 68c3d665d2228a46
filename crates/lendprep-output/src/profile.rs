//! Column-level profile of a dataset.
//!
//! Types and null counts for every column, summary statistics for numeric
//! columns, target class counts and the Pearson correlation matrix.

use crate::export::{ExportError, ExportFormat, Exporter, records_to_csv};
use crate::report::TargetBalance;
use lendprep_data::schema::is_numeric;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Summary statistics of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    /// Non-missing values.
    pub count: usize,
    /// Mean.
    pub mean: f64,
    /// Sample standard deviation (n - 1), 0 for a single value.
    pub std: f64,
    /// Minimum.
    pub min: f64,
    /// Maximum.
    pub max: f64,
}

impl NumericStats {
    /// Statistics over `values`, `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let array = Array1::from(values.to_vec());
        let std = if values.len() > 1 { array.std(1.0) } else { 0.0 };
        Some(Self {
            count: values.len(),
            mean: array.mean()?,
            std,
            min: array.fold(f64::INFINITY, |a, &b| a.min(b)),
            max: array.fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        })
    }
}

/// Profile of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name.
    pub name: String,
    /// Data type.
    pub dtype: String,
    /// Missing cells.
    pub null_count: usize,
    /// Statistics, numeric columns only.
    pub stats: Option<NumericStats>,
}

/// Pearson correlation between numeric columns.
///
/// Each pair uses the rows where both values are present. Pairs with fewer
/// than two such rows or a constant side have no coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Column names, in matrix order.
    pub columns: Vec<String>,
    /// Row-major coefficients.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Pearson coefficient over the positions where both inputs are finite.
pub fn pearson(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip();
    if xs.len() < 2 {
        return None;
    }

    let xs = Array1::from(xs);
    let ys = Array1::from(ys);
    let dx = &xs - xs.mean()?;
    let dy = &ys - ys.mean()?;
    let denom = (dx.dot(&dx) * dy.dot(&dy)).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(dx.dot(&dy) / denom)
}

fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>, ExportError> {
    let values = column.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Profile of a whole table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub columns: usize,
    /// Per-column profiles, in table order.
    pub column_profiles: Vec<ColumnProfile>,
    /// Target class counts, if a target column was named and present.
    pub target_balance: Option<TargetBalance>,
    /// Correlation of the numeric columns.
    pub correlation: CorrelationMatrix,
}

impl DatasetProfile {
    /// Profile `df`, counting classes of `target` when given.
    pub fn from_frame(df: &DataFrame, target: Option<&str>) -> Result<Self, ExportError> {
        let mut column_profiles = Vec::with_capacity(df.width());
        let mut numeric_names = Vec::new();
        let mut numeric_columns = Vec::new();

        for column in df.get_columns() {
            let stats = if is_numeric(column.dtype()) {
                let values = numeric_values(column)?;
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                numeric_names.push(column.name().to_string());
                numeric_columns.push(values);
                NumericStats::from_values(&present)
            } else {
                None
            };
            column_profiles.push(ColumnProfile {
                name: column.name().to_string(),
                dtype: column.dtype().to_string(),
                null_count: column.null_count(),
                stats,
            });
        }

        let target_balance = match target {
            Some(name) => TargetBalance::from_column(df, name)?,
            None => None,
        };

        Ok(Self {
            rows: df.height(),
            columns: df.width(),
            column_profiles,
            target_balance,
            correlation: correlation_matrix(numeric_names, &numeric_columns, df.height()),
        })
    }

    /// Profile of one column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|c| c.name == name)
    }

    /// Render the profile as plain text.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "\nDataset Profile: {} rows x {} columns",
            self.rows, self.columns
        );
        output.push_str(&"=".repeat(96));
        output.push('\n');
        let _ = writeln!(
            output,
            "{:<20} {:<8} {:>6} {:>8} {:>12} {:>12} {:>12} {:>12}",
            "column", "dtype", "nulls", "count", "mean", "std", "min", "max"
        );
        output.push_str(&"-".repeat(96));
        output.push('\n');

        for column in &self.column_profiles {
            let _ = write!(
                output,
                "{:<20} {:<8} {:>6}",
                column.name, column.dtype, column.null_count
            );
            if let Some(s) = &column.stats {
                let _ = write!(
                    output,
                    " {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                    s.count, s.mean, s.std, s.min, s.max
                );
            }
            output.push('\n');
        }

        if let Some(balance) = &self.target_balance {
            let _ = writeln!(
                output,
                "\nTarget: {} low risk, {} high risk ({:.2}% high risk)",
                balance.low_risk,
                balance.high_risk,
                balance.high_risk_share() * 100.0
            );
        }

        if !self.correlation.columns.is_empty() {
            output.push_str("\nCorrelation:\n");
            let _ = write!(output, "{:<20}", "");
            for name in &self.correlation.columns {
                let _ = write!(output, " {:>8.8}", name);
            }
            output.push('\n');
            for (name, row) in self.correlation.columns.iter().zip(&self.correlation.values) {
                let _ = write!(output, "{name:<20}");
                for value in row {
                    match value {
                        Some(r) => {
                            let _ = write!(output, " {r:>8.3}");
                        }
                        None => {
                            let _ = write!(output, " {:>8}", "-");
                        }
                    }
                }
                output.push('\n');
            }
        }

        output
    }
}

fn correlation_matrix(
    columns: Vec<String>,
    values: &[Vec<Option<f64>>],
    rows: usize,
) -> CorrelationMatrix {
    let k = columns.len();
    let mut data = Array2::<f64>::from_elem((rows, k), f64::NAN);
    for (j, column) in values.iter().enumerate() {
        for (i, value) in column.iter().enumerate() {
            if let Some(v) = value {
                data[[i, j]] = *v;
            }
        }
    }

    let mut matrix = vec![vec![None; k]; k];
    for a in 0..k {
        for b in a..k {
            let r = pearson(data.index_axis(Axis(1), a), data.index_axis(Axis(1), b));
            matrix[a][b] = r;
            matrix[b][a] = r;
        }
    }

    CorrelationMatrix {
        columns,
        values: matrix,
    }
}

/// Flattened column profile for CSV export.
#[derive(Debug, Serialize)]
struct ColumnProfileFlat<'a> {
    column: &'a str,
    dtype: &'a str,
    null_count: usize,
    count: Option<usize>,
    mean: Option<f64>,
    std: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

impl<'a> From<&'a ColumnProfile> for ColumnProfileFlat<'a> {
    fn from(profile: &'a ColumnProfile) -> Self {
        Self {
            column: &profile.name,
            dtype: &profile.dtype,
            null_count: profile.null_count,
            count: profile.stats.map(|s| s.count),
            mean: profile.stats.map(|s| s.mean),
            std: profile.stats.map(|s| s.std),
            min: profile.stats.map(|s| s.min),
            max: profile.stats.map(|s| s.max),
        }
    }
}

impl Exporter for DatasetProfile {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                records_to_csv(self.column_profiles.iter().map(ColumnProfileFlat::from))
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
