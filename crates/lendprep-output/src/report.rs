//! Record of one pipeline run.

use crate::export::{ExportError, ExportFormat, Exporter, records_to_csv};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Table shape after one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageShape {
    /// Stage name.
    pub stage: String,

    /// Rows after the stage.
    pub rows: usize,

    /// Columns after the stage.
    pub columns: usize,
}

impl StageShape {
    /// Record the shape of `df` under `stage`.
    pub fn of(stage: &str, df: &DataFrame) -> Self {
        Self {
            stage: stage.to_string(),
            rows: df.height(),
            columns: df.width(),
        }
    }
}

/// One column filled during cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputedColumn {
    /// Column name.
    pub column: String,

    /// `mean`, `mode` or `constant`.
    pub strategy: String,

    /// Fill value as text.
    pub value: String,

    /// Cells that were filled.
    pub filled: usize,
}

/// Count of low- and high-risk applicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBalance {
    /// Applicants with target 0.
    pub low_risk: usize,

    /// Applicants with target 1.
    pub high_risk: usize,
}

impl TargetBalance {
    /// Count the classes of a 0/1 column.
    ///
    /// Returns `Ok(None)` when the column is absent. Values other than
    /// 0 and 1 are an error.
    pub fn from_column(df: &DataFrame, name: &str) -> Result<Option<Self>, ExportError> {
        let Some(index) = df.get_column_index(name) else {
            return Ok(None);
        };
        let values = df.get_columns()[index].cast(&DataType::Int64)?;

        let mut balance = Self {
            low_risk: 0,
            high_risk: 0,
        };
        for value in values.i64()? {
            match value {
                Some(0) => balance.low_risk += 1,
                Some(1) => balance.high_risk += 1,
                other => {
                    return Err(ExportError::InvalidFormat(format!(
                        "target column '{name}' holds {other:?}, expected 0 or 1"
                    )));
                }
            }
        }
        Ok(Some(balance))
    }

    /// Total applicants.
    pub const fn total(&self) -> usize {
        self.low_risk + self.high_risk
    }

    /// Share of high-risk applicants, 0 when empty.
    pub fn high_risk_share(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.high_risk as f64 / self.total() as f64
        }
    }
}

/// Missing cells per column, only for columns that have any.
pub fn missing_counts(df: &DataFrame) -> BTreeMap<String, usize> {
    df.get_columns()
        .iter()
        .filter(|c| c.null_count() > 0)
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}

/// Summary of a dataset build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Application table path, if built from files.
    pub applications: Option<String>,

    /// Credit history path, if built from files.
    pub credit: Option<String>,

    /// Shapes after each stage, in run order.
    pub stages: Vec<StageShape>,

    /// Missing cells per column right after the join.
    pub missing_after_join: BTreeMap<String, usize>,

    /// Exact duplicate rows removed during cleaning.
    pub duplicates_removed: usize,

    /// Constant columns dropped during cleaning.
    pub dropped_columns: Vec<String>,

    /// Columns filled during cleaning.
    pub imputations: Vec<ImputedColumn>,

    /// Class counts of the final target.
    pub target_balance: Option<TargetBalance>,
}

impl BuildReport {
    /// Shape of the last recorded stage.
    pub fn final_shape(&self) -> Option<&StageShape> {
        self.stages.last()
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the report as plain text.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "\nBuild Report ({})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
        if let (Some(apps), Some(credit)) = (&self.applications, &self.credit) {
            let _ = writeln!(output, "Inputs: {apps}, {credit}");
        }
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output.push_str("\nStages:\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for shape in &self.stages {
            let _ = writeln!(
                output,
                "  {:<24} {:>10} rows {:>4} cols",
                shape.stage, shape.rows, shape.columns
            );
        }

        if !self.missing_after_join.is_empty() {
            output.push_str("\nMissing after join:\n");
            for (column, count) in &self.missing_after_join {
                let _ = writeln!(output, "  {column:<24} {count:>10}");
            }
        }

        if !self.imputations.is_empty() {
            output.push_str("\nImputations:\n");
            for imp in &self.imputations {
                let _ = writeln!(
                    output,
                    "  {:<24} {:<9} {:<16} {:>8} filled",
                    imp.column, imp.strategy, imp.value, imp.filled
                );
            }
        }

        let _ = writeln!(output, "\nDuplicates removed: {}", self.duplicates_removed);
        if !self.dropped_columns.is_empty() {
            let _ = writeln!(output, "Dropped columns:    {}", self.dropped_columns.join(", "));
        }

        if let Some(balance) = &self.target_balance {
            let _ = writeln!(
                output,
                "Target balance:     {} low / {} high ({:.2}% high risk)",
                balance.low_risk,
                balance.high_risk,
                balance.high_risk_share() * 100.0
            );
        }

        output
    }
}

impl Exporter for BuildReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(&self.stages),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Builder for creating build reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    applications: Option<String>,
    credit: Option<String>,
    stages: Vec<StageShape>,
    missing_after_join: BTreeMap<String, usize>,
    duplicates_removed: usize,
    dropped_columns: Vec<String>,
    imputations: Vec<ImputedColumn>,
    target_balance: Option<TargetBalance>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input paths.
    pub fn inputs(mut self, applications: &str, credit: &str) -> Self {
        self.applications = Some(applications.to_string());
        self.credit = Some(credit.to_string());
        self
    }

    /// Record the shape of `df` after `stage`.
    pub fn stage(mut self, stage: &str, df: &DataFrame) -> Self {
        self.stages.push(StageShape::of(stage, df));
        self
    }

    /// Record missing cells of the joined table.
    pub fn missing_after_join(mut self, df: &DataFrame) -> Self {
        self.missing_after_join = missing_counts(df);
        self
    }

    /// Set the duplicate count.
    pub const fn duplicates_removed(mut self, count: usize) -> Self {
        self.duplicates_removed = count;
        self
    }

    /// Set the dropped constant columns.
    pub fn dropped_columns(mut self, columns: Vec<String>) -> Self {
        self.dropped_columns = columns;
        self
    }

    /// Add one imputed column.
    pub fn imputation(mut self, imputation: ImputedColumn) -> Self {
        self.imputations.push(imputation);
        self
    }

    /// Set the target class counts.
    pub const fn target_balance(mut self, balance: Option<TargetBalance>) -> Self {
        self.target_balance = balance;
        self
    }

    /// Build the report.
    pub fn build(self) -> BuildReport {
        BuildReport {
            timestamp: Utc::now(),
            applications: self.applications,
            credit: self.credit,
            stages: self.stages,
            missing_after_join: self.missing_after_join,
            duplicates_removed: self.duplicates_removed,
            dropped_columns: self.dropped_columns,
            imputations: self.imputations,
            target_balance: self.target_balance,
        }
    }
}
