//! Cleaning of the merged application/credit table.
//!
//! Three steps, in order:
//! 1. fill missing values (numeric: mean, text: mode or a configured constant)
//! 2. remove exact duplicate rows, keeping the first
//! 3. drop constant indicator columns such as `FLAG_MOBIL`
//!
//! Every fill value is computed from the table as handed in, before any cell
//! is written.

pub mod impute;

pub use impute::{FillStrategy, FillValue, Imputation, column_mean, column_mode};

use crate::config::PipelineConfig;
use crate::stage::Stage;
use lendprep_data::schema::{ID, application, has_column, is_numeric};
use lendprep_data::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Configuration for the cleaning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Text columns filled with a fixed value instead of their mode
    /// (default: `OCCUPATION_TYPE` -> `"Other"`)
    pub fill_overrides: BTreeMap<String, String>,
    /// Columns dropped unconditionally (default: `FLAG_MOBIL`)
    pub constant_columns: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            fill_overrides: BTreeMap::from([(
                application::OCCUPATION_TYPE.to_string(),
                "Other".to_string(),
            )]),
            constant_columns: vec![application::FLAG_MOBIL.to_string()],
        }
    }
}

/// Cleaned table plus what was done to it.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    /// The cleaned table
    pub frame: DataFrame,
    /// One entry per column that had missing values
    pub imputations: Vec<Imputation>,
    /// Exact duplicate rows removed
    pub duplicates_removed: usize,
    /// Constant columns that were present and dropped
    pub dropped_columns: Vec<String>,
}

/// Imputation, deduplication and constant-column removal.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleanConfig,
}

impl Cleaner {
    /// Create a cleaner with the given configuration.
    pub const fn with_config(config: CleanConfig) -> Self {
        Self { config }
    }

    /// Build the cleaner described by a pipeline configuration.
    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        Self::with_config(config.clean.clone())
    }

    /// Access the configuration.
    pub const fn config(&self) -> &CleanConfig {
        &self.config
    }

    /// Decide the fill for every column that has missing values.
    ///
    /// The key column is never imputed.
    pub fn plan_imputations(&self, df: &DataFrame) -> Result<Vec<Imputation>> {
        let mut plan = Vec::new();

        for column in df.get_columns() {
            let name = column.name().as_str();
            let missing = column.null_count();
            if name == ID || missing == 0 {
                continue;
            }

            let (strategy, value) = if let Some(constant) = self.config.fill_overrides.get(name) {
                if is_numeric(column.dtype()) {
                    return Err(PrepError::Config(format!(
                        "fill override for numeric column '{name}'"
                    )));
                }
                (FillStrategy::Constant, FillValue::Text(constant.clone()))
            } else if is_numeric(column.dtype()) {
                let mean = column_mean(column).ok_or_else(|| {
                    PrepError::data_quality(name, "column is entirely missing; mean is undefined")
                })?;
                (FillStrategy::Mean, FillValue::Number(mean))
            } else if column.dtype() == &DataType::String {
                let mode = column_mode(column.str()?).ok_or_else(|| {
                    PrepError::data_quality(name, "column is entirely missing; mode is undefined")
                })?;
                (FillStrategy::Mode, FillValue::Text(mode))
            } else {
                return Err(PrepError::data_quality(
                    name,
                    format!("cannot impute values of type {}", column.dtype()),
                ));
            };

            debug!(column = name, %strategy, %value, missing, "planned imputation");
            plan.push(Imputation {
                column: name.to_string(),
                strategy,
                value,
                filled: missing,
            });
        }

        Ok(plan)
    }

    /// Run all three cleaning steps.
    pub fn clean(&self, df: DataFrame) -> Result<CleanOutcome> {
        let imputations = self.plan_imputations(&df)?;

        let fills: Vec<Expr> = imputations
            .iter()
            .map(|imp| {
                let target = match imp.value {
                    FillValue::Number(_) => DataType::Float64,
                    FillValue::Text(_) => DataType::String,
                };
                col(imp.column.as_str())
                    .cast(target)
                    .fill_null(imp.value.to_lit())
            })
            .collect();

        let rows_before = df.height();
        let filled = if fills.is_empty() {
            df
        } else {
            df.lazy().with_columns(fills).collect()?
        };

        let mut frame = filled
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        let duplicates_removed = rows_before - frame.height();

        let mut dropped_columns = Vec::new();
        for name in &self.config.constant_columns {
            if has_column(&frame, name) {
                frame = frame.drop(name)?;
                dropped_columns.push(name.clone());
            }
        }

        info!(
            imputed_columns = imputations.len(),
            duplicates_removed,
            dropped = dropped_columns.len(),
            rows = frame.height(),
            "cleaned merged table"
        );

        Ok(CleanOutcome {
            frame,
            imputations,
            duplicates_removed,
            dropped_columns,
        })
    }
}

impl Stage for Cleaner {
    fn name(&self) -> &str {
        "clean"
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![ID]
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        Ok(self.clean(df)?.frame)
    }
}

/// Clean `df` with the default configuration.
pub fn clean(df: DataFrame) -> Result<CleanOutcome> {
    let cleaner = Cleaner::default();
    cleaner.check_schema(&df)?;
    cleaner.clean(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lendprep_data::ErrorKind;

    fn merged() -> DataFrame {
        DataFrame::new(vec![
            Column::new(ID.into(), [1i64, 1, 2, 3, 3]),
            Column::new(
                "AMT_INCOME_TOTAL".into(),
                [Some(100.0), Some(100.0), None, Some(400.0), Some(400.0)],
            ),
            Column::new(
                "MONTHS_BALANCE".into(),
                [Some(0i64), Some(0), None, Some(-2), Some(-1)],
            ),
            Column::new(
                "NAME_HOUSING_TYPE".into(),
                [
                    Some("Rented"),
                    Some("Rented"),
                    Some("House"),
                    None,
                    Some("House"),
                ],
            ),
            Column::new(
                "OCCUPATION_TYPE".into(),
                [Some("Drivers"), Some("Drivers"), None, Some("Drivers"), None],
            ),
            Column::new("FLAG_MOBIL".into(), [1i64, 1, 1, 1, 1]),
        ])
        .unwrap()
    }

    #[test]
    fn test_numeric_fill_uses_pre_fill_mean() {
        let outcome = clean(merged()).unwrap();
        let income = outcome
            .imputations
            .iter()
            .find(|i| i.column == "AMT_INCOME_TOTAL")
            .unwrap();
        assert_eq!(income.strategy, FillStrategy::Mean);
        assert_eq!(income.filled, 1);
        // mean of 100, 100, 400, 400
        assert_eq!(income.value, FillValue::Number(250.0));

        let column = outcome.frame.column("AMT_INCOME_TOTAL").unwrap();
        assert_eq!(column.null_count(), 0);
    }

    #[test]
    fn test_integer_column_with_gaps_becomes_float() {
        let outcome = clean(merged()).unwrap();
        let months = outcome.frame.column("MONTHS_BALANCE").unwrap();
        assert_eq!(months.dtype(), &DataType::Float64);
        let filled: Vec<f64> = months.f64().unwrap().into_no_null_iter().collect();
        // -3 / 4 for the row of ID 2
        assert!(filled.iter().any(|v| (*v + 0.75).abs() < 1e-12));
    }

    #[test]
    fn test_text_fill_uses_mode_and_override() {
        let outcome = clean(merged()).unwrap();

        let housing = outcome
            .imputations
            .iter()
            .find(|i| i.column == "NAME_HOUSING_TYPE")
            .unwrap();
        // Rented x2 and House x2: Rented appears first
        assert_eq!(housing.strategy, FillStrategy::Mode);
        assert_eq!(housing.value, FillValue::Text("Rented".to_string()));

        let occupation = outcome
            .imputations
            .iter()
            .find(|i| i.column == "OCCUPATION_TYPE")
            .unwrap();
        assert_eq!(occupation.strategy, FillStrategy::Constant);
        assert_eq!(occupation.value, FillValue::Text("Other".to_string()));
        assert_eq!(occupation.filled, 2);
    }

    #[test]
    fn test_duplicates_removed_and_constant_dropped() {
        let outcome = clean(merged()).unwrap();
        // the two ID 1 rows are identical
        assert_eq!(outcome.duplicates_removed, 1);
        assert_eq!(outcome.frame.height(), 4);
        assert!(!has_column(&outcome.frame, "FLAG_MOBIL"));
        assert_eq!(outcome.dropped_columns, vec!["FLAG_MOBIL".to_string()]);
    }

    #[test]
    fn test_no_missing_values_remain() {
        let outcome = clean(merged()).unwrap();
        for column in outcome.frame.get_columns() {
            assert_eq!(column.null_count(), 0, "column {}", column.name());
        }
    }

    #[test]
    fn test_all_missing_numeric_column_is_data_quality_error() {
        let df = DataFrame::new(vec![
            Column::new(ID.into(), [1i64, 2]),
            Column::new("CNT_CHILDREN".into(), [None::<i64>, None]),
        ])
        .unwrap();
        let err = clean(df).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataQuality);
        assert!(err.to_string().contains("CNT_CHILDREN"));
    }

    #[test]
    fn test_mean_fill_preserves_column_mean() {
        let outcome = clean(merged()).unwrap();
        let income = outcome.frame.column("AMT_INCOME_TOTAL").unwrap();
        let values: Vec<f64> = income.f64().unwrap().into_no_null_iter().collect();
        // after dedup: 100, 250 (filled), 400, 400
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert_relative_eq!(mean, 287.5);
        assert!(values.contains(&250.0));
    }

    #[test]
    fn test_key_is_never_imputed() {
        let cleaner = Cleaner::default();
        let plan = cleaner.plan_imputations(&merged()).unwrap();
        assert!(plan.iter().all(|i| i.column != ID));
    }

    #[test]
    fn test_missing_constant_column_is_ignored() {
        let df = merged().drop("FLAG_MOBIL").unwrap();
        let outcome = clean(df).unwrap();
        assert!(outcome.dropped_columns.is_empty());
    }
}
