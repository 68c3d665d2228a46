//! Age in years from the raw day count.

use crate::config::DAYS_PER_YEAR;
use crate::stage::Stage;
use lendprep_data::schema::{application::DAYS_BIRTH, derived::AGE_YEARS};
use lendprep_data::{PrepError, Result};
use polars::prelude::*;

/// Adds `AGE_YEARS = -DAYS_BIRTH / days_per_year` and drops `DAYS_BIRTH`.
#[derive(Debug, Clone, Copy)]
pub struct Age {
    days_per_year: f64,
}

impl Age {
    /// Create the stage with a custom year length.
    pub const fn new(days_per_year: f64) -> Self {
        Self { days_per_year }
    }
}

impl Default for Age {
    fn default() -> Self {
        Self::new(DAYS_PER_YEAR)
    }
}

impl Stage for Age {
    fn name(&self) -> &str {
        "age"
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![DAYS_BIRTH]
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        let days = df.column(DAYS_BIRTH)?.cast(&DataType::Float64)?;
        if let Some(latest) = days.f64()?.max()
            && latest > 0.0
        {
            return Err(PrepError::data_quality(
                DAYS_BIRTH,
                format!("birth offsets must be non-positive, found {latest}"),
            ));
        }

        let out = df
            .lazy()
            .with_column(
                ((lit(0.0) - col(DAYS_BIRTH).cast(DataType::Float64)) / lit(self.days_per_year))
                    .alias(AGE_YEARS),
            )
            .collect()?
            .drop(DAYS_BIRTH)?;
        Ok(out)
    }
}
