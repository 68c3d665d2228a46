//! Employment status and tenure.
//!
//! `DAYS_EMPLOYED` counts backwards from the application date, so a real
//! employment start is negative. Any non-negative value (the dataset uses
//! 365243) means there is no employment history. Both output columns are
//! driven by that single predicate so they cannot disagree.

use crate::config::DAYS_PER_YEAR;
use crate::stage::Stage;
use lendprep_data::Result;
use lendprep_data::schema::{
    application::DAYS_EMPLOYED,
    derived::{UNEMPLOYED, YEARS_EMPLOYED},
};
use polars::prelude::*;

/// Adds `UNEMPLOYED` and `YEARS_EMPLOYED`, drops `DAYS_EMPLOYED`.
#[derive(Debug, Clone, Copy)]
pub struct Employment {
    days_per_year: f64,
}

impl Employment {
    /// Create the stage with a custom year length.
    pub const fn new(days_per_year: f64) -> Self {
        Self { days_per_year }
    }
}

impl Default for Employment {
    fn default() -> Self {
        Self::new(DAYS_PER_YEAR)
    }
}

impl Stage for Employment {
    fn name(&self) -> &str {
        "employment"
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![DAYS_EMPLOYED]
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        let raw = col(DAYS_EMPLOYED).cast(DataType::Float64);
        let not_employed = raw.clone().gt_eq(lit(0.0));

        let out = df
            .lazy()
            .with_columns([
                when(not_employed.clone())
                    .then(lit(1i32))
                    .otherwise(lit(0i32))
                    .alias(UNEMPLOYED),
                when(not_employed)
                    .then(lit(0.0))
                    .otherwise((lit(0.0) - raw) / lit(self.days_per_year))
                    .alias(YEARS_EMPLOYED),
            ])
            .collect()?
            .drop(DAYS_EMPLOYED)?;
        Ok(out)
    }
}
