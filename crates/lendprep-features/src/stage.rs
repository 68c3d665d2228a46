//! The `Stage` trait shared by every transformation step.

use lendprep_data::Result;
use lendprep_data::schema::require_columns;
use polars::prelude::*;
use tracing::debug;

/// A single pipeline step: owned frame in, new frame out.
///
/// Implementors declare the columns they read so a malformed table fails
/// before any work is done, with an error that names the stage.
pub trait Stage {
    /// Stage name used in logs and errors.
    fn name(&self) -> &str;

    /// Columns the input table must contain.
    fn required_columns(&self) -> Vec<&str>;

    /// Transform the table. Callers should prefer [`Stage::run`].
    fn apply(&self, df: DataFrame) -> Result<DataFrame>;

    /// Fail with a missing-column error if the input lacks a required column.
    fn check_schema(&self, df: &DataFrame) -> Result<()> {
        require_columns(df, self.name(), &self.required_columns())
    }

    /// Check the schema, then apply.
    fn run(&self, df: DataFrame) -> Result<DataFrame> {
        self.check_schema(&df)?;
        let rows_in = df.height();
        let out = self.apply(df)?;
        debug!(
            stage = self.name(),
            rows_in,
            rows_out = out.height(),
            cols = out.width(),
            "stage complete"
        );
        Ok(out)
    }
}
