//! Account length: months since the oldest credit-history entry.

use super::inner_join_on_id;
use crate::stage::Stage;
use lendprep_data::schema::{ID, credit::MONTHS_BALANCE, derived::ACCOUNT_LENGTH, require_columns};
use lendprep_data::{PrepError, Result};
use polars::prelude::*;
use tracing::info;

/// Per-applicant account length from the raw credit history.
///
/// Returns `ID`, `ACCOUNT_LENGTH` with one row per applicant in first-seen
/// order. `ACCOUNT_LENGTH = -min(MONTHS_BALANCE)`.
pub fn account_lengths(credit: &DataFrame) -> Result<DataFrame> {
    require_columns(credit, "account_length", &[ID, MONTHS_BALANCE])?;

    let months = credit.column(MONTHS_BALANCE)?.cast(&DataType::Int64)?;
    let months = months.i64()?;
    if months.null_count() > 0 {
        return Err(PrepError::data_quality(
            MONTHS_BALANCE,
            format!("{} credit rows have no month offset", months.null_count()),
        ));
    }
    if let Some(latest) = months.max()
        && latest > 0
    {
        return Err(PrepError::data_quality(
            MONTHS_BALANCE,
            format!("month offsets must be non-positive, found {latest}"),
        ));
    }

    let lengths = credit
        .clone()
        .lazy()
        .group_by_stable([col(ID)])
        .agg([
            (lit(0i64) - col(MONTHS_BALANCE).cast(DataType::Int64).min()).alias(ACCOUNT_LENGTH),
        ])
        .collect()?;

    info!(applicants = lengths.height(), "computed account lengths");
    Ok(lengths)
}

/// Stage joining precomputed account lengths onto the applicant table.
///
/// The join is inner: applicants without credit history are dropped.
#[derive(Debug, Clone)]
pub struct AccountLength {
    lengths: DataFrame,
}

impl AccountLength {
    /// Wrap an `ID`, `ACCOUNT_LENGTH` table.
    pub const fn new(lengths: DataFrame) -> Self {
        Self { lengths }
    }

    /// Compute lengths from the raw history.
    pub fn from_history(credit: &DataFrame) -> Result<Self> {
        Ok(Self::new(account_lengths(credit)?))
    }

    /// The per-applicant lengths.
    pub const fn lengths(&self) -> &DataFrame {
        &self.lengths
    }
}

impl Stage for AccountLength {
    fn name(&self) -> &str {
        "account_length"
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![ID]
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        inner_join_on_id(df, self.lengths.clone())
    }
}
