//! Derived applicant features.
//!
//! The merged table carries one row per credit month. Derivation first
//! projects it down to one row per applicant, then adds age, employment
//! and account-length columns.

pub mod age;
pub mod employment;
pub mod tenure;

pub use age::Age;
pub use employment::Employment;
pub use tenure::{AccountLength, account_lengths};

use crate::config::PipelineConfig;
use crate::stage::Stage;
use lendprep_data::Result;
use lendprep_data::schema::{
    ID,
    credit::{MONTHS_BALANCE, STATUS},
    has_column,
};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

/// Inner join on `ID`, sorted by `ID`.
pub(crate) fn inner_join_on_id(left: DataFrame, right: DataFrame) -> Result<DataFrame> {
    let joined = left
        .lazy()
        .join(
            right.lazy(),
            [col(ID)],
            [col(ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([ID], Default::default())
        .collect()?;
    Ok(joined)
}

/// Drops the per-month history columns and keeps one row per applicant.
///
/// When an applicant still has several distinct rows after the month
/// columns are gone, the first one wins and a warning is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicantProjection;

impl Stage for ApplicantProjection {
    fn name(&self) -> &str {
        "applicant_projection"
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![ID]
    }

    fn apply(&self, mut df: DataFrame) -> Result<DataFrame> {
        for name in [MONTHS_BALANCE, STATUS] {
            if has_column(&df, name) {
                df = df.drop(name)?;
            }
        }

        let df = df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;

        let ids = df.column(ID)?.cast(&DataType::Int64)?;
        let mut seen = HashSet::new();
        let keep: Vec<bool> = ids
            .i64()?
            .into_iter()
            .map(|id| id.is_none_or(|id| seen.insert(id)))
            .collect();

        let conflicting = keep.iter().filter(|k| !**k).count();
        if conflicting > 0 {
            warn!(
                conflicting,
                "applicants with conflicting attribute rows, keeping the first"
            );
        }

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }
}

/// Project to applicants and add every derived feature.
///
/// Applicants without credit history are dropped by the account-length
/// join.
pub fn derive_features(
    table: DataFrame,
    credit: &DataFrame,
    config: &PipelineConfig,
) -> Result<DataFrame> {
    derive_with_lengths(table, &AccountLength::from_history(credit)?, config)
}

/// Same as [`derive_features`] with account lengths computed up front.
pub fn derive_with_lengths(
    table: DataFrame,
    lengths: &AccountLength,
    config: &PipelineConfig,
) -> Result<DataFrame> {
    let table = ApplicantProjection.run(table)?;
    let table = Age::new(config.days_per_year).run(table)?;
    let table = Employment::new(config.days_per_year).run(table)?;
    let table = lengths.run(table)?;

    info!(
        rows = table.height(),
        cols = table.width(),
        "derived applicant features"
    );
    Ok(table)
}
