//! Binary risk target from credit status codes.
//!
//! Status codes: `X` (no loan that month), `C` (paid off) and `0`-`5`
//! (days overdue bucket). Any month at `1` or worse marks the applicant as
//! high risk.

use crate::derive::inner_join_on_id;
use crate::stage::Stage;
use lendprep_data::schema::{ID, credit::STATUS, derived::TARGET, require_columns};
use lendprep_data::{PrepError, Result};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::info;

/// Risk code for one status value, `None` when it cannot be read.
pub fn risk_code(status: &str) -> Option<i32> {
    match status.trim() {
        "X" | "C" => Some(0),
        code => code.parse::<i64>().ok().map(|c| i32::from(c >= 1)),
    }
}

/// Per-applicant target: the maximum risk code over the history.
///
/// Returns `ID`, `TARGET` in first-seen order.
pub fn build_target(credit: &DataFrame) -> Result<DataFrame> {
    require_columns(credit, "target", &[ID, STATUS])?;

    let ids = credit.column(ID)?.cast(&DataType::Int64)?;
    let statuses = credit.column(STATUS)?.cast(&DataType::String)?;

    let mut id_values = Vec::with_capacity(credit.height());
    let mut risks = Vec::with_capacity(credit.height());
    for (id, status) in ids.i64()?.into_iter().zip(statuses.str()?) {
        let id = id.ok_or_else(|| PrepError::data_quality(ID, "credit row without applicant key"))?;
        let risk = status.and_then(risk_code).ok_or_else(|| PrepError::Parse {
            id,
            value: status.unwrap_or("<missing>").to_string(),
        })?;
        id_values.push(id);
        risks.push(risk);
    }

    let targets = DataFrame::new(vec![
        Column::new(ID.into(), id_values),
        Column::new(TARGET.into(), risks),
    ])?
    .lazy()
    .group_by_stable([col(ID)])
    .agg([col(TARGET).max()])
    .collect()?;

    info!(applicants = targets.height(), "built risk targets");
    Ok(targets)
}

/// Fail unless both per-applicant tables cover exactly the same IDs.
///
/// Two tables built from the same validated history always agree, so this
/// guards callers that bring their own lengths or targets. The row check in
/// the [`Target`] stage is what catches a disagreement after the joins.
pub fn verify_same_applicants(lengths: &DataFrame, targets: &DataFrame) -> Result<()> {
    let lengths = id_set(lengths)?;
    let targets = id_set(targets)?;
    if lengths != targets {
        let differing = lengths.symmetric_difference(&targets).count();
        return Err(PrepError::data_quality(
            ID,
            format!(
                "account lengths cover {} applicants and targets {}, {differing} differ",
                lengths.len(),
                targets.len()
            ),
        ));
    }
    Ok(())
}

fn id_set(df: &DataFrame) -> Result<HashSet<i64>> {
    let ids = df.column(ID)?.cast(&DataType::Int64)?;
    Ok(ids.i64()?.into_iter().flatten().collect())
}

/// Stage joining precomputed targets onto the applicant table.
#[derive(Debug, Clone)]
pub struct Target {
    targets: DataFrame,
}

impl Target {
    /// Wrap an `ID`, `TARGET` table.
    pub const fn new(targets: DataFrame) -> Self {
        Self { targets }
    }

    /// Build targets from the raw history.
    pub fn from_history(credit: &DataFrame) -> Result<Self> {
        Ok(Self::new(build_target(credit)?))
    }

    /// The per-applicant targets.
    pub const fn targets(&self) -> &DataFrame {
        &self.targets
    }
}

impl Stage for Target {
    fn name(&self) -> &str {
        "target"
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![ID]
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        let applicants = df.height();
        let joined = inner_join_on_id(df, self.targets.clone())?;
        if joined.height() != applicants {
            return Err(PrepError::data_quality(
                ID,
                format!(
                    "{} of {applicants} applicants have no target",
                    applicants.abs_diff(joined.height())
                ),
            ));
        }
        Ok(joined)
    }
}
