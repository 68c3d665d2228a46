//! Fill-value computation for missing data.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How a column's missing values were filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillStrategy {
    /// Arithmetic mean of the non-missing values
    Mean,
    /// Most frequent value, earliest on ties
    Mode,
    /// Fixed value from configuration
    Constant,
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mean => "mean",
            Self::Mode => "mode",
            Self::Constant => "constant",
        };
        f.write_str(name)
    }
}

/// Value written into the missing cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    /// Numeric fill
    Number(f64),
    /// Text fill
    Text(String),
}

impl FillValue {
    /// Literal expression for this value.
    pub fn to_lit(&self) -> Expr {
        match self {
            Self::Number(v) => lit(*v),
            Self::Text(s) => lit(s.as_str()),
        }
    }
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Record of one imputed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputation {
    /// Column name
    pub column: String,
    /// Strategy used
    pub strategy: FillStrategy,
    /// Value written into each missing cell
    pub value: FillValue,
    /// Number of cells filled
    pub filled: usize,
}

/// Mean of the non-missing values, `None` when there are none.
pub fn column_mean(column: &Column) -> Option<f64> {
    column.as_materialized_series().mean()
}

/// Most frequent non-missing value.
///
/// Ties go to the value that appears first in row order. Returns `None` when
/// every value is missing.
pub fn column_mode(values: &StringChunked) -> Option<String> {
    // value -> (count, first row index)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, value) in values.into_iter().enumerate() {
        if let Some(v) = value {
            counts.entry(v).or_insert((0, idx)).0 += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value.to_string())
}
