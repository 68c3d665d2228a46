//! Column names of the raw and derived tables.
//!
//! Names match the headers of `application_record.csv` and
//! `credit_record.csv`. Derived columns use the same upper-case style until
//! the final rename.

use crate::error::{PrepError, Result};
use polars::prelude::*;

/// Applicant identifier, the join key of both inputs.
pub const ID: &str = "ID";

/// Application table columns.
pub mod application {
    /// Gender code (`F`/`M`)
    pub const CODE_GENDER: &str = "CODE_GENDER";
    /// Car ownership flag (`N`/`Y`)
    pub const FLAG_OWN_CAR: &str = "FLAG_OWN_CAR";
    /// Property ownership flag (`N`/`Y`)
    pub const FLAG_OWN_REALTY: &str = "FLAG_OWN_REALTY";
    /// Number of children
    pub const CNT_CHILDREN: &str = "CNT_CHILDREN";
    /// Annual income
    pub const AMT_INCOME_TOTAL: &str = "AMT_INCOME_TOTAL";
    /// Income category
    pub const NAME_INCOME_TYPE: &str = "NAME_INCOME_TYPE";
    /// Education level
    pub const NAME_EDUCATION_TYPE: &str = "NAME_EDUCATION_TYPE";
    /// Marital status
    pub const NAME_FAMILY_STATUS: &str = "NAME_FAMILY_STATUS";
    /// Residence type
    pub const NAME_HOUSING_TYPE: &str = "NAME_HOUSING_TYPE";
    /// Days since birth, counted backwards (negative)
    pub const DAYS_BIRTH: &str = "DAYS_BIRTH";
    /// Days since employment started (negative), or a non-negative sentinel
    pub const DAYS_EMPLOYED: &str = "DAYS_EMPLOYED";
    /// Mobile phone flag, constant across the dataset
    pub const FLAG_MOBIL: &str = "FLAG_MOBIL";
    /// Work phone flag
    pub const FLAG_WORK_PHONE: &str = "FLAG_WORK_PHONE";
    /// Phone flag
    pub const FLAG_PHONE: &str = "FLAG_PHONE";
    /// Email flag
    pub const FLAG_EMAIL: &str = "FLAG_EMAIL";
    /// Job category
    pub const OCCUPATION_TYPE: &str = "OCCUPATION_TYPE";
    /// Family size
    pub const CNT_FAM_MEMBERS: &str = "CNT_FAM_MEMBERS";
}

/// Credit history columns.
pub mod credit {
    /// Month offset from the present (0 = current month, negative = past)
    pub const MONTHS_BALANCE: &str = "MONTHS_BALANCE";
    /// Monthly status code (`0`-`5`, `X`, `C`)
    pub const STATUS: &str = "STATUS";
}

/// Columns added by feature derivation and target construction.
pub mod derived {
    /// Months since the oldest credit-history entry
    pub const ACCOUNT_LENGTH: &str = "ACCOUNT_LENGTH";
    /// Age in years
    pub const AGE_YEARS: &str = "AGE_YEARS";
    /// 1 when no employment history is recorded
    pub const UNEMPLOYED: &str = "UNEMPLOYED";
    /// Years in current employment, 0 when unemployed
    pub const YEARS_EMPLOYED: &str = "YEARS_EMPLOYED";
    /// Binary risk label
    pub const TARGET: &str = "TARGET";
}

/// Whether `df` has a column called `name`.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Ensure every column in `columns` is present, naming `stage` in the error.
pub fn require_columns(df: &DataFrame, stage: &str, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|c| !has_column(df, c)) {
        Some(missing) => Err(PrepError::MissingColumn {
            stage: stage.to_string(),
            column: (*missing).to_string(),
        }),
        None => Ok(()),
    }
}

/// Dtype a source column is parsed as, or `None` to let the reader infer it.
///
/// Pinning these keeps a long run of integer-looking values from fixing the
/// dtype before a later `X` status or fractional income appears.
pub fn source_dtype(name: &str) -> Option<DataType> {
    use application::*;
    use credit::*;

    match name {
        ID | MONTHS_BALANCE | CNT_CHILDREN | DAYS_BIRTH | DAYS_EMPLOYED | FLAG_MOBIL
        | FLAG_WORK_PHONE | FLAG_PHONE | FLAG_EMAIL => Some(DataType::Int64),
        AMT_INCOME_TOTAL | CNT_FAM_MEMBERS => Some(DataType::Float64),
        STATUS | CODE_GENDER | FLAG_OWN_CAR | FLAG_OWN_REALTY | NAME_INCOME_TYPE
        | NAME_EDUCATION_TYPE | NAME_FAMILY_STATUS | NAME_HOUSING_TYPE | OCCUPATION_TYPE => {
            Some(DataType::String)
        }
        _ => None,
    }
}

/// Whether values of `dtype` are treated as numeric for imputation and profiling.
pub const fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Whether `dtype` is an integer type.
pub const fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}
