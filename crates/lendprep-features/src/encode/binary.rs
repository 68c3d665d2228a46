//! Fixed two-value lookups (`F/M`, `N/Y`) mapped to `0/1`.

use crate::stage::Stage;
use lendprep_data::schema::application;
use lendprep_data::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lookup for one two-valued text column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryEncoding {
    /// Column to encode
    pub column: String,
    /// Value encoded as 0
    pub zero: String,
    /// Value encoded as 1
    pub one: String,
}

impl BinaryEncoding {
    /// Create a lookup.
    pub fn new(column: &str, zero: &str, one: &str) -> Self {
        Self {
            column: column.to_string(),
            zero: zero.to_string(),
            one: one.to_string(),
        }
    }

    /// Gender, car ownership and property ownership.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(application::CODE_GENDER, "F", "M"),
            Self::new(application::FLAG_OWN_CAR, "N", "Y"),
            Self::new(application::FLAG_OWN_REALTY, "N", "Y"),
        ]
    }

    /// Code for `value`, or `None` when it lies outside the lookup.
    pub fn code(&self, value: &str) -> Option<i32> {
        if value == self.zero {
            Some(0)
        } else if value == self.one {
            Some(1)
        } else {
            None
        }
    }

    /// The two values must differ.
    pub fn validate(&self) -> Result<()> {
        if self.zero == self.one {
            return Err(PrepError::Config(format!(
                "binary encoding for '{}' maps '{}' to both 0 and 1",
                self.column, self.zero
            )));
        }
        Ok(())
    }

    /// Encode one column of `df`, replacing it in place.
    pub fn encode(&self, df: &mut DataFrame) -> Result<()> {
        let column = df.column(&self.column)?;
        if column.dtype() != &DataType::String {
            return Err(PrepError::data_quality(
                self.column.as_str(),
                format!("expected text values to encode, found {}", column.dtype()),
            ));
        }

        let codes = column
            .str()?
            .into_iter()
            .map(|value| {
                let raw = value.unwrap_or("<missing>");
                value
                    .and_then(|v| self.code(v))
                    .ok_or_else(|| PrepError::Encoding {
                        column: self.column.clone(),
                        value: raw.to_string(),
                    })
            })
            .collect::<Result<Vec<i32>>>()?;

        df.with_column(Column::new(self.column.as_str().into(), codes))?;
        debug!(column = %self.column, "encoded binary column");
        Ok(())
    }
}

/// Stage applying a set of binary lookups.
#[derive(Debug, Clone)]
pub struct BinaryEncoder {
    encodings: Vec<BinaryEncoding>,
}

impl BinaryEncoder {
    /// Create an encoder for the given lookups.
    pub const fn new(encodings: Vec<BinaryEncoding>) -> Self {
        Self { encodings }
    }
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        Self::new(BinaryEncoding::defaults())
    }
}

impl Stage for BinaryEncoder {
    fn name(&self) -> &str {
        "binary_encoding"
    }

    fn required_columns(&self) -> Vec<&str> {
        self.encodings.iter().map(|e| e.column.as_str()).collect()
    }

    fn apply(&self, mut df: DataFrame) -> Result<DataFrame> {
        for encoding in &self.encodings {
            encoding.encode(&mut df)?;
        }
        Ok(df)
    }
}
