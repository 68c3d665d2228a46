//! Pipeline configuration.
//!
//! Every field has a default matching the reference dataset, so an empty
//! JSON object (`{}`) is a valid configuration.

use crate::clean::CleanConfig;
use crate::encode::{BinaryEncoding, ColumnRenames};
use lendprep_data::{LoadOptions, PrepError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Mean length of a Gregorian year in days.
pub const DAYS_PER_YEAR: f64 = 365.2425;

/// Configuration for the whole build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CSV reader options
    pub load: LoadOptions,
    /// Imputation overrides and constant columns
    pub clean: CleanConfig,
    /// Divisor turning day counts into years (default: 365.2425)
    pub days_per_year: f64,
    /// Fixed lookups for two-valued text fields
    pub binary_encodings: Vec<BinaryEncoding>,
    /// Output column labels
    pub renames: ColumnRenames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            clean: CleanConfig::default(),
            days_per_year: DAYS_PER_YEAR,
            binary_encodings: BinaryEncoding::defaults(),
            renames: ColumnRenames::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations that cannot produce a valid table.
    pub fn validate(&self) -> Result<()> {
        if !(self.days_per_year.is_finite() && self.days_per_year > 0.0) {
            return Err(PrepError::Config(format!(
                "days_per_year must be positive, got {}",
                self.days_per_year
            )));
        }

        let mut seen = HashSet::new();
        for encoding in &self.binary_encodings {
            if !seen.insert(encoding.column.as_str()) {
                return Err(PrepError::Config(format!(
                    "column '{}' has more than one binary encoding",
                    encoding.column
                )));
            }
            encoding.validate()?;
        }

        Ok(())
    }
}
