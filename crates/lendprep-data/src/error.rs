//! Error types for the preprocessing pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Coarse classification of a [`PrepError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An input could not be read or lacks its key column.
    Ingestion,
    /// A column cannot be imputed or violates a derived-feature invariant.
    DataQuality,
    /// A categorical value lies outside its fixed encoding domain.
    Encoding,
    /// A credit status code could not be parsed.
    Parse,
    /// Frame library, IO or configuration failure.
    Internal,
}

/// Errors that can occur while building the dataset.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Input file missing, unreadable or without a usable `ID` column
    #[error("Ingestion error for {}: {reason}", .path.display())]
    Ingestion {
        /// Path of the offending input
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A stage was handed a table without one of its required columns
    #[error("Stage '{stage}' requires column '{column}'")]
    MissingColumn {
        /// Stage that declared the requirement
        stage: String,
        /// Column that was absent
        column: String,
    },

    /// Column cannot be cleaned or violates an invariant
    #[error("Data quality error in column '{column}': {reason}")]
    DataQuality {
        /// Column at fault
        column: String,
        /// Description of the problem
        reason: String,
    },

    /// Value outside the fixed lookup of a binary field
    #[error("Cannot encode value '{value}' in column '{column}'")]
    Encoding {
        /// Column being encoded
        column: String,
        /// Raw value that has no code
        value: String,
    },

    /// Credit status that is neither a sentinel nor an integer
    #[error("Cannot parse STATUS '{value}' for ID {id}")]
    Parse {
        /// Applicant the row belongs to
        id: i64,
        /// Raw status text
        value: String,
    },

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrepError {
    /// Build an ingestion error for `path`.
    pub fn ingestion(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Ingestion {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a data quality error for `column`.
    pub fn data_quality(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataQuality {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Ingestion { .. } => ErrorKind::Ingestion,
            Self::MissingColumn { .. } | Self::DataQuality { .. } => ErrorKind::DataQuality,
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Config(_) | Self::Polars(_) | Self::Io(_) | Self::Json(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            PrepError::ingestion("a.csv", "missing").kind(),
            ErrorKind::Ingestion
        );
        assert_eq!(
            PrepError::MissingColumn {
                stage: "encode".to_string(),
                column: "CODE_GENDER".to_string(),
            }
            .kind(),
            ErrorKind::DataQuality
        );
        assert_eq!(
            PrepError::Parse {
                id: 1,
                value: "Q".to_string()
            }
            .kind(),
            ErrorKind::Parse
        );
        assert_eq!(PrepError::Config("bad".to_string()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_display_includes_context() {
        let err = PrepError::Encoding {
            column: "CODE_GENDER".to_string(),
            value: "U".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("CODE_GENDER"));
        assert!(msg.contains("'U'"));
    }
}
