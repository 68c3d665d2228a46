//! Top-level error type.

use lendprep_data::{ErrorKind, PrepError};
use lendprep_output::ExportError;
use thiserror::Error;

/// Result alias for builds.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from building or saving a dataset.
#[derive(Debug, Error)]
pub enum Error {
    /// A pipeline stage failed.
    #[error(transparent)]
    Prep(#[from] PrepError),

    /// Writing the dataset, report or profile failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl Error {
    /// Failure class. Export failures are internal.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Prep(e) => e.kind(),
            Self::Export(_) => ErrorKind::Internal,
        }
    }
}
