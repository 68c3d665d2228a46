#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lendprep/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ErrorKind, PrepError, Result};
pub use loader::{LoadOptions, SourceTables, join_sources, load};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
