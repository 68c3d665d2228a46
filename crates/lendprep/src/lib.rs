#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lendprep/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod error;

// Re-export main types from sub-crates
pub use lendprep_data as data;
pub use lendprep_features as features;
pub use lendprep_output as output;

pub use builder::{BuiltDataset, DatasetBuilder};
pub use error::{Error, Result};
pub use lendprep_features::PipelineConfig;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
