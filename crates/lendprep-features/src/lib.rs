#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lendprep/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod clean;
pub mod config;
pub mod derive;
pub mod encode;
pub mod registry;
pub mod stage;
pub mod target;

pub use clean::{CleanConfig, CleanOutcome, Cleaner, FillStrategy, FillValue, Imputation, clean};
pub use config::{DAYS_PER_YEAR, PipelineConfig};
pub use derive::{
    AccountLength, Age, ApplicantProjection, Employment, account_lengths, derive_features,
    derive_with_lengths,
};
pub use encode::{BinaryEncoder, BinaryEncoding, ColumnRenames, RenamePair, Renamer, encode};
pub use registry::{
    FeatureCategory, FeatureInfo, available_features, count_by_category, feature_map,
    features_by_category, get_feature_info, list_feature_names,
};
pub use stage::Stage;
pub use target::{Target, build_target, risk_code, verify_same_applicants};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
