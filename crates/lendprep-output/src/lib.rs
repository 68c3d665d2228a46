#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lendprep/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod profile;
pub mod report;

pub use export::{ExportError, ExportFormat, Exporter, dataset_to_string, save_dataset};
pub use profile::{ColumnProfile, CorrelationMatrix, DatasetProfile, NumericStats, pearson};
pub use report::{
    BuildReport, ImputedColumn, ReportBuilder, StageShape, TargetBalance, missing_counts,
};
