//! Categorical encoding and output relabelling.

pub mod binary;
pub mod rename;

pub use binary::{BinaryEncoder, BinaryEncoding};
pub use rename::{ColumnRenames, RenamePair, Renamer};

use crate::config::PipelineConfig;
use crate::stage::Stage;
use lendprep_data::Result;
use polars::prelude::*;
use tracing::info;

/// Encode the binary fields, then apply the rename map.
pub fn encode(df: DataFrame, config: &PipelineConfig) -> Result<DataFrame> {
    let encoded = BinaryEncoder::new(config.binary_encodings.clone()).run(df)?;
    let renamed = Renamer::new(config.renames.clone()).run(encoded)?;
    info!(cols = renamed.width(), "encoded and renamed columns");
    Ok(renamed)
}
