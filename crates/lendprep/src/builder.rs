//! The end-to-end dataset build.

use crate::error::Result;
use lendprep_data::schema::derived::TARGET;
use lendprep_data::{PrepError, SourceTables, join_sources, load};
use lendprep_features::{
    AccountLength, Cleaner, PipelineConfig, Stage, Target, account_lengths, build_target,
    derive_with_lengths, encode, verify_same_applicants,
};
use lendprep_output::{
    BuildReport, DatasetProfile, ExportFormat, ImputedColumn, ReportBuilder, TargetBalance,
    save_dataset,
};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Builds the model-ready table from the two raw sources.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    config: PipelineConfig,
}

impl DatasetBuilder {
    /// Builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with a validated configuration.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Builder with a configuration read from a JSON file.
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Self::with_config(PipelineConfig::from_json_file(path)?)
    }

    /// Access the configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read and join the two source files.
    pub fn load(&self, applications: &Path, credit: &Path) -> Result<SourceTables> {
        Ok(load(applications, credit, &self.config.load)?)
    }

    /// Run the whole pipeline on two files.
    pub fn build(&self, applications: &Path, credit: &Path) -> Result<BuiltDataset> {
        let sources = self.load(applications, credit)?;
        let report = ReportBuilder::new().inputs(
            &applications.display().to_string(),
            &credit.display().to_string(),
        );
        self.run(sources, report)
    }

    /// Run the whole pipeline on frames already in memory.
    pub fn build_from_frames(
        &self,
        applications: DataFrame,
        credit: DataFrame,
    ) -> Result<BuiltDataset> {
        let sources = join_sources(applications, credit)?;
        self.run(sources, ReportBuilder::new())
    }

    fn run(&self, sources: SourceTables, report: ReportBuilder) -> Result<BuiltDataset> {
        let SourceTables { merged, credit, .. } = sources;
        let mut report = report.stage("join", &merged).missing_after_join(&merged);

        let cleaned = Cleaner::from_pipeline(&self.config).clean(merged)?;
        report = report
            .stage("clean", &cleaned.frame)
            .duplicates_removed(cleaned.duplicates_removed)
            .dropped_columns(cleaned.dropped_columns.clone());
        for imputation in &cleaned.imputations {
            report = report.imputation(ImputedColumn {
                column: imputation.column.clone(),
                strategy: imputation.strategy.to_string(),
                value: imputation.value.to_string(),
                filled: imputation.filled,
            });
        }

        // both credit-derived tables come from the raw history
        let lengths = account_lengths(&credit)?;
        let targets = build_target(&credit)?;
        verify_same_applicants(&lengths, &targets)?;

        let derived =
            derive_with_lengths(cleaned.frame, &AccountLength::new(lengths), &self.config)?;
        report = report.stage("derive", &derived);

        let labelled = Target::new(targets).run(derived)?;
        report = report.stage("target", &labelled);
        ensure_complete(&labelled)?;

        let frame = encode(labelled, &self.config)?;
        let target_column = self.config.renames.label(TARGET).to_string();
        let balance = TargetBalance::from_column(&frame, &target_column)?;
        let report = report.stage("encode", &frame).target_balance(balance).build();

        info!(rows = frame.height(), cols = frame.width(), "dataset built");
        Ok(BuiltDataset {
            frame,
            report,
            target_column,
        })
    }
}

fn ensure_complete(df: &DataFrame) -> Result<()> {
    if let Some(column) = df.get_columns().iter().find(|c| c.null_count() > 0) {
        return Err(PrepError::data_quality(
            column.name().as_str(),
            format!("{} missing values after cleaning", column.null_count()),
        )
        .into());
    }
    Ok(())
}

/// The final table and the record of how it was built.
#[derive(Debug, Clone)]
pub struct BuiltDataset {
    /// One row per applicant, sorted by `ID`, with output labels.
    pub frame: DataFrame,
    /// Build summary.
    pub report: BuildReport,
    target_column: String,
}

impl BuiltDataset {
    /// Label of the target column in `frame`.
    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Write the table as CSV or JSON.
    pub fn save(&self, path: &Path, format: ExportFormat) -> Result<()> {
        Ok(save_dataset(&self.frame, path, format)?)
    }

    /// Profile the final table.
    pub fn profile(&self) -> Result<DatasetProfile> {
        Ok(DatasetProfile::from_frame(
            &self.frame,
            Some(&self.target_column),
        )?)
    }

    /// Take the table.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }
}
