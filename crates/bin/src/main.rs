//! lendprep CLI binary.
//!
//! Builds and profiles the model-ready credit-application table.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use lendprep::{BuiltDataset, DatasetBuilder, PipelineConfig};
use lendprep_features::available_features;
use lendprep_output::{ExportFormat, Exporter};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(name = "lendprep")]
#[command(about = "Credit-application preprocessing and feature engineering", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the model-ready table and save it
    Build {
        /// Application table (CSV)
        #[arg(long)]
        applications: PathBuf,

        /// Credit history table (CSV)
        #[arg(long)]
        credit: PathBuf,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        /// Output format (inferred from the output extension when omitted)
        #[arg(long, value_enum)]
        format: Option<DatasetFormat>,

        /// Pipeline configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the build report here (JSON)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Build the table and print a column profile
    Profile {
        /// Application table (CSV)
        #[arg(long)]
        applications: PathBuf,

        /// Credit history table (CSV)
        #[arg(long)]
        credit: PathBuf,

        /// Pipeline configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: TextFormat,
    },

    /// List derived and encoded features
    Features {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: TextFormat,
    },

    /// Print the default pipeline configuration as JSON
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum DatasetFormat {
    Csv,
    Json,
}

impl From<DatasetFormat> for ExportFormat {
    fn from(format: DatasetFormat) -> Self {
        match format {
            DatasetFormat::Csv => Self::Csv,
            DatasetFormat::Json => Self::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TextFormat {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lendprep=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            applications,
            credit,
            output,
            format,
            config,
            report,
        } => {
            let format =
                format.map_or_else(|| ExportFormat::from_path(&output), ExportFormat::from);
            let built = build_with_progress(&applications, &credit, config.as_deref())?;

            built.save(&output, format)?;
            println!("{}", built.report.to_text());
            println!("Saved {} rows to {}", built.frame.height(), output.display());

            if let Some(path) = report {
                built.report.export_to_file(&path, ExportFormat::PrettyJson)?;
                println!("Report written to {}", path.display());
            }
        }
        Commands::Profile {
            applications,
            credit,
            config,
            format,
        } => {
            let built = build_with_progress(&applications, &credit, config.as_deref())?;
            let profile = built.profile()?;
            match format {
                TextFormat::Text => println!("{}", profile.to_text()),
                TextFormat::Json => {
                    println!("{}", profile.export_to_string(ExportFormat::PrettyJson)?);
                }
            }
        }
        Commands::Features { format } => list_features(format)?,
        Commands::Config => println!("{}", PipelineConfig::default().to_json_pretty()?),
    }

    Ok(())
}

fn builder(config: Option<&Path>) -> Result<DatasetBuilder, Box<dyn std::error::Error>> {
    let builder = match config {
        Some(path) => {
            debug!(path = %path.display(), "loading pipeline configuration");
            DatasetBuilder::from_config_file(path)?
        }
        None => DatasetBuilder::new(),
    };
    Ok(builder)
}

fn build_with_progress(
    applications: &Path,
    credit: &Path,
    config: Option<&Path>,
) -> Result<BuiltDataset, Box<dyn std::error::Error>> {
    let builder = builder(config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!(
        "Building dataset from {} and {}...",
        applications.display(),
        credit.display()
    ));

    match builder.build(applications, credit) {
        Ok(built) => {
            pb.finish_with_message(format!(
                "Built {} applicants x {} columns",
                built.frame.height(),
                built.frame.width()
            ));
            Ok(built)
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            Err(e.into())
        }
    }
}

fn list_features(format: TextFormat) -> Result<(), Box<dyn std::error::Error>> {
    let features = available_features();
    match format {
        TextFormat::Json => println!("{}", serde_json::to_string_pretty(&features)?),
        TextFormat::Text => {
            println!(
                "\n{:<16} {:<16} {:<12} {:<30} DESCRIPTION",
                "NAME", "LABEL", "CATEGORY", "SOURCE"
            );
            println!("{}", "-".repeat(110));
            for feature in &features {
                println!(
                    "{:<16} {:<16} {:<12} {:<30} {}",
                    feature.name,
                    feature.label,
                    feature.category.to_string(),
                    feature.source_columns.join(", "),
                    feature.description
                );
            }
            println!("\n{} features", features.len());
        }
    }
    Ok(())
}
