//! rad-extract command definitions and handlers
//!
//! The binary in `main.rs` only parses arguments, loads configuration, and
//! sets up logging; everything else lives here so it can be tested.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use rad_core::{AppConfig, JsonlFile};
use rad_extractor::{BatchOptions, BatchReport, StubExtractor};
use rad_viewer::{highlight, Filters, ViewerState};

pub mod logging;

#[derive(Debug, Parser)]
#[command(name = "rad-extract")]
#[command(about = "Extract clinical entities from radiology reports")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_parser = existing_path)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract clinical entities from a radiology report file
    Extract {
        /// Report to read (.txt, or .json with a "text" field)
        #[arg(value_parser = existing_path)]
        input_file: PathBuf,
        /// Where to write the JSON result; printed to stdout when omitted
        output_file: Option<PathBuf>,
    },
    /// Process multiple radiology reports in a directory
    Batch {
        /// Directory containing the reports
        #[arg(value_parser = existing_path)]
        input_dir: PathBuf,
        /// Directory for the JSON results
        output_dir: Option<PathBuf>,
        /// File name pattern [default: *.txt]
        #[arg(long)]
        pattern: Option<String>,
        /// Number of reports processed at once
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Browse annotated JSONL records with NER highlighting
    View {
        /// Annotation file, one JSON record per line
        #[arg(value_parser = existing_path)]
        jsonl_file: PathBuf,
        /// Record to open (0-based)
        #[arg(long)]
        record: Option<usize>,
        /// Print the highlighted record as console markup instead of opening the viewer
        #[arg(long)]
        markup: bool,
    },
}

impl Commands {
    /// Whether the command takes over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::View { markup: false, .. })
    }
}

/// Argument parser check that a path exists
pub fn existing_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(format!("path does not exist: {}", path.display()));
    }
    Ok(path)
}

/// Configuration from an optional file, overridden by the environment
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Extract {
            input_file,
            output_file,
        } => {
            let result = rad_extractor::extract_file(
                &StubExtractor,
                &input_file,
                output_file.as_deref(),
                config.extract.pretty,
            )?;

            match output_file {
                Some(output) => println!("Results saved to {}", output.display()),
                None => println!("{}", result.to_json(config.extract.pretty)?),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Batch {
            input_dir,
            output_dir,
            pattern,
            concurrency,
        } => {
            let mut options = BatchOptions::from_config(input_dir, &config.batch);
            options.output_dir = output_dir;
            options.pretty = config.extract.pretty;
            if let Some(pattern) = pattern {
                options.pattern = pattern;
            }
            if let Some(concurrency) = concurrency {
                options.concurrency = concurrency;
            }

            let report =
                rad_extractor::process_directory(Arc::new(StubExtractor), &options).await?;
            print!("{}", batch_summary(&report, &options));

            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::View {
            jsonl_file,
            record,
            markup,
        } => {
            let file = JsonlFile::open(&jsonl_file)?;
            let filters = Filters {
                show_anatomy: config.viewer.show_anatomy,
                show_observation: config.viewer.show_observation,
            };
            let index = record.unwrap_or(config.viewer.start_record);
            let state = ViewerState::new(file, index, filters)?;

            if markup {
                print!(
                    "{}",
                    highlight::markup_report(
                        state.record(),
                        &state.filters,
                        state.selected_relations()
                    )
                );
            } else {
                rad_viewer::run(state)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Human-readable outcome of a batch run
pub fn batch_summary(report: &BatchReport, options: &BatchOptions) -> String {
    let mut out = format!(
        "Processed {} of {} files matching '{}' in {}\n",
        report.processed.len(),
        report.total(),
        report.pattern,
        options.input_dir.display()
    );
    if let Some(output_dir) = &options.output_dir {
        out.push_str(&format!("Results saved to {}\n", output_dir.display()));
    }
    for failure in &report.failed {
        out.push_str(&format!(
            "Failed: {}: {}\n",
            failure.input.display(),
            failure.error
        ));
    }
    out
}
