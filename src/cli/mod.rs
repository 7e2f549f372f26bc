//! Command-line interface
//!
//! One subcommand per pipeline stage plus `run` for the whole
//! pipeline, `predict` for single records, and (behind the `server`
//! feature) `serve` for the HTTP boundary.

pub mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_config, PipelineConfig};
use crate::error::Result;
use crate::pipeline;
use crate::predict::{PredictionPipeline, RawRecord};
use logging::{log, LogLevel};

#[derive(Parser)]
#[command(name = "desgaste")]
#[command(about = "Churn-prediction training pipeline and serving")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pipeline configuration file (YAML); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run all five pipeline stages in order
    Run,
    /// Copy the source dataset into the artifacts tree
    Ingest,
    /// Check the ingested dataset against the expected schema
    Validate,
    /// Engineer features and write the train/test checkpoints
    Transform,
    /// Fit the random forest and save the model artifact
    Train,
    /// Score the held-out split and record the run
    Evaluate,
    /// Score one record from a JSON file (array of raw field values)
    Predict {
        /// JSON file with the raw input values in schema order
        #[arg(long)]
        record: PathBuf,
        /// Model artifact path; defaults to the trainer's output
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Serve predictions and training jobs over HTTP
    #[cfg(feature = "server")]
    Serve,
}

/// Dispatch a parsed CLI invocation
pub fn run_command(cli: Cli) -> Result<()> {
    let level = LogLevel::from_flags(cli.verbose, cli.quiet);
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = PipelineConfig::default();
            config.validate()?;
            config
        }
    };

    match cli.command {
        Command::Run => {
            pipeline::run_pipeline(&config, level)?;
        }
        Command::Ingest => {
            pipeline::ingest::run(&config.ingestion, level)?;
        }
        Command::Validate => {
            let dataset = config.ingestion.dataset_path();
            pipeline::validate::run(&config.validation, &dataset, level)?;
        }
        Command::Transform => {
            let dataset = config.ingestion.dataset_path();
            pipeline::transform::run(&config.transformation, &dataset, level)?;
        }
        Command::Train => {
            pipeline::train::run(&config.trainer, &config.transformation, level)?;
        }
        Command::Evaluate => {
            pipeline::evaluate::run(
                &config.evaluation,
                &config.trainer,
                &config.transformation,
                level,
            )?;
        }
        Command::Predict { record, model } => {
            let artifact = model.unwrap_or_else(|| config.trainer.model_path());
            let service = PredictionPipeline::load(artifact)?;
            let json = std::fs::read_to_string(&record)?;
            let values: Vec<String> = serde_json::from_str(&json)?;
            let prediction = service.predict(&RawRecord { values })?;
            // the label is the command's output, not a log line
            println!("{}", prediction.label);
            log(
                level,
                LogLevel::Verbose,
                &format!("churn probability: {:.4}", prediction.churn_probability),
            );
        }
        #[cfg(feature = "server")]
        Command::Serve => {
            crate::server::serve(config, level)?;
        }
    }
    Ok(())
}
