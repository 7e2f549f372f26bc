//! Desgaste CLI
//!
//! Churn-prediction pipeline entry point.
//!
//! # Usage
//!
//! ```bash
//! # Run the full pipeline
//! desgaste run --config pipeline.yaml
//!
//! # Run a single stage
//! desgaste transform --config pipeline.yaml
//!
//! # Score one record
//! desgaste predict --record input.json
//!
//! # Serve predictions over HTTP (server feature)
//! desgaste serve --config pipeline.yaml
//! ```

use clap::Parser;
use desgaste::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
