//! OIE CLI - Command-line interface
//!
//! Usage:
//!   oie [OPTIONS] [FILES]...
//!   oie --output-format tabbed -o out.tsv corpus.txt
//!   echo "The cat sat on the mat." | oie
//!
//! Extractions go to standard output or `--output`; logs go to standard error.

mod args;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Args;
use oie_core::{LoggingConfig, OieError};
use oie_pipeline::Pipeline;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e.downcast_ref::<OieError>().and_then(OieError::remediation) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let file = args.settings_file().map_err(OieError::from)?;
    init_tracing(args.log_level(&file.logging.level), &file.logging);

    let settings = args.into_settings(&file).map_err(OieError::from)?;
    tracing::debug!(?settings, "Settings resolved");

    let pipeline = Pipeline::from_settings(settings)?;
    pipeline.run()?;
    Ok(())
}

/// Log to standard error; `RUST_LOG` overrides the configured level
fn init_tracing(level: &str, config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
