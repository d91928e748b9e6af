use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use extraction::{ExecutionOutput, ExtractionError, OutputFormat, Tabula, render::normalise_format};
use simplelog::LevelFilter;

use crate::config::ConfigArgs;

mod batch;
mod convert;
mod extract;
mod version;

/// Extracts tables from PDF files using Tabula.
#[derive(Parser, Debug)]
#[command(name = "tabwrap")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Logging level.
    #[arg(long, default_value = "Warn")]
    log_level: LevelFilter,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    Convert(convert::Command),
    Batch(batch::Command),
    Extract(extract::Command),
    Version,
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default())
        .with_context(|| "configuring logging")?;

    let tabula = Tabula::new(args.config.resolve()?);

    use Command::*;
    match &args.command {
        Convert(cmd) => convert::run(cmd, &tabula),
        Batch(cmd) => batch::run(cmd, &tabula),
        Extract(cmd) => extract::run(cmd, &tabula),
        Version => version::run(&tabula),
    }
}

/// Parses an output format name for use with clap.
fn parse_format(name: &str) -> Result<OutputFormat, ExtractionError> {
    normalise_format(Some(name))
}

/// Copies anything Tabula wrote to its standard output to ours.
fn write_stdout(output: &ExecutionOutput) -> Result<()> {
    if output.stdout.is_empty() {
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.stdout.as_bytes())
        .and_then(|()| stdout.flush())
        .with_context(|| "writing extracted data to standard output")
}
