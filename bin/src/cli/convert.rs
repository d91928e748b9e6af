use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use extraction::{ExtractionRequest, OutputFormat, PageSelector, Tabula};

/// Extracts tables from a single PDF file.
#[derive(Args, Debug)]
pub struct Command {
    /// Path to input PDF.
    pub input: PathBuf,

    /// File to write the tables to. Tables are written to standard output when omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output format: CSV, TSV or JSON (case-insensitive).
    #[arg(long, default_value = "CSV", value_parser = super::parse_format)]
    pub format: OutputFormat,

    /// Pages to extract from, e.g. "1", "1,3" or "2-5", or "all".
    #[arg(long, default_value = "all")]
    pub pages: PageSelector,
}

/// Runs the subcommand.
pub fn run(cmd: &Command, tabula: &Tabula) -> Result<()> {
    let output = match &cmd.output {
        Some(output) => tabula.convert_file(&cmd.input, output, cmd.format, cmd.pages.clone()),
        None => {
            let request = ExtractionRequest::builder()
                .input_path(&cmd.input)
                .format(cmd.format)
                .pages(cmd.pages.clone())
                .build();
            tabula.extract(&request)
        }
    }
    .with_context(|| format!("converting {:?}", cmd.input))?;

    super::write_stdout(&output)
}
