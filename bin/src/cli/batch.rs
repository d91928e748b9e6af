use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use extraction::{OutputFormat, PageSelector, Tabula};

/// Extracts tables from every PDF file in a directory.
///
/// Tabula writes one output file beside each PDF, unless --output-dir is given.
#[derive(Args, Debug)]
pub struct Command {
    /// Directory containing the input PDFs.
    pub dir: PathBuf,

    /// Existing directory to move the written files into.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format: CSV, TSV or JSON (case-insensitive).
    #[arg(long, default_value = "CSV", value_parser = super::parse_format)]
    pub format: OutputFormat,

    /// Pages to extract from each PDF.
    #[arg(long, default_value = "all")]
    pub pages: PageSelector,
}

/// Runs the subcommand.
pub fn run(cmd: &Command, tabula: &Tabula) -> Result<()> {
    match &cmd.output_dir {
        Some(output_dir) => {
            let moved = tabula
                .convert_batch_into(&cmd.dir, output_dir, cmd.format, cmd.pages.clone())
                .with_context(|| format!("converting PDFs in {:?}", cmd.dir))?;
            for path in moved {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }
        None => {
            let output = tabula
                .convert_batch(&cmd.dir, cmd.format, cmd.pages.clone())
                .with_context(|| format!("converting PDFs in {:?}", cmd.dir))?;
            super::write_stdout(&output)
        }
    }
}
