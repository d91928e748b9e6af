use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use extraction::{ExtractionMode, ExtractionRequest, PageSelector, Tabula};

/// Runs Tabula with full control over the extraction options.
#[derive(Args, Debug)]
pub struct Command {
    /// Path to input PDF. Exactly one of --input and --batch is required.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory of PDFs to extract from in one run.
    #[arg(long)]
    pub batch: Option<PathBuf>,

    /// Pages to extract from, e.g. "1", "1,3" or "2-5", or "all".
    #[arg(long, default_value = "all")]
    pub pages: PageSelector,

    /// Area to extract from as top,left,bottom,right. May be repeated.
    ///
    /// Disables layout guessing.
    #[arg(long = "area", allow_hyphen_values = true)]
    pub areas: Vec<String>,

    /// Areas are percentages of the page, marked with a leading "%".
    #[arg(long)]
    pub relative_area: bool,

    /// Do not guess the table layout.
    #[arg(long)]
    pub no_guess: bool,

    /// Use ruling lines to delimit cells.
    #[arg(long, conflicts_with = "stream")]
    pub lattice: bool,

    /// Use whitespace to delimit cells.
    #[arg(long)]
    pub stream: bool,

    /// Password for an encrypted PDF.
    #[arg(long)]
    pub password: Option<String>,

    /// Suppress Tabula's own diagnostics.
    #[arg(long)]
    pub silent: bool,

    /// X coordinates of column boundaries.
    #[arg(long, value_delimiter(','))]
    pub columns: Vec<f32>,

    /// Output format: CSV, TSV or JSON (case-insensitive). Defaults to CSV.
    #[arg(long)]
    pub format: Option<String>,

    /// File to write the tables to, instead of standard output.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Keep line returns within cells.
    #[arg(long)]
    pub use_line_returns: bool,

    /// Print the command line that would be run, without running it.
    #[arg(long)]
    pub dry_run: bool,
}

impl Command {
    pub fn to_request(&self) -> ExtractionRequest {
        let mode = if self.lattice {
            ExtractionMode::Lattice
        } else if self.stream {
            ExtractionMode::Stream
        } else {
            ExtractionMode::Default
        };

        let mut builder = ExtractionRequest::builder()
            .pages(self.pages.clone())
            .areas(self.areas.iter().map(String::as_str))
            .relative_area(self.relative_area)
            .guess_layout(!self.no_guess)
            .extraction_mode(mode)
            .silent(self.silent)
            .use_line_returns(self.use_line_returns);

        if let Some(input) = &self.input {
            builder = builder.input_path(input);
        }
        if let Some(batch) = &self.batch {
            builder = builder.batch_directory(batch);
        }
        if let Some(password) = &self.password {
            builder = builder.password(password);
        }
        if !self.columns.is_empty() {
            builder = builder.columns(self.columns.clone());
        }
        if let Some(format) = &self.format {
            builder = builder.output_format(format);
        }
        if let Some(output) = &self.output {
            builder = builder.output_path(output);
        }

        builder.build()
    }
}

/// Runs the subcommand.
pub fn run(cmd: &Command, tabula: &Tabula) -> Result<()> {
    let request = cmd.to_request();

    if cmd.dry_run {
        let invocation = tabula
            .invocation(&request)
            .with_context(|| "preparing Tabula command line")?;
        println!("{invocation}");
        return Ok(());
    }

    let output = tabula
        .extract(&request)
        .with_context(|| "extracting tables")?;
    super::write_stdout(&output)
}
