//! Translation of an [ExtractionRequest] into Tabula's command line flags.


use std::{
    ffi::{OsStr, OsString},
    fs::File,
    io::ErrorKind as IoErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    error::{ExtractionError, Result},
    request::{AreaSpec, ExtractionMode, ExtractionRequest, OutputFormat, RELATIVE_MARKER},
};

/// What drives a rendered run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// A single PDF file.
    File(PathBuf),
    /// Every PDF within a directory.
    Batch(PathBuf),
}

/// Ordered sequence of Tabula arguments produced by [render].
///
/// Does not include the runtime or archive arguments, those are added by the runner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedCommand {
    args: Vec<OsString>,
    format: OutputFormat,
    source: Source,
    output_path: Option<PathBuf>,
}

impl RenderedCommand {
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn iter(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.args.len()
    }

    /// The normalised output format.
    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Where Tabula is asked to write its output, when not writing to standard output.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Arguments as (lossily converted) strings, for display and logging.
    pub fn to_string_lossy(&self) -> Vec<String> {
        self.iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

/// Validates `request` and renders it into Tabula's arguments.
///
/// Flags are always emitted in the same order. The only I/O performed is checking that the input
/// file or batch directory exist.
pub fn render(request: &ExtractionRequest) -> Result<RenderedCommand> {
    let format = normalise_format(request.output_format())?;
    let source = select_source(request)?;
    match &source {
        Source::File(input_path) => check_input_file(input_path)?,
        Source::Batch(batch_dir) => check_batch_directory(batch_dir)?,
    }

    let mut args = ArgList::default();

    if let Source::File(input_path) = &source {
        args.push(input_path);
    }

    args.flag_value("--page", request.page_selector().as_arg());

    // An area and layout guessing are mutually exclusive.
    let mut guess = request.guess_layout();
    if !request.area_specs().is_empty() {
        guess = false;
        for area in request.area_specs() {
            args.flag_value("--area", render_area(area, request.relative_area()));
        }
    }

    match request.extraction_mode() {
        ExtractionMode::Default => {}
        ExtractionMode::Lattice => args.flag("--lattice"),
        ExtractionMode::Stream => args.flag("--stream"),
    }

    if guess {
        args.flag("--guess");
    }

    args.flag_value("--format", format.to_string());

    if let Some(output_path) = request.output_path() {
        args.flag_value("--outfile", output_path);
    }

    if let Some(columns) = request.columns() {
        let joined = columns
            .iter()
            .map(f32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        args.flag_value("--columns", joined);
    }

    if let Some(password) = request.password() {
        args.flag_value("--password", password);
    }

    if let Source::Batch(batch_dir) = &source {
        // Checked again, as the directory may have been removed since validation.
        check_batch_directory(batch_dir)?;
        args.flag_value("--batch", batch_dir);
    }

    if request.silent() {
        args.flag("--silent");
    }

    if request.use_line_returns() {
        args.flag("--use-line-returns");
    }

    log::debug!("Rendered Tabula arguments: {:?}", args.0);
    Ok(RenderedCommand {
        args: args.0,
        format,
        source,
        output_path: request.output_path().map(Path::to_path_buf),
    })
}

/// Parses a format name case-insensitively, defaulting to [OutputFormat::Csv] when absent.
pub fn normalise_format(name: Option<&str>) -> Result<OutputFormat> {
    match name {
        None => Ok(OutputFormat::default()),
        Some(name) => {
            OutputFormat::from_str(name.trim()).map_err(|_| ExtractionError::InvalidFormat {
                value: name.to_string(),
            })
        }
    }
}

fn select_source(request: &ExtractionRequest) -> Result<Source> {
    match (request.input_path(), request.batch_directory()) {
        (Some(_), Some(_)) => Err(ExtractionError::AmbiguousSource),
        (Some(input_path), None) => Ok(Source::File(input_path.to_path_buf())),
        (None, Some(batch_dir)) => Ok(Source::Batch(batch_dir.to_path_buf())),
        (None, None) => Err(ExtractionError::MissingSource),
    }
}

fn check_input_file(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|err| match err.kind() {
        IoErrorKind::NotFound => ExtractionError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => ExtractionError::InputNotReadable {
            path: path.to_path_buf(),
            source: err,
        },
    })?;

    if !metadata.is_file() {
        return Err(ExtractionError::InputNotReadable {
            path: path.to_path_buf(),
            source: std::io::Error::other("not a regular file"),
        });
    }

    File::open(path)
        .map(drop)
        .map_err(|err| ExtractionError::InputNotReadable {
            path: path.to_path_buf(),
            source: err,
        })
}

fn check_batch_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ExtractionError::BatchDirectoryNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn render_area(area: &AreaSpec, relative_area: bool) -> String {
    let text = area.as_str().trim();
    let text = if relative_area {
        text.strip_prefix(RELATIVE_MARKER).unwrap_or(text)
    } else {
        text
    };
    text.split(',').map(str::trim).collect::<Vec<_>>().join(",")
}

#[derive(Default)]
struct ArgList(Vec<OsString>);

impl ArgList {
    fn push(&mut self, arg: impl AsRef<OsStr>) {
        self.0.push(arg.as_ref().to_os_string());
    }

    fn flag(&mut self, flag: &str) {
        self.push(flag);
    }

    fn flag_value(&mut self, flag: &str, value: impl AsRef<OsStr>) {
        self.push(flag);
        self.push(value);
    }
}
