//! Value types describing a single extraction call.
//!
//! An [ExtractionRequest] is built fresh for each call and is immutable once built. It is
//! validated and turned into command line arguments by [crate::render::render].


use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Output format written by Tabula.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    /// Lowercase file extension (without the dot) used for files of this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

/// Table extraction algorithm for Tabula to use.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Let Tabula decide.
    #[default]
    Default,
    /// Ruling lines delimit cells.
    Lattice,
    /// Whitespace delimits cells.
    Stream,
}

/// Selection of pages to extract from.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSelector {
    #[default]
    All,
    /// Raw page specification passed through to Tabula, e.g. `1`, `1,3`, `2-5`.
    Pages(String),
}

impl PageSelector {
    pub fn as_arg(&self) -> &str {
        match self {
            PageSelector::All => "all",
            PageSelector::Pages(spec) => spec,
        }
    }
}

impl FromStr for PageSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            Ok(PageSelector::All)
        } else {
            Ok(PageSelector::Pages(s.to_string()))
        }
    }
}

impl From<&str> for PageSelector {
    fn from(value: &str) -> Self {
        let Ok(selector) = value.parse();
        selector
    }
}

impl From<u32> for PageSelector {
    fn from(value: u32) -> Self {
        PageSelector::Pages(value.to_string())
    }
}

impl Display for PageSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// Marker prefixing an area component to denote a relative (percentage) coordinate.
pub const RELATIVE_MARKER: char = '%';

/// A single `top,left,bottom,right` box on the page.
///
/// Held in its textual form so that callers can pass percentage-marked areas through unchanged.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AreaSpec(String);

impl AreaSpec {
    /// Creates an area in absolute PDF points.
    pub fn absolute(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self(format!("{top},{left},{bottom},{right}"))
    }

    /// Creates an area in percentages of the page, prefixed with [RELATIVE_MARKER].
    pub fn relative(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self(format!("{RELATIVE_MARKER}{top},{left},{bottom},{right}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_relative(&self) -> bool {
        self.0.trim_start().starts_with(RELATIVE_MARKER)
    }
}

impl From<&str> for AreaSpec {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AreaSpec {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Everything needed to render one invocation of Tabula.
///
/// Construct with [ExtractionRequest::builder].
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionRequest {
    pub(crate) input_path: Option<PathBuf>,
    pub(crate) batch_directory: Option<PathBuf>,
    pub(crate) page_selector: PageSelector,
    pub(crate) area_specs: Vec<AreaSpec>,
    pub(crate) relative_area: bool,
    pub(crate) guess_layout: bool,
    pub(crate) extraction_mode: ExtractionMode,
    pub(crate) password: Option<String>,
    pub(crate) silent: bool,
    pub(crate) use_line_returns: bool,
    pub(crate) columns: Option<Vec<f32>>,
    pub(crate) output_format: Option<String>,
    pub(crate) output_path: Option<PathBuf>,
}

impl ExtractionRequest {
    pub fn builder() -> ExtractionRequestBuilder {
        ExtractionRequestBuilder::default()
    }

    pub fn input_path(&self) -> Option<&Path> {
        self.input_path.as_deref()
    }

    pub fn batch_directory(&self) -> Option<&Path> {
        self.batch_directory.as_deref()
    }

    pub fn page_selector(&self) -> &PageSelector {
        &self.page_selector
    }

    pub fn area_specs(&self) -> &[AreaSpec] {
        &self.area_specs
    }

    pub fn relative_area(&self) -> bool {
        self.relative_area
    }

    /// Whether layout guessing was requested. Guessing is never rendered alongside an area.
    pub fn guess_layout(&self) -> bool {
        self.guess_layout
    }

    pub fn extraction_mode(&self) -> ExtractionMode {
        self.extraction_mode
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn silent(&self) -> bool {
        self.silent
    }

    pub fn use_line_returns(&self) -> bool {
        self.use_line_returns
    }

    pub fn columns(&self) -> Option<&[f32]> {
        self.columns.as_deref()
    }

    /// The output format as given by the caller, before normalisation.
    pub fn output_format(&self) -> Option<&str> {
        self.output_format.as_deref()
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }
}

/// Builder for [ExtractionRequest].
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionRequestBuilder {
    request: ExtractionRequest,
}

impl Default for ExtractionRequestBuilder {
    fn default() -> Self {
        Self {
            request: ExtractionRequest {
                input_path: None,
                batch_directory: None,
                page_selector: PageSelector::All,
                area_specs: Vec::new(),
                relative_area: false,
                guess_layout: true,
                extraction_mode: ExtractionMode::Default,
                password: None,
                silent: false,
                use_line_returns: false,
                columns: None,
                output_format: None,
                output_path: None,
            },
        }
    }
}

impl ExtractionRequestBuilder {
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.input_path = Some(path.into());
        self
    }

    pub fn batch_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.batch_directory = Some(path.into());
        self
    }

    pub fn pages(mut self, pages: impl Into<PageSelector>) -> Self {
        self.request.page_selector = pages.into();
        self
    }

    pub fn area(mut self, area: impl Into<AreaSpec>) -> Self {
        self.request.area_specs.push(area.into());
        self
    }

    pub fn areas<I, A>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AreaSpec>,
    {
        self.request
            .area_specs
            .extend(areas.into_iter().map(Into::into));
        self
    }

    pub fn relative_area(mut self, relative_area: bool) -> Self {
        self.request.relative_area = relative_area;
        self
    }

    pub fn guess_layout(mut self, guess_layout: bool) -> Self {
        self.request.guess_layout = guess_layout;
        self
    }

    pub fn extraction_mode(mut self, mode: ExtractionMode) -> Self {
        self.request.extraction_mode = mode;
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.request.password = Some(password.into());
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.request.silent = silent;
        self
    }

    pub fn use_line_returns(mut self, use_line_returns: bool) -> Self {
        self.request.use_line_returns = use_line_returns;
        self
    }

    pub fn columns(mut self, columns: impl Into<Vec<f32>>) -> Self {
        self.request.columns = Some(columns.into());
        self
    }

    /// Sets the output format by name. The name is validated when the request is rendered.
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.request.output_format = Some(format.into());
        self
    }

    pub fn format(self, format: OutputFormat) -> Self {
        self.output_format(format.to_string())
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.output_path = Some(path.into());
        self
    }

    pub fn build(self) -> ExtractionRequest {
        self.request
    }
}
