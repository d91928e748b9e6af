use std::{path::PathBuf, time::Duration};

/// Errors raised while validating, rendering or running a Tabula extraction.
///
/// Validation errors are always raised before any process is spawned.
#[derive(Debug, thiserror::Error, strum_macros::EnumDiscriminants)]
#[strum_discriminants(name(ErrorKind), derive(Hash, strum_macros::Display))]
pub enum ExtractionError {
    #[error("invalid output format {value:?}, expected one of CSV, TSV, JSON")]
    InvalidFormat { value: String },

    #[error("input PDF {path:?} does not exist")]
    InputNotFound { path: PathBuf },

    #[error("input PDF {path:?} is not readable: {source}")]
    InputNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("batch directory {path:?} does not exist")]
    BatchDirectoryNotFound { path: PathBuf },

    #[error("output directory {path:?} does not exist")]
    OutputDirectoryNotFound { path: PathBuf },

    #[error("request has neither an input PDF nor a batch directory")]
    MissingSource,

    #[error("request has both an input PDF and a batch directory")]
    AmbiguousSource,

    #[error("could not find {binary:?} on the search path ({searched})")]
    RuntimeNotFound { binary: String, searched: String },

    #[error("Tabula archive {path:?} does not exist")]
    ArchiveNotFound { path: PathBuf },

    #[error("failed to start {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tabula exited with status {}: {stderr}", display_status(.status))]
    ExternalToolFailed { status: Option<i32>, stderr: String },

    #[error("Tabula did not finish within {after:?} and was terminated")]
    Timeout { after: Duration },

    #[error("parsing Tabula output: {message}")]
    OutputParse { message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl ExtractionError {
    /// Returns the fieldless classification of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from(self)
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

fn display_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "<terminated by signal>".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ExtractionError>;
