//! Extracts tables from PDF files by running the Tabula command line tool.
//!
//! A caller describes one extraction with an [ExtractionRequest]. [render] validates it and turns
//! it into Tabula's arguments, and [Tabula] locates a runtime, assembles the full command line and
//! runs it, returning the captured [ExecutionOutput].

pub mod config;
pub mod error;
pub mod locate;
pub mod output;
pub mod platform;
pub mod postprocess;
pub mod render;
pub mod request;
pub mod runner;
mod tabula;

pub use config::TabulaConfig;
pub use error::{ErrorKind, ExtractionError, Result};
pub use output::{ExecutionOutput, Row, Table};
pub use render::{RenderedCommand, render};
pub use request::{
    AreaSpec, ExtractionMode, ExtractionRequest, ExtractionRequestBuilder, OutputFormat,
    PageSelector,
};
pub use runner::{CommandExecutor, Invocation, SubprocessExecutor};
pub use tabula::Tabula;
