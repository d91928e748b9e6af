//! Captured output of a Tabula run, and its interpretation as tables.

use std::{
    borrow::Cow,
    ops::{Deref, DerefMut},
    path::PathBuf,
};

use serde::Deserialize;

use crate::{
    error::{ExtractionError, Result},
    request::OutputFormat,
};

/// Result of a successful Tabula run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExecutionOutput {
    pub stdout: String,
    /// Diagnostics written by Tabula. Non-empty on success when Tabula emitted warnings.
    pub stderr: String,
    pub format: OutputFormat,
    /// Set when Tabula was asked to write to a file instead of standard output.
    pub output_path: Option<PathBuf>,
}

impl ExecutionOutput {
    /// Parses the extracted data into tables.
    ///
    /// Reads from the output file when one was requested, otherwise from the captured standard
    /// output. JSON output yields one table per table found by Tabula; CSV and TSV output yield a
    /// single table holding every row.
    pub fn tables(&self) -> Result<Vec<Table>> {
        let content = self.content()?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        match self.format {
            OutputFormat::Json => parse_json(&content),
            OutputFormat::Csv => parse_delimited(&content, b',').map(|table| vec![table]),
            OutputFormat::Tsv => parse_delimited(&content, b'\t').map(|table| vec![table]),
        }
    }

    fn content(&self) -> Result<Cow<'_, str>> {
        match &self.output_path {
            Some(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|err| ExtractionError::io(format!("reading output file {path:?}"), err)),
            None => Ok(Cow::Borrowed(&self.stdout)),
        }
    }
}

/// A sequence of extracted tables, as written by Tabula's JSON format.
#[derive(Deserialize, Debug)]
#[serde(transparent)]
pub struct JsonTableSet(pub Vec<JsonTable>);

/// A single extracted table, positioned on its page in PDF points.
#[derive(Deserialize, Debug)]
pub struct JsonTable {
    #[serde(default)]
    pub extraction_method: String,
    #[serde(default)]
    pub page_number: i32,
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub bottom: f32,
    pub data: Vec<JsonRow>,
}

#[derive(Deserialize, Debug)]
#[serde(transparent)]
pub struct JsonRow(pub Vec<JsonCell>);

#[derive(Deserialize, Debug)]
pub struct JsonCell {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    pub text: String,
}

/// Extracted table as rows of cell text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table(pub Vec<Row>);

impl Deref for Table {
    type Target = Vec<Row>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Table {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<JsonTable> for Table {
    fn from(value: JsonTable) -> Self {
        Table(value.data.into_iter().map(Row::from).collect())
    }
}

impl<R: Into<Row>> FromIterator<R> for Table {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        Table(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Row(pub Vec<String>);

impl Deref for Row {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Row {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<JsonRow> for Row {
    fn from(value: JsonRow) -> Self {
        Row(value.0.into_iter().map(|cell| cell.text).collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Row(iter.into_iter().map(Into::into).collect())
    }
}

fn parse_json(content: &str) -> Result<Vec<Table>> {
    let table_set: JsonTableSet =
        serde_json::from_str(content).map_err(|err| ExtractionError::OutputParse {
            message: format!("JSON: {err}"),
        })?;
    Ok(table_set.0.into_iter().map(Table::from).collect())
}

fn parse_delimited(content: &str, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().collect::<Row>())
                .map_err(|err| ExtractionError::OutputParse {
                    message: err.to_string(),
                })
        })
        .collect::<Result<Vec<Row>>>()
        .map(Table)
}
