use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ExtractionError, Result},
    locate::DEFAULT_RUNTIME_BINARY,
    platform::{DEFAULT_ENCODING, DEFAULT_HEAP_SIZE, JvmOptions, Platform},
};

pub const DEFAULT_JAR_NAME: &str = "tabula.jar";

/// Settings shared by every run made through a [crate::Tabula].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TabulaConfig {
    /// Location of the Tabula JAR archive.
    pub jar_archive: PathBuf,
    /// Directories searched for the runtime after the process search path.
    pub bin_dirs: Vec<PathBuf>,
    /// Explicit runtime binary. Skips searching when set.
    pub runtime: Option<PathBuf>,
    /// Name of the runtime binary to search for.
    pub runtime_binary: String,
    pub encoding: String,
    /// JVM maximum heap size, e.g. `256m`.
    pub heap_size: String,
    pub timeout_secs: Option<u64>,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            jar_archive: PathBuf::from(DEFAULT_JAR_NAME),
            bin_dirs: Vec::new(),
            runtime: None,
            runtime_binary: DEFAULT_RUNTIME_BINARY.to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            heap_size: DEFAULT_HEAP_SIZE.to_string(),
            timeout_secs: None,
        }
    }
}

impl TabulaConfig {
    /// Loads configuration from a YAML file. Absent fields take their defaults.
    pub fn from_yaml_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| ExtractionError::io(format!("opening configuration {path:?}"), err))?;
        let config: Self =
            serde_yaml_ng::from_reader(file).map_err(|err| ExtractionError::Config {
                message: format!("parsing {path:?}: {err}"),
            })?;
        log::debug!("Loaded configuration from {path:?}.");
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|err| ExtractionError::Config {
            message: err.to_string(),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn jvm_options(&self, platform: Platform) -> JvmOptions {
        JvmOptions::for_platform(platform, &self.encoding, &self.heap_size)
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use googletest::prelude::*;

    use super::TabulaConfig;
    use crate::error::ErrorKind;

    #[gtest]
    fn test_empty_document_gives_defaults() -> anyhow::Result<()> {
        let config = TabulaConfig::from_yaml_str("{}")?;

        expect_that!(config, eq(&TabulaConfig::default()));
        expect_that!(config.runtime_binary, eq("java"));
        expect_that!(config.timeout(), none());
        Ok(())
    }

    #[gtest]
    fn test_fields_are_read_from_yaml_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "jar_archive: /opt/tabula/tabula.jar\n\
             bin_dirs: [/opt/jdk/bin]\n\
             heap_size: 1g\n\
             timeout_secs: 90\n",
        )?;

        let config = TabulaConfig::from_yaml_path(&path)?;

        expect_that!(
            config.jar_archive,
            eq(&PathBuf::from("/opt/tabula/tabula.jar"))
        );
        expect_that!(config.bin_dirs, eq(&vec![PathBuf::from("/opt/jdk/bin")]));
        expect_that!(config.heap_size, eq("1g"));
        expect_that!(config.encoding, eq("UTF-8"));
        expect_that!(config.timeout(), some(eq(Duration::from_secs(90))));
        Ok(())
    }

    #[gtest]
    fn test_unknown_field_is_rejected() {
        expect_that!(
            TabulaConfig::from_yaml_str("jar: x.jar\n").map_err(|e| e.kind()),
            err(eq(&ErrorKind::Config))
        );
    }

    #[gtest]
    fn test_missing_file_is_io_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        expect_that!(
            TabulaConfig::from_yaml_path(&dir.path().join("absent.yaml")).map_err(|e| e.kind()),
            err(eq(&ErrorKind::Io))
        );
        Ok(())
    }
}
