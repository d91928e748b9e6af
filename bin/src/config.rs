use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use extraction::{TabulaConfig, config::DEFAULT_JAR_NAME};

use crate::distpaths;

const XDG_PREFIX: &str = "tabwrap";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// CLI arguments relating to [TabulaConfig].
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// Path to a YAML configuration file. Defaults to tabwrap/config.yaml in the XDG
    /// configuration directories, when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the Tabula JAR archive. Defaults to tabula.jar beside this program, when present.
    #[arg(long)]
    jar: Option<PathBuf>,

    /// Extra directory to search for the Java runtime, after PATH. May be repeated.
    #[arg(long = "bin-dir")]
    bin_dirs: Vec<PathBuf>,

    /// Terminate Tabula if it runs for longer than this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl ConfigArgs {
    /// Loads the configuration and applies any overrides given on the command line.
    pub fn resolve(&self) -> Result<TabulaConfig> {
        let xdg_config = xdg::BaseDirectories::with_prefix(XDG_PREFIX)
            .find_config_file(CONFIG_FILE_NAME);
        self.resolve_from(xdg_config.as_deref(), distpaths::tabula_jar())
    }

    fn resolve_from(
        &self,
        default_config: Option<&Path>,
        bundled_jar: Option<PathBuf>,
    ) -> Result<TabulaConfig> {
        let config_path = self.config.as_deref().or(default_config);
        let mut config = match config_path {
            Some(path) => TabulaConfig::from_yaml_path(path)
                .with_context(|| format!("loading configuration from {path:?}"))?,
            None => TabulaConfig::default(),
        };

        if let Some(jar) = &self.jar {
            config.jar_archive = jar.clone();
        } else if config.jar_archive == Path::new(DEFAULT_JAR_NAME)
            && let Some(jar) = bundled_jar
        {
            config.jar_archive = jar;
        }
        config.bin_dirs.extend(self.bin_dirs.iter().cloned());
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }

        log::debug!("Using configuration {config:?}.");
        Ok(config)
    }
}
