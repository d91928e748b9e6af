use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::error::{ExtractionError, Result};

pub const DEFAULT_RUNTIME_BINARY: &str = "java";

/// Finds a runtime able to execute the Tabula archive.
///
/// The process search path is tried first, followed by the extra directories in order.
#[derive(Clone, Debug)]
pub struct RuntimeLocator {
    binary_name: String,
    extra_dirs: Vec<PathBuf>,
    search_path: Option<OsString>,
}

impl RuntimeLocator {
    pub fn new(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
            extra_dirs: Vec::new(),
            search_path: None,
        }
    }

    pub fn with_extra_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.extra_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Overrides the search path used instead of the `PATH` environment variable.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Returns the absolute path of the runtime binary.
    pub fn locate(&self) -> Result<PathBuf> {
        let dirs = self.search_dirs();
        let not_found = || ExtractionError::RuntimeNotFound {
            binary: self.binary_name.clone(),
            searched: dirs
                .iter()
                .map(|dir| dir.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        };

        if dirs.is_empty() {
            return Err(not_found());
        }
        let joined = std::env::join_paths(&dirs).map_err(|err| ExtractionError::Config {
            message: format!("runtime search directory cannot be used: {err}"),
        })?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        match which::which_in(&self.binary_name, Some(joined), cwd) {
            Ok(path) => {
                log::debug!("Located runtime {:?} at {:?}.", self.binary_name, path);
                Ok(path)
            }
            Err(err) => {
                log::debug!("Runtime {:?} not found: {err}", self.binary_name);
                Err(not_found())
            }
        }
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        let search_path = self
            .search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))
            .unwrap_or_default();
        std::env::split_paths(&search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .chain(self.extra_dirs.iter().cloned())
            .collect()
    }
}

impl Default for RuntimeLocator {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_BINARY)
    }
}

/// Locates `binary_name` on the process search path and then in `extra_dirs`.
pub fn locate(binary_name: &str, extra_dirs: &[PathBuf]) -> Result<PathBuf> {
    RuntimeLocator::new(binary_name)
        .with_extra_dirs(extra_dirs.iter().cloned())
        .locate()
}

/// Accepts an explicitly configured runtime path, which must be an existing file.
pub fn explicit_runtime(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(ExtractionError::RuntimeNotFound {
            binary: path.display().to_string(),
            searched: "explicitly configured path".to_string(),
        })
    }
}
