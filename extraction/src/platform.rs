use std::ffi::OsString;

use serde::{Deserialize, Serialize};

/// Operating system family, resolved once and handed to the runner.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// The platform this process was built for.
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            _ => Platform::Other,
        }
    }

    /// Whether the JVM must be told to run headless to avoid GUI initialisation.
    pub fn requires_headless(self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

pub const DEFAULT_HEAP_SIZE: &str = "256m";
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Options passed to the JVM ahead of the `-jar` argument.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JvmOptions {
    pub heap_size: String,
    pub headless: bool,
    pub utf8_encoding: bool,
}

impl JvmOptions {
    /// Derives the options for `platform` and the caller's configured text `encoding`.
    pub fn for_platform(platform: Platform, encoding: &str, heap_size: &str) -> Self {
        Self {
            heap_size: heap_size.to_string(),
            headless: platform.requires_headless(),
            utf8_encoding: is_utf8(encoding),
        }
    }

    /// Renders the options in the order the JVM expects them.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(3);
        if !self.heap_size.is_empty() {
            args.push(format!("-Xmx{}", self.heap_size).into());
        }
        if self.headless {
            args.push("-Djava.awt.headless=true".into());
        }
        if self.utf8_encoding {
            args.push("-Dfile.encoding=UTF8".into());
        }
        args
    }
}

impl Default for JvmOptions {
    fn default() -> Self {
        Self::for_platform(Platform::current(), DEFAULT_ENCODING, DEFAULT_HEAP_SIZE)
    }
}

fn is_utf8(encoding: &str) -> bool {
    let normalised: String = encoding
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect();
    normalised.eq_ignore_ascii_case("utf8")
}
