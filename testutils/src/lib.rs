//! Utilities used in tests in multiple crates within the workspace.

use std::path::{Path, PathBuf};

/// Returns the first error of type `E` in the cause chain of `err`.
pub fn find_cause<E>(err: &anyhow::Error) -> Option<&E>
where
    E: std::error::Error + 'static,
{
    err.chain().find_map(|cause| cause.downcast_ref::<E>())
}

/// Writes an executable shell script named `name` into `dir`, standing in for a runtime binary
/// in tests. Returns its path.
#[cfg(unix)]
pub fn write_fake_runtime(dir: &Path, name: &str, body: &str) -> anyhow::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    let mut perms = std::fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms)?;
    Ok(path)
}

/// Temporary directory containing a placeholder PDF and JAR for tests that need existing paths.
pub struct Fixtures {
    pub dir: tempfile::TempDir,
    pub pdf: PathBuf,
    pub jar: PathBuf,
}

impl Fixtures {
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let pdf = dir.path().join("sample.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n%%EOF\n")?;
        let jar = dir.path().join("tabula.jar");
        std::fs::write(&jar, b"PK")?;
        Ok(Self { dir, pdf, jar })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
