//! Collection of files written by a batch run.

use std::path::{Path, PathBuf};

use utils::fsutil;

use crate::{
    error::{ExtractionError, Result},
    request::OutputFormat,
};

/// Moves every `.<ext>` file that Tabula wrote beside the PDFs in `batch_dir` (at any depth) into
/// `output_dir`, keeping only the file name.
///
/// Returns the new paths of the moved files.
pub fn relocate_outputs(
    batch_dir: &Path,
    output_dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    if !batch_dir.is_dir() {
        return Err(ExtractionError::BatchDirectoryNotFound {
            path: batch_dir.to_path_buf(),
        });
    }
    if !output_dir.is_dir() {
        return Err(ExtractionError::OutputDirectoryNotFound {
            path: output_dir.to_path_buf(),
        });
    }

    let suffix = format!(".{}", format.extension());
    let moved = fsutil::move_files_with_suffix(batch_dir, output_dir, &suffix).map_err(|err| {
        ExtractionError::io(
            format!("moving {suffix} files from {batch_dir:?} to {output_dir:?}"),
            err,
        )
    })?;

    log::info!(
        "Moved {} {suffix} file(s) into {:?}.",
        moved.len(),
        output_dir
    );
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use tempfile::tempdir;

    use super::relocate_outputs;
    use crate::{error::ErrorKind, request::OutputFormat};

    #[gtest]
    fn test_moves_only_matching_files() -> anyhow::Result<()> {
        let batch = tempdir()?;
        let out = tempdir()?;
        fs::create_dir(batch.path().join("nested"))?;
        fs::write(batch.path().join("a.pdf"), "")?;
        fs::write(batch.path().join("a.csv"), "1,2")?;
        fs::write(batch.path().join("nested/b.csv"), "3,4")?;
        fs::write(batch.path().join("nested/b.json"), "[]")?;

        let moved = relocate_outputs(batch.path(), out.path(), OutputFormat::Csv)?;

        expect_that!(
            moved,
            unordered_elements_are![
                eq(&out.path().join("a.csv")),
                eq(&out.path().join("b.csv")),
            ]
        );
        expect_that!(fs::read_to_string(out.path().join("b.csv"))?, eq("3,4"));
        expect_that!(batch.path().join("a.csv").exists(), eq(false));
        expect_that!(batch.path().join("a.pdf").exists(), eq(true));
        expect_that!(batch.path().join("nested/b.json").exists(), eq(true));
        Ok(())
    }

    #[gtest]
    fn test_missing_directories_are_reported() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("missing");

        expect_that!(
            relocate_outputs(&missing, dir.path(), OutputFormat::Json).map_err(|e| e.kind()),
            err(eq(&ErrorKind::BatchDirectoryNotFound))
        );
        expect_that!(
            relocate_outputs(dir.path(), &missing, OutputFormat::Json).map_err(|e| e.kind()),
            err(eq(&ErrorKind::OutputDirectoryNotFound))
        );
        Ok(())
    }
}
