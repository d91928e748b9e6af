use std::{
    io,
    path::{Path, PathBuf},
};

/// Moves every file under `src_dir` (recursively) whose file name ends with `suffix` into
/// `dest_dir`, keeping only the file name. Returns the destination paths in the order they were
/// moved.
///
/// Files that would land on themselves are skipped.
pub fn move_files_with_suffix(
    src_dir: &Path,
    dest_dir: &Path,
    suffix: &str,
) -> io::Result<Vec<PathBuf>> {
    let mut moved = Vec::new();

    for dir_entry in walkdir::WalkDir::new(src_dir)
        .follow_links(false)
        .same_file_system(true)
        .sort_by_file_name()
    {
        let dir_entry = dir_entry.map_err(io::Error::other)?;
        if !dir_entry.file_type().is_file() {
            continue;
        }

        let file_name = dir_entry.file_name();
        let matches = file_name
            .to_str()
            .map(|name| name.ends_with(suffix))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let dest_path = dest_dir.join(file_name);
        if dest_path == dir_entry.path() {
            continue;
        }

        move_file(dir_entry.path(), &dest_path)?;
        log::debug!("Moved {:?} to {:?}.", dir_entry.path(), dest_path);
        moved.push(dest_path);
    }

    Ok(moved)
}

/// Renames `from` to `to`, falling back to copy and remove when a rename is not possible (e.g.
/// across filesystems).
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            log::debug!("Rename {from:?} -> {to:?} failed ({rename_err}), copying instead.");
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}
