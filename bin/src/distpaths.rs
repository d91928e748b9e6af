use std::path::PathBuf;

/// Returns the path to a Tabula JAR file shipped beside the executable, if there is one.
pub fn tabula_jar() -> Option<PathBuf> {
    beside_executable(extraction::config::DEFAULT_JAR_NAME)
}

fn beside_executable(file_name: &str) -> Option<PathBuf> {
    let mut path = std::env::current_exe().ok()?;
    path.set_file_name(file_name);
    path.is_file().then_some(path)
}
