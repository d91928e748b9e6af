use anyhow::{Context, Result};
use extraction::Tabula;

/// Runs the subcommand.
pub fn run(tabula: &Tabula) -> Result<()> {
    let tabula_version = tabula
        .version()
        .with_context(|| format!("querying version of {:?}", tabula.jar_archive()))?;
    println!("tabwrap {}", env!("CARGO_PKG_VERSION"));
    println!("{tabula_version}");
    Ok(())
}
