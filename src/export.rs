use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Write an export next to its destination, then move it into place.
///
/// A failed or interrupted export never leaves a half-written file at `path`.
pub fn write_export(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::Builder::new()
        .prefix(".timelog-export-")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;

    temp_file
        .write_all(contents)
        .context("Failed to write export")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to move export into {:?}", path))?;

    tracing::info!("Export written to {:?} ({} bytes)", path, contents.len());
    Ok(())
}
