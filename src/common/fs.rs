use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::ZipArchive;

/// Extracts the given `.zip` file to the target directory.
pub(crate) fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(zip_path)
        .with_context(|| format!("failed to open {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive {}", zip_path.display()))?;

    archive
        .extract(dest_dir)
        .with_context(|| format!("failed to extract {} to {}", zip_path.display(), dest_dir.display()))?;

    Ok(())
}

/// Locate the first file with the given extension under `dir` (recursive).
pub(crate) fn find_by_extension(dir: &Path, ext: &str) -> Result<PathBuf> {
    walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .find(|path| path.extension().and_then(|e| e.to_str()) == Some(ext))
        .with_context(|| format!("no .{} file found under {}", ext, dir.display()))
}
