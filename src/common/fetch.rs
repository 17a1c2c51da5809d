use std::io::copy;
use std::path::Path;

use anyhow::{Context, Result};

/// Download `url` to `dest`, staging through a temp file so a failed
/// transfer never leaves a truncated file behind.
pub fn download_file(url: &str, dest: &Path) -> Result<()> {
    let dir = dest.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;

    let mut response = reqwest::blocking::get(url)
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("server rejected {url}"))?;

    copy(&mut response, tmp.as_file_mut())
        .with_context(|| format!("failed to write {url} to disk"))?;
    tmp.persist(dest)
        .with_context(|| format!("failed to move download into place at {}", dest.display()))?;

    Ok(())
}

/// Fetch `url` fully into memory.
pub(crate) fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("server rejected {url}"))?;

    Ok(response.bytes().context("failed to read response body")?.to_vec())
}
