use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::CsvReader};

/// Reads a CSV file from `path` into a Polars DataFrame.
pub(crate) fn read_from_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("failed to open CSV: {}", path.display()))?;
    let df = CsvReader::new(file)
        .finish()
        .with_context(|| format!("failed to parse CSV: {}", path.display()))?;
    Ok(df)
}
