use std::fs::File;

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, SerWriter};

use crate::cli::{Cli, CountArgs};

pub fn run(cli: &Cli, args: &CountArgs) -> Result<()> {
    let (merged, _) = super::run_pipeline(cli, &args.pipeline)?;

    let mut table = merged.data()
        .select(["geo_id", args.pipeline.count_field.as_str()])?;

    match &args.output {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            CsvWriter::new(file).finish(&mut table)?;
            if cli.verbose > 0 {
                eprintln!("[count] wrote {} rows to {}", table.height(), path.display());
            }
        }
        _ => {
            CsvWriter::new(std::io::stdout()).finish(&mut table)?;
        }
    }

    Ok(())
}
