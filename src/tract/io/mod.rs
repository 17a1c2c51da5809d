mod geojson;
mod shp;

use anyhow::anyhow;
use polars::frame::DataFrame;

use crate::error::{Result, TractError};

/// Pull the unique-id column out of a loaded attribute table and rename it
/// to the canonical `geo_id`. Null ids are a loader-side defect.
pub(super) fn take_id_column(
    df: &mut DataFrame,
    id_field: &str,
    table: &'static str,
) -> Result<Vec<String>> {
    let ids = df.column(id_field)
        .map_err(|_| TractError::missing_column(table, id_field))?
        .str()
        .map_err(|_| TractError::bad_column(table, id_field, "must be of type String"))?
        .into_iter()
        .enumerate()
        .map(|(row, id)| {
            id.map(str::to_string)
                .ok_or_else(|| TractError::DataSource(anyhow!("null tract id at row {row}")))
        })
        .collect::<Result<Vec<_>>>()?;

    if id_field != "geo_id" {
        df.rename(id_field, "geo_id".into())?;
    }
    Ok(ids)
}
