mod bins;
mod html;
mod palette;
mod style;
mod svg;

pub use bins::{BinStrategy, Bins};
pub use html::render_html;
pub use style::{OverlayLayer, RenderConfig};
pub use svg::render_svg;

use anyhow::{ensure, Context, Result};
use polars::prelude::DataType;

use crate::tract::TractLayer;

/// Numeric values of an attribute column, one per tract row, nulls kept.
pub(crate) fn field_values(layer: &TractLayer, field: &str) -> crate::Result<Vec<Option<f64>>> {
    use crate::error::TractError;

    let series = layer.data().column(field)
        .map_err(|_| TractError::missing_column("tract layer", field))?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|_| TractError::bad_column("tract layer", field, "must be numeric"))?;

    Ok(series.f64()?.into_iter().collect())
}

/// String values of an attribute column, one per tract row (hover labels).
pub(crate) fn label_values(layer: &TractLayer, field: &str) -> crate::Result<Vec<Option<String>>> {
    use crate::error::TractError;

    let series = layer.data().column(field)
        .map_err(|_| TractError::missing_column("tract layer", field))?
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|_| TractError::bad_column("tract layer", field, "must be printable"))?;

    Ok(series.str()?.into_iter().map(|v| v.map(String::from)).collect())
}

/// Shared setup for both renderers: bin the fill field and color every row.
/// Rows with a null fill value get `na_color`; no data is not zero and is
/// never folded into the lowest bin.
pub(crate) fn styled_fills(
    layer: &TractLayer,
    config: &RenderConfig,
) -> Result<(Bins, Vec<String>, Vec<String>)> {
    let values = field_values(layer, &config.fill_field)?;
    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    ensure!(
        !observed.is_empty(),
        "fill field {:?} has no non-null values to bin",
        config.fill_field
    );

    let bins = Bins::compute(&observed, config.bins, config.strategy)?;
    let colors = palette::palette_colors(&config.palette, bins.count())?;
    let fills = values.iter()
        .map(|v| match v {
            Some(v) => colors[bins.classify(*v)].clone(),
            None => config.na_color.clone(),
        })
        .collect();

    Ok((bins, colors, fills))
}

/// Per-row hover labels: the configured label field, or the tract id.
pub(crate) fn hover_labels(layer: &TractLayer, config: &RenderConfig) -> Result<Vec<String>> {
    let labels = match &config.label_field {
        Some(field) => label_values(layer, field)
            .with_context(|| format!("label field {field:?}"))?,
        None => Vec::new(),
    };

    Ok(layer.geo_ids().iter().enumerate()
        .map(|(i, id)| {
            labels.get(i)
                .and_then(|l| l.clone())
                .unwrap_or_else(|| id.as_str().to_string())
        })
        .collect())
}
