pub mod count;
pub mod render;

use std::path::Path;

use anyhow::{bail, Context, Result};
use tractmap::{
    aggregate, assign, counts_to_dataframe, DuplicatePolicy, IncidentSet, MergeMode, PointSet,
    TractLayer,
};

use crate::cli::{Cli, PipelineArgs};

/// Load a tract layer, dispatching on the file extension.
fn load_tracts(path: &Path, id_field: &str) -> Result<TractLayer> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("shp") | Some("zip") => TractLayer::from_shapefile(path, id_field),
        Some("geojson") | Some("json") => TractLayer::from_geojson(path, id_field),
        other => bail!("unsupported tract format {other:?} (expected .shp, .zip, or .geojson)"),
    }
    .with_context(|| format!("failed to load tracts from {}", path.display()))
}

/// Parse repeated `--filter FIELD=VALUE` arguments.
fn parse_filters(filters: &[String]) -> Result<Vec<(&str, &str)>> {
    filters.iter()
        .map(|f| f.split_once('=')
            .with_context(|| format!("bad filter {f:?} (expected FIELD=VALUE)")))
        .collect()
}

/// The shared pipeline: load both inputs, filter, join points to tracts,
/// aggregate per-tract counts, and merge them onto the layer.
pub(crate) fn run_pipeline(cli: &Cli, args: &PipelineArgs) -> Result<(TractLayer, PointSet)> {
    if cli.verbose > 0 {
        eprintln!("[pipeline] loading tracts from {}", args.tracts.display());
    }
    let layer = load_tracts(&args.tracts, &args.id_field)?;

    if cli.verbose > 0 {
        eprintln!("[pipeline] loading incidents from {}", args.incidents.display());
    }
    let mut incidents = IncidentSet::from_csv(&args.incidents, args.epsg)
        .with_context(|| format!("failed to load incidents from {}", args.incidents.display()))?;
    let loaded = incidents.len();

    for (field, value) in parse_filters(&args.filter)? {
        incidents = incidents.filter_eq(field, value)?;
    }
    incidents = incidents
        .filter_not_null(&args.x_field)?
        .filter_not_null(&args.y_field)?;
    if cli.verbose > 0 {
        eprintln!("[pipeline] kept {} of {} incident rows after filtering", incidents.len(), loaded);
    }

    let points = incidents.points(&args.x_field, &args.y_field)?;
    let assigned = assign(&points, &layer)?;
    let (counts, report) = aggregate(&assigned, &layer);
    if cli.verbose > 0 {
        eprintln!(
            "[pipeline] joined {} points: {} matched, {} unmatched, {} ambiguous",
            report.total, report.matched, report.unmatched, report.ambiguous,
        );
    }

    let table = counts_to_dataframe(&counts, &args.count_field)?;
    let (merged, merge_report) = layer.merge(
        &table,
        "geo_id",
        "geo_id",
        MergeMode::Left,
        DuplicatePolicy::Error,
    )?;
    if cli.verbose > 1 {
        eprintln!(
            "[pipeline] merged counts: {} matched, {} base-only, {} incoming-only",
            merge_report.matched, merge_report.unmatched_base, merge_report.unmatched_incoming,
        );
    }

    Ok((merged, points))
}
