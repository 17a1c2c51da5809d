use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use polars::{frame::DataFrame, prelude::Column};
use shapefile::{dbase::{FieldValue, Record}, Reader, Shape};

/// Reads all shapes and attribute records from a given `.shp` file path.
/// Shape order and record order are both file order and stay aligned.
pub(crate) fn read_from_shapefile(path: &Path) -> Result<(Vec<Shape>, Vec<Record>)> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("failed to open shapefile: {}", path.display()))?;

    let count = reader.shape_count()?;
    let mut shapes = Vec::with_capacity(count);
    let mut records = Vec::with_capacity(count);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("error reading shape+record")?;
        shapes.push(shape);
        records.push(record);
    }
    Ok((shapes, records))
}

/// Convert dbase records to a DataFrame. Column types are taken from the
/// first record: character fields become String columns, numeric fields
/// become f64 columns. Columns are emitted in sorted field-name order so
/// the schema is deterministic.
pub(crate) fn records_to_dataframe(records: &[Record]) -> Result<DataFrame> {
    let Some(first) = records.first() else {
        return Ok(DataFrame::empty());
    };

    let mut fields: Vec<String> = first.clone().into_iter().map(|(name, _)| name).collect();
    fields.sort();

    let mut columns = Vec::with_capacity(fields.len());
    for field in &fields {
        let column = match first.get(field) {
            Some(FieldValue::Numeric(_))
            | Some(FieldValue::Float(_))
            | Some(FieldValue::Integer(_))
            | Some(FieldValue::Double(_)) => Column::new(
                field.as_str().into(),
                records.iter().map(|r| numeric_field(r, field)).collect::<Vec<Option<f64>>>(),
            ),
            Some(FieldValue::Logical(_)) => Column::new(
                field.as_str().into(),
                records.iter().map(|r| logical_field(r, field)).collect::<Vec<Option<bool>>>(),
            ),
            _ => Column::new(
                field.as_str().into(),
                records.iter().map(|r| character_field(r, field)).collect::<Vec<Option<String>>>(),
            ),
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

fn numeric_field(record: &Record, field: &str) -> Option<f64> {
    match record.get(field) {
        Some(FieldValue::Numeric(n)) => *n,
        Some(FieldValue::Float(f)) => f.map(f64::from),
        Some(FieldValue::Integer(i)) => Some(f64::from(*i)),
        Some(FieldValue::Double(d)) => Some(*d),
        _ => None,
    }
}

fn logical_field(record: &Record, field: &str) -> Option<bool> {
    match record.get(field) {
        Some(FieldValue::Logical(b)) => *b,
        _ => None,
    }
}

fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(s)) => s.as_ref().map(|s| s.trim().to_string()),
        _ => None,
    }
}

/// Sniff the EPSG code from the `.prj` sidecar, if it exists and names a
/// datum we recognize. Returns None when unknown (callers default to 4269,
/// the usual datum for census geography).
pub(crate) fn epsg_from_prj(shp_path: &Path) -> Option<u32> {
    let wkt = fs::read_to_string(shp_path.with_extension("prj")).ok()?;
    if wkt.contains("NAD_1983") || wkt.contains("NAD83") || wkt.contains("North_American_1983") {
        Some(4269)
    } else if wkt.contains("WGS_1984") || wkt.contains("WGS84") || wkt.contains("WGS 84") {
        Some(4326)
    } else {
        None
    }
}
