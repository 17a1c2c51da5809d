use std::path::Path;

use geo::Point;
use polars::frame::DataFrame;
use polars::prelude::{BooleanChunked, DataType, Float64Chunked, NewChunkedArray};

use crate::common;
use crate::error::{Result, TractError};

/// A tabular point-event dataset (crime incidents, test results, ...) with a
/// declared CRS. Filters return new sets; stages never mutate in place.
#[derive(Debug, Clone)]
pub struct IncidentSet {
    data: DataFrame,
    epsg: u32,
}

impl IncidentSet {
    pub fn new(data: DataFrame, epsg: u32) -> Self {
        Self { data, epsg }
    }

    /// Load incidents from a CSV file. The CSV carries no CRS metadata, so
    /// the caller declares the EPSG code of its coordinate columns.
    pub fn from_csv(path: &Path, epsg: u32) -> Result<Self> {
        Ok(Self::new(common::read_from_csv(path)?, epsg))
    }

    /// Load incidents from a CSV URL.
    #[cfg(feature = "download")]
    pub fn from_csv_url(url: &str, epsg: u32) -> Result<Self> {
        use anyhow::Context;
        let tmp = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .context("failed to create temp file")?;
        common::download_file(url, tmp.path())?;
        Self::from_csv(tmp.path(), epsg)
    }

    /// The underlying rows.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Number of rows.
    #[inline] pub fn len(&self) -> usize { self.data.height() }

    /// Check if there are no rows.
    #[inline] pub fn is_empty(&self) -> bool { self.data.height() == 0 }

    /// Declared EPSG code of the coordinate columns.
    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// Keep rows where `field` equals `value` (string comparison).
    pub fn filter_eq(&self, field: &str, value: &str) -> Result<Self> {
        let strings = self.data.column(field)
            .map_err(|_| TractError::missing_column("incident table", field))?
            .str()
            .map_err(|_| TractError::bad_column("incident table", field, "must be of type String"))?;

        let mask: Vec<bool> = strings.into_iter().map(|v| v == Some(value)).collect();
        Ok(Self::new(
            self.data.filter(&BooleanChunked::from_slice("mask".into(), &mask))?,
            self.epsg,
        ))
    }

    /// Keep rows where `field` is non-null.
    pub fn filter_not_null(&self, field: &str) -> Result<Self> {
        let column = self.data.column(field)
            .map_err(|_| TractError::missing_column("incident table", field))?;

        let mask = column.as_materialized_series().is_not_null();
        Ok(Self::new(self.data.filter(&mask)?, self.epsg))
    }

    /// Extract coordinates into a PointSet, row order preserved.
    ///
    /// Rows with null coordinates are an error here, not a silent drop:
    /// filter them out first with `filter_not_null` so row counts in any
    /// downstream report stay honest.
    pub fn points(&self, x_field: &str, y_field: &str) -> Result<PointSet> {
        let xs = numeric_column(&self.data, x_field)?;
        let ys = numeric_column(&self.data, y_field)?;

        let mut points = Vec::with_capacity(self.len());
        for (row, (x, y)) in xs.into_iter().zip(ys.into_iter()).enumerate() {
            let (Some(x), Some(y)) = (x, y) else {
                return Err(TractError::InvalidInput {
                    row,
                    x: x.unwrap_or(f64::NAN),
                    y: y.unwrap_or(f64::NAN),
                });
            };
            points.push(Point::new(x, y));
        }

        Ok(PointSet::new(points, self.epsg))
    }
}

fn numeric_column(df: &DataFrame, field: &str) -> Result<Float64Chunked> {
    let series = df.column(field)
        .map_err(|_| TractError::missing_column("incident table", field))?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|_| TractError::bad_column("incident table", field, "must be numeric"))?;
    Ok(series.f64()?.clone())
}

/// Points extracted from an incident set, tagged with their CRS.
/// A spatial join is only valid when this tag matches the polygon layer's.
#[derive(Debug, Clone)]
pub struct PointSet {
    points: Vec<Point<f64>>,
    epsg: u32,
}

impl PointSet {
    pub fn new(points: Vec<Point<f64>>, epsg: u32) -> Self {
        Self { points, epsg }
    }

    #[inline] pub fn len(&self) -> usize { self.points.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }

    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    #[inline] pub fn points(&self) -> &[Point<f64>] { &self.points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn make_set() -> IncidentSet {
        let df = DataFrame::new(vec![
            Column::new("kind".into(), vec![
                Some("HOMICIDE".to_string()),
                Some("THEFT".to_string()),
                Some("HOMICIDE".to_string()),
                None,
            ]),
            Column::new("longitude".into(), vec![Some(-87.62), Some(-87.65), None, Some(-87.70)]),
            Column::new("latitude".into(), vec![Some(41.88), Some(41.90), Some(41.85), None]),
        ]).unwrap();
        IncidentSet::new(df, 4326)
    }

    #[test]
    fn filter_eq_keeps_matching_rows_only() {
        let set = make_set().filter_eq("kind", "HOMICIDE").unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn filter_not_null_then_points_extracts_in_row_order() {
        let set = make_set()
            .filter_not_null("longitude").unwrap()
            .filter_not_null("latitude").unwrap();
        assert_eq!(set.len(), 2);

        let points = set.points("longitude", "latitude").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points.points()[0], Point::new(-87.62, 41.88));
        assert_eq!(points.epsg(), 4326);
    }

    #[test]
    fn points_with_null_coordinates_is_invalid_input() {
        let err = make_set().points("longitude", "latitude").unwrap_err();
        assert!(matches!(err, TractError::InvalidInput { row: 2, .. }));
    }

    #[test]
    fn missing_filter_field_is_a_schema_error() {
        let err = make_set().filter_eq("category", "x").unwrap_err();
        assert!(matches!(err, TractError::Schema { .. }));
    }
}
