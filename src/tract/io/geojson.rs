use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use polars::frame::DataFrame;
use polars::prelude::Column;
use serde_json::{Map, Value};

use crate::common;
use crate::error::Result;
use crate::tract::TractLayer;

impl TractLayer {
    /// Load a tract layer from a GeoJSON file (RFC 7946 FeatureCollection of
    /// Polygon/MultiPolygon features).
    pub fn from_geojson(path: &Path, id_field: &str) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_geojson_bytes(&bytes, id_field)
    }

    /// Load a tract layer from a GeoJSON URL.
    #[cfg(feature = "download")]
    pub fn from_geojson_url(url: &str, id_field: &str) -> Result<Self> {
        let bytes = common::fetch_bytes(url)?;
        Self::from_geojson_bytes(&bytes, id_field)
    }

    /// Load a tract layer from GeoJSON bytes. Feature order becomes layer
    /// order; the CRS defaults to 4326 per RFC 7946 unless a legacy `crs`
    /// member names another code.
    pub fn from_geojson_bytes(bytes: &[u8], id_field: &str) -> Result<Self> {
        let (geoms, properties, epsg) = common::read_feature_collection(bytes)?;

        let mut df = properties_to_dataframe(&properties)?;
        let ids = super::take_id_column(&mut df, id_field, "GeoJSON properties")?;

        TractLayer::new(ids, df, geoms, Some(epsg.unwrap_or(4326)))
    }
}

/// Flatten feature property maps into typed columns. The type of a column
/// is taken from its first non-null value: numbers become f64, booleans
/// bool, everything else String.
fn properties_to_dataframe(properties: &[Map<String, Value>]) -> Result<DataFrame> {
    let keys: BTreeSet<&String> = properties.iter().flat_map(|props| props.keys()).collect();

    let mut columns = Vec::with_capacity(keys.len());
    for key in keys {
        let first = properties.iter()
            .filter_map(|props| props.get(key))
            .find(|v| !v.is_null());

        let column = match first {
            Some(Value::Number(_)) => Column::new(
                key.as_str().into(),
                properties.iter()
                    .map(|props| props.get(key).and_then(Value::as_f64))
                    .collect::<Vec<Option<f64>>>(),
            ),
            Some(Value::Bool(_)) => Column::new(
                key.as_str().into(),
                properties.iter()
                    .map(|props| props.get(key).and_then(Value::as_bool))
                    .collect::<Vec<Option<bool>>>(),
            ),
            _ => Column::new(
                key.as_str().into(),
                properties.iter()
                    .map(|props| match props.get(key) {
                        None | Some(Value::Null) => None,
                        Some(Value::String(s)) => Some(s.clone()),
                        Some(other) => Some(other.to_string()),
                    })
                    .collect::<Vec<Option<String>>>(),
            ),
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] },
                "properties": { "GEOID": "17031010100", "name": "Tract 101", "poverty": 21.0 }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,1],[1,0]]] },
                "properties": { "GEOID": "17031010201", "name": "Tract 102.01", "poverty": null }
            }
        ]
    }"#;

    #[test]
    fn loads_layer_in_feature_order() {
        let layer = TractLayer::from_geojson_bytes(TRACTS.as_bytes(), "GEOID").unwrap();

        assert_eq!(layer.len(), 2);
        assert_eq!(layer.geo_ids()[0].as_str(), "17031010100");
        assert_eq!(layer.geo_ids()[1].as_str(), "17031010201");
        assert_eq!(layer.epsg(), 4326);

        // id column is renamed to the canonical geo_id
        assert!(layer.field_names().iter().any(|f| f == "geo_id"));
        let poverty: Vec<Option<f64>> =
            layer.data().column("poverty").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(poverty, vec![Some(21.0), None]);
    }

    #[test]
    fn missing_id_field_is_a_schema_error() {
        let err = TractLayer::from_geojson_bytes(TRACTS.as_bytes(), "TRACTCE").unwrap_err();
        assert!(matches!(err, crate::error::TractError::Schema { .. }));
    }
}
