use std::collections::HashMap;

use anyhow::anyhow;
use geo::{MultiPolygon, Rect};
use polars::frame::DataFrame;
use polars::prelude::Column;

use crate::error::{Result, TractError};
use crate::geom::Geometries;

use super::TractId;

/// An ordered census-tract layer.
///
/// Geometry and attributes are two separate immutable structures, aligned by
/// row position and joined to external data only through the tract
/// identifier. The attribute table always carries a `geo_id` column and a
/// persisted `idx` ordinal; every merge re-sorts on `idx` so row order stays
/// equal to file order no matter what the join primitive does internally.
#[derive(Debug, Clone)]
pub struct TractLayer {
    geo_ids: Vec<TractId>,
    index: HashMap<TractId, u32>, // Map between tract ids and row positions.
    data: DataFrame,
    geoms: Geometries,
}

impl TractLayer {
    /// Build a layer from parallel ids, attributes, and shapes (file order).
    ///
    /// `attributes` may already contain a `geo_id` String column (loaders
    /// rename the id field to `geo_id`); otherwise one is inserted from
    /// `ids`. Duplicate tract ids are rejected.
    pub fn new(
        ids: Vec<String>,
        attributes: DataFrame,
        shapes: Vec<MultiPolygon<f64>>,
        epsg: Option<u32>,
    ) -> Result<Self> {
        if ids.len() != shapes.len() {
            return Err(TractError::DataSource(anyhow!(
                "layer misalignment: {} ids but {} shapes", ids.len(), shapes.len()
            )));
        }
        if attributes.width() > 0 && attributes.height() != ids.len() {
            return Err(TractError::DataSource(anyhow!(
                "layer misalignment: {} ids but {} attribute rows", ids.len(), attributes.height()
            )));
        }

        let geo_ids: Vec<TractId> = ids.iter().map(|id| TractId::new(id)).collect();
        let mut index = HashMap::with_capacity(geo_ids.len());
        for (i, geo_id) in geo_ids.iter().enumerate() {
            if index.insert(geo_id.clone(), i as u32).is_some() {
                return Err(TractError::DuplicateKey {
                    column: "geo_id".to_string(),
                    key: geo_id.as_str().to_string(),
                });
            }
        }

        let mut data = attributes;
        if data.get_column_names().iter().any(|c| c.as_str() == "idx") {
            return Err(TractError::bad_column("tract attributes", "idx", "is reserved"));
        }
        if data.width() == 0 {
            data = DataFrame::new(vec![Column::new("geo_id".into(), &ids)])?;
        } else if !data.get_column_names().iter().any(|c| c.as_str() == "geo_id") {
            data.insert_column(0, Column::new("geo_id".into(), &ids))?;
        }
        let data = data.with_row_index("idx".into(), None)?;

        Ok(Self {
            geo_ids,
            index,
            data,
            geoms: Geometries::new(&shapes, epsg),
        })
    }

    /// Reassemble a layer from already-validated parts (merge output).
    pub(super) fn from_parts(
        geo_ids: Vec<TractId>,
        index: HashMap<TractId, u32>,
        data: DataFrame,
        geoms: Geometries,
    ) -> Self {
        Self { geo_ids, index, data, geoms }
    }

    /// Number of tracts.
    #[inline] pub fn len(&self) -> usize { self.geo_ids.len() }

    /// Check if the layer has no tracts.
    #[inline] pub fn is_empty(&self) -> bool { self.geo_ids.is_empty() }

    /// Tract ids in file order.
    #[inline] pub fn geo_ids(&self) -> &[TractId] { &self.geo_ids }

    /// Map from tract id to row position.
    #[inline] pub fn index(&self) -> &HashMap<TractId, u32> { &self.index }

    /// The attribute table (includes `geo_id` and the `idx` ordinal).
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Tract geometries, aligned with `geo_ids` by position.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { self.geoms.shapes() }

    /// EPSG code of the geometry CRS (4269 if the source declared none).
    #[inline] pub fn epsg(&self) -> u32 { self.geoms.epsg() }

    /// Bounding rectangle of all tract geometries.
    #[inline] pub fn bounds(&self) -> Option<Rect<f64>> { self.geoms.bounds() }

    /// Attribute column names.
    pub fn field_names(&self) -> Vec<String> {
        self.data.get_column_names().iter().map(|c| c.as_str().to_string()).collect()
    }

    #[inline] pub(crate) fn geoms(&self) -> &Geometries { &self.geoms }
}
