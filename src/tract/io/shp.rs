use std::path::Path;

use anyhow::Context;

use crate::common;
use crate::error::Result;
use crate::tract::TractLayer;

impl TractLayer {
    /// Load a tract layer from a `.shp` file or a zipped shapefile.
    /// `id_field` names the dbase attribute holding the unique tract GEOID
    /// (e.g. "GEOID20" for TIGER tract files).
    pub fn from_shapefile(path: &Path, id_field: &str) -> Result<Self> {
        if path.extension().and_then(|e| e.to_str()) == Some("zip") {
            let dir = tempfile::tempdir().context("failed to create temp dir")?;
            common::extract_zip(path, dir.path())?;
            let shp = common::find_by_extension(dir.path(), "shp")?;
            return load(&shp, id_field);
        }
        load(path, id_field)
    }
}

fn load(path: &Path, id_field: &str) -> Result<TractLayer> {
    let (shapes, records) = common::read_from_shapefile(path)?;

    let mut df = common::records_to_dataframe(&records)?;
    let ids = super::take_id_column(&mut df, id_field, "shapefile attributes")?;

    let geoms = shapes.into_iter()
        .map(common::shape_to_multipolygon)
        .collect::<anyhow::Result<Vec<_>>>()
        .with_context(|| format!("error converting shapes in {}", path.display()))?;

    TractLayer::new(ids, df, geoms, common::epsg_from_prj(path))
}
