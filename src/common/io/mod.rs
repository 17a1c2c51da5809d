mod csv;
mod geojson;
mod shp;

pub(crate) use csv::*;
pub(crate) use geojson::*;
pub(crate) use shp::*;
