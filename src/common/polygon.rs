use anyhow::{bail, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile as shp;

/// Convert a shapefile shape to geo::MultiPolygon<f64>.
/// Only polygon shapes (and null placeholders) are accepted.
pub(crate) fn shape_to_multipolygon(shape: shp::Shape) -> Result<MultiPolygon<f64>> {
    match shape {
        shp::Shape::Polygon(p) => Ok(polygon_to_geo(&p)),
        shp::Shape::NullShape => Ok(MultiPolygon(Vec::new())),
        other => bail!("unsupported shape type: {:?}", other.shapetype()),
    }
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>.
/// Shapefiles store rings flat, each exterior followed by its holes;
/// the ring kind is taken from the explicit Outer/Inner tag.
pub(crate) fn polygon_to_geo(p: &shp::Polygon) -> MultiPolygon<f64> {
    /// Ensure first and last coords are the same for geo::LineString rings
    fn close_ring(mut coords: Vec<Coord<f64>>) -> LineString<f64> {
        if let Some(&first) = coords.first() {
            if coords.last() != Some(&first) {
                coords.push(first);
            }
        }
        LineString(coords)
    }

    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for ring in p.rings() {
        let coords = ring.points().iter()
            .map(|pt| Coord { x: pt.x, y: pt.y })
            .collect();
        let ls = close_ring(coords);

        match ring {
            shp::PolygonRing::Outer(_) => {
                // flush previous polygon
                if let Some(ext) = exterior.take() {
                    polys.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
                exterior = Some(ls);
            }
            shp::PolygonRing::Inner(_) => holes.push(ls),
        }
    }
    if let Some(ext) = exterior {
        polys.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polys)
}
