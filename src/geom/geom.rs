use geo::{BoundingRect, Coord, MultiPolygon, Rect};
use rstar::{RTree, AABB};

use crate::geom::BoundingBox;

/// Geometries is an ordered collection of MultiPolygons with a spatial index
/// for point-location candidate queries. Order is file order and is never
/// changed after construction; callers align attribute rows by position.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    epsg: Option<u32>, // EPSG code, if known
}

impl Geometries {
    /// Construct a Geometries store from a slice of MultiPolygons.
    pub(crate) fn new(polygons: &[MultiPolygon<f64>], epsg: Option<u32>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                polygons.iter().enumerate()
                    .filter_map(|(i, polygon)| polygon.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            shapes: polygons.to_vec(),
            epsg,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub(crate) fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Get the EPSG code, or default to 4269 (NAD83 lon/lat) if unknown.
    #[inline] pub(crate) fn epsg(&self) -> u32 { self.epsg.unwrap_or(4269) }

    /// Indices of shapes whose bounding box contains (x, y), ascending so
    /// that ties resolve in dataset order.
    pub(crate) fn candidates(&self, x: f64, y: f64) -> Vec<usize> {
        let mut idxs: Vec<usize> = self.rtree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .map(|b| b.idx())
            .collect();
        idxs.sort_unstable();
        idxs
    }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|polygon| polygon.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }

    /// New store keeping only the shapes at `keep` (given in base order).
    pub(crate) fn subset(&self, keep: &[usize]) -> Self {
        let shapes: Vec<MultiPolygon<f64>> = keep.iter().map(|&i| self.shapes[i].clone()).collect();
        Self::new(&shapes, self.epsg)
    }
}
