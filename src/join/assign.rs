use geo::Intersects;

use crate::error::{Result, TractError};
use crate::incident::PointSet;
use crate::tract::{TractId, TractLayer};

/// Per-point tract assignments, one entry per input point in input order.
#[derive(Debug, Clone)]
pub struct Assignments {
    slots: Vec<Option<TractId>>,
    ambiguous: usize,
}

impl Assignments {
    /// Number of input points.
    #[inline] pub fn len(&self) -> usize { self.slots.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Assigned tract per point; `None` means no tract contains the point.
    #[inline] pub fn slots(&self) -> &[Option<TractId>] { &self.slots }

    /// Points contained by more than one polygon. Proper tract partitions
    /// don't overlap, so a nonzero count flags suspect source geometry; the
    /// first polygon in layer order won in each case.
    #[inline] pub fn ambiguous(&self) -> usize { self.ambiguous }

    pub fn iter(&self) -> impl Iterator<Item = &Option<TractId>> {
        self.slots.iter()
    }
}

/// Assign each point to the tract whose geometry contains it.
///
/// Containment is boundary-inclusive, so a point exactly on a shared edge
/// lands in exactly one tract: the first in layer order, deterministically.
/// Points outside every tract yield `None`; that is expected data (outside
/// city limits, bad geocode), never an error. Output length always equals
/// input length.
pub fn assign(points: &PointSet, layer: &TractLayer) -> Result<Assignments> {
    if points.epsg() != layer.epsg() {
        return Err(TractError::ProjectionMismatch {
            points: points.epsg(),
            polygons: layer.epsg(),
        });
    }

    // Validate every coordinate before assigning anything: all-or-nothing.
    for (row, point) in points.points().iter().enumerate() {
        if !point.x().is_finite() || !point.y().is_finite() {
            return Err(TractError::InvalidInput { row, x: point.x(), y: point.y() });
        }
    }

    let shapes = layer.shapes();
    let mut slots = Vec::with_capacity(points.len());
    let mut ambiguous = 0;

    for point in points.points() {
        let mut containing = layer.geoms()
            .candidates(point.x(), point.y())
            .into_iter()
            .filter(|&i| shapes[i].intersects(point));

        let first = containing.next();
        if first.is_some() && containing.next().is_some() {
            ambiguous += 1;
        }
        slots.push(first.map(|i| layer.geo_ids()[i].clone()));
    }

    Ok(Assignments { slots, ambiguous })
}
