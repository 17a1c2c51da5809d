use std::collections::HashMap;

use polars::frame::DataFrame;
use polars::prelude::Column;

use crate::error::Result;
use crate::tract::{TractId, TractLayer};

use super::Assignments;

/// Point count for one tract. Zero is a real value, not an omission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedCount {
    pub tract_id: TractId,
    pub count: u64,
}

/// Data-quality summary of a spatial join. Unassigned points are reported
/// here for visibility; they are never a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinReport {
    /// Input points.
    pub total: usize,
    /// Points counted against a reference tract.
    pub matched: usize,
    /// Points outside every reference tract (dropped from the counts).
    pub unmatched: usize,
    /// Points contained by more than one polygon (first in layer order won).
    pub ambiguous: usize,
}

/// Group assignments by tract and count, then zero-fill every reference
/// tract with no observed points.
///
/// The output covers exactly the reference layer's tract ids, in layer
/// order: no duplicates, no omissions. Omitting zero-count tracts would
/// silently bias any downstream statistic (an average, a choropleth color
/// scale) toward tracts that happened to have events.
pub fn aggregate(assigned: &Assignments, reference: &TractLayer) -> (Vec<AggregatedCount>, JoinReport) {
    let mut groups: HashMap<&TractId, u64> = HashMap::new();
    let mut matched = 0;
    let mut unmatched = 0;

    for slot in assigned.iter() {
        match slot {
            Some(id) if reference.index().contains_key(id) => {
                *groups.entry(id).or_insert(0) += 1;
                matched += 1;
            }
            // not assigned, or assigned to a tract the reference doesn't know
            _ => unmatched += 1,
        }
    }

    let counts = reference.geo_ids().iter()
        .map(|id| AggregatedCount {
            tract_id: id.clone(),
            count: groups.get(id).copied().unwrap_or(0),
        })
        .collect();

    let report = JoinReport {
        total: assigned.len(),
        matched,
        unmatched,
        ambiguous: assigned.ambiguous(),
    };

    (counts, report)
}

/// Lay counts out as a `{geo_id, <field>}` table ready to merge onto the
/// layer that produced them.
pub fn counts_to_dataframe(counts: &[AggregatedCount], field: &str) -> Result<DataFrame> {
    let ids: Vec<String> = counts.iter().map(|c| c.tract_id.as_str().to_string()).collect();
    let values: Vec<i64> = counts.iter().map(|c| c.count as i64).collect();

    Ok(DataFrame::new(vec![
        Column::new("geo_id".into(), ids),
        Column::new(field.into(), values),
    ])?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
    use polars::frame::DataFrame;

    use crate::incident::PointSet;
    use crate::join::assign;

    use super::*;

    fn square(offset: f64) -> MultiPolygon<f64> {
        let ring = LineString(vec![
            Coord { x: offset, y: 0.0 },
            Coord { x: offset + 1.0, y: 0.0 },
            Coord { x: offset + 1.0, y: 1.0 },
            Coord { x: offset, y: 1.0 },
            Coord { x: offset, y: 0.0 },
        ]);
        MultiPolygon(vec![Polygon::new(ring, vec![])])
    }

    fn make_layer(ids: &[&str]) -> TractLayer {
        TractLayer::new(
            ids.iter().map(|s| s.to_string()).collect(),
            DataFrame::empty(),
            (0..ids.len()).map(|i| square(i as f64)).collect(),
            Some(4326),
        ).unwrap()
    }

    #[test]
    fn zero_fill_covers_reference_exactly() {
        let layer = make_layer(&["A", "B", "C"]);
        // 3 points in A, none in B, 1 in C, 1 unassignable
        let points = PointSet::new(
            vec![
                Point::new(0.1, 0.1),
                Point::new(0.2, 0.2),
                Point::new(0.3, 0.3),
                Point::new(2.5, 0.5),
                Point::new(50.0, 50.0),
            ],
            4326,
        );

        let assigned = assign(&points, &layer).unwrap();
        let (counts, report) = aggregate(&assigned, &layer);

        let ids: HashSet<&str> = counts.iter().map(|c| c.tract_id.as_str()).collect();
        let expected: HashSet<&str> = ["A", "B", "C"].into_iter().collect();
        assert_eq!(ids, expected);

        let by_id: HashMap<&str, u64> =
            counts.iter().map(|c| (c.tract_id.as_str(), c.count)).collect();
        assert_eq!(by_id["A"], 3);
        assert_eq!(by_id["B"], 0);
        assert_eq!(by_id["C"], 1);

        assert_eq!(report, JoinReport { total: 5, matched: 4, unmatched: 1, ambiguous: 0 });
    }

    #[test]
    fn counts_table_keeps_layer_order() {
        let layer = make_layer(&["C", "A", "B"]);
        let assigned = assign(&PointSet::new(vec![], 4326), &layer).unwrap();
        let (counts, _) = aggregate(&assigned, &layer);

        let df = counts_to_dataframe(&counts, "n").unwrap();
        let order: Vec<String> = df.column("geo_id").unwrap().str().unwrap()
            .into_no_null_iter().map(String::from).collect();
        assert_eq!(order, vec!["C", "A", "B"]);

        let values: Vec<i64> = df.column("n").unwrap().i64().unwrap()
            .into_no_null_iter().collect();
        assert_eq!(values, vec![0, 0, 0]);
    }
}
