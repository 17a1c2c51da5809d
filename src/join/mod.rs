mod aggregate;
mod assign;

pub use aggregate::{aggregate, counts_to_dataframe, AggregatedCount, JoinReport};
pub use assign::{assign, Assignments};

#[cfg(test)]
mod tests {
    use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
    use polars::frame::DataFrame;

    use crate::incident::PointSet;
    use crate::tract::{DuplicatePolicy, MergeMode, TractLayer};

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

    /// Full pipeline on the smallest interesting dataset: three tracts in
    /// file order {"003","001","002"}, four homicide points of which two
    /// fall in "001", one in "003", and one outside the city.
    #[test]
    fn points_to_counts_to_merged_table_end_to_end() {
        let layer = TractLayer::new(
            vec!["003".into(), "001".into(), "002".into()],
            DataFrame::empty(),
            vec![square(0.0), square(1.0), square(2.0)],
            Some(4326),
        ).unwrap();

        let points = PointSet::new(
            vec![
                Point::new(1.5, 0.5), // "001"
                Point::new(1.2, 0.2), // "001"
                Point::new(0.5, 0.5), // "003"
                Point::new(9.0, 9.0), // outside everything
            ],
            4326,
        );

        let assigned = assign(&points, &layer).unwrap();
        assert_eq!(assigned.len(), points.len());

        let (counts, report) = aggregate(&assigned, &layer);
        assert_eq!(report.total, 4);
        assert_eq!(report.matched, 3);
        assert_eq!(report.unmatched, 1);

        // zero-fill: every reference tract appears, in layer order
        let pairs: Vec<(&str, u64)> = counts.iter()
            .map(|c| (c.tract_id.as_str(), c.count))
            .collect();
        assert_eq!(pairs, vec![("003", 1), ("001", 2), ("002", 0)]);

        let table = counts_to_dataframe(&counts, "num_homicides").unwrap();
        let (merged, _) = layer
            .merge(&table, "geo_id", "geo_id", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap();

        let order: Vec<String> = merged.data().column("geo_id").unwrap()
            .str().unwrap().into_no_null_iter().map(String::from).collect();
        assert_eq!(order, vec!["003", "001", "002"]);

        let homicides: Vec<Option<i64>> = merged.data().column("num_homicides").unwrap()
            .i64().unwrap().into_iter().collect();
        assert_eq!(homicides, vec![Some(1), Some(2), Some(0)]);
    }
}
