use std::collections::HashSet;

use polars::frame::DataFrame;
use polars::prelude::{BooleanChunked, DataFrameJoinOps, NewChunkedArray, SortMultipleOptions};

use crate::error::{Result, TractError};

use super::{TractId, TractLayer};

/// Join mode for attribute merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Keep every base tract; columns from unmatched keys are null.
    Left,
    /// Same row set as `Left` (a merged table must stay aligned with the
    /// geometry, so incoming-only keys are never materialized); they are
    /// counted in the report instead.
    Outer,
    /// Exclude base tracts with no incoming match. This breaks the 1:1
    /// geometry-attribute correspondence most renderers rely on, so prefer
    /// `Left` for polygon data; the dropped tracts take their geometry with
    /// them.
    Inner,
}

/// What to do when the incoming table has several rows for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateKey`.
    Error,
    /// Keep the first occurrence (stable), drop the rest.
    FirstWins,
}

/// Match bookkeeping for one merge. Unmatched keys are data-quality
/// signals, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Base rows that found an incoming row.
    pub matched: usize,
    /// Base rows null-filled (left/outer) or dropped (inner).
    pub unmatched_base: usize,
    /// Distinct incoming keys that matched no base row.
    pub unmatched_incoming: usize,
}

impl TractLayer {
    /// Merge external tabular attributes onto this layer, keyed by tract id.
    ///
    /// The output's row order always equals this layer's original order
    /// regardless of `incoming`'s order: the join result is re-sorted on the
    /// persisted `idx` ordinal rather than trusting the join primitive,
    /// then a fresh ordinal is laid down so successive merges compose.
    pub fn merge(
        &self,
        incoming: &DataFrame,
        key_base: &str,
        key_incoming: &str,
        mode: MergeMode,
        on_duplicate: DuplicatePolicy,
    ) -> Result<(TractLayer, MergeReport)> {
        // Schema checks up front: a merge is all-or-nothing.
        let base_keys = self.data().column(key_base)
            .map_err(|_| TractError::missing_column("base layer", key_base))?
            .str()
            .map_err(|_| TractError::bad_column("base layer", key_base, "must be of type String"))?;
        let incoming_keys = incoming.column(key_incoming)
            .map_err(|_| TractError::missing_column("incoming table", key_incoming))?
            .str()
            .map_err(|_| TractError::bad_column("incoming table", key_incoming, "must be of type String"))?;
        if incoming.get_column_names().iter().any(|c| c.as_str() == "idx") {
            return Err(TractError::bad_column("incoming table", "idx", "is reserved"));
        }
        if key_incoming != "geo_id"
            && incoming.get_column_names().iter().any(|c| c.as_str() == "geo_id")
        {
            return Err(TractError::bad_column("incoming table", "geo_id", "is reserved"));
        }

        // Scan incoming keys once: uniqueness and the first-occurrence mask.
        let mut seen: HashSet<&str> = HashSet::with_capacity(incoming.height());
        let mut keep = Vec::with_capacity(incoming.height());
        let mut duplicate: Option<String> = None;
        for key in incoming_keys.into_iter() {
            let fresh = match key {
                Some(key) => seen.insert(key),
                None => true, // null keys never match anything; they join to nothing
            };
            if !fresh && duplicate.is_none() {
                duplicate = Some(key.unwrap_or_default().to_string());
            }
            keep.push(fresh);
        }
        if let Some(key) = duplicate {
            if on_duplicate == DuplicatePolicy::Error {
                return Err(TractError::DuplicateKey { column: key_incoming.to_string(), key });
            }
        }

        // Match bookkeeping before the join touches row order.
        let matched = base_keys.into_iter().flatten().filter(|k| seen.contains(k)).count();
        let base_set: HashSet<&str> = base_keys.into_iter().flatten().collect();
        let report = MergeReport {
            matched,
            unmatched_base: self.len() - matched,
            unmatched_incoming: seen.iter().filter(|k| !base_set.contains(*k)).count(),
        };

        let deduped;
        let incoming = if keep.iter().all(|&k| k) {
            incoming
        } else {
            deduped = incoming.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
            &deduped
        };

        // Never trust the join's output order: re-sort on the ordinal.
        let joined = match mode {
            MergeMode::Inner => self.data().inner_join(incoming, [key_base], [key_incoming])?,
            MergeMode::Left | MergeMode::Outer => {
                self.data().left_join(incoming, [key_base], [key_incoming])?
            }
        };
        let sorted = joined.sort(["idx"], SortMultipleOptions::default())?;

        let layer = match mode {
            MergeMode::Left | MergeMode::Outer => {
                debug_assert_eq!(sorted.height(), self.len());
                TractLayer::from_parts(
                    self.geo_ids().to_vec(),
                    self.index().clone(),
                    reindex(sorted)?,
                    self.geoms().clone(),
                )
            }
            MergeMode::Inner => {
                let kept: Vec<usize> = sorted.column("idx")?.u32()?
                    .into_no_null_iter()
                    .map(|i| i as usize)
                    .collect();
                let geo_ids: Vec<TractId> = kept.iter().map(|&i| self.geo_ids()[i].clone()).collect();
                let index = geo_ids.iter().enumerate()
                    .map(|(i, id)| (id.clone(), i as u32))
                    .collect();
                let geoms = self.geoms().subset(&kept);
                TractLayer::from_parts(geo_ids, index, reindex(sorted)?, geoms)
            }
        };

        Ok((layer, report))
    }
}

/// Drop the stale ordinal and lay down a fresh contiguous one.
fn reindex(df: DataFrame) -> Result<DataFrame> {
    Ok(df.drop("idx")?.with_row_index("idx".into(), None)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, LineString, MultiPolygon, Polygon};
    use polars::prelude::Column;

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
        let shapes = (0..ids.len()).map(|i| square(i as f64)).collect();
        TractLayer::new(
            ids.iter().map(|s| s.to_string()).collect(),
            polars::frame::DataFrame::empty(),
            shapes,
            Some(4326),
        ).unwrap()
    }

    fn incoming(keys: &[&str], values: &[Option<f64>]) -> DataFrame {
        DataFrame::new(vec![
            Column::new("GEOID".into(), keys.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
            Column::new("poverty".into(), values.to_vec()),
        ]).unwrap()
    }

    fn geo_id_order(layer: &TractLayer) -> Vec<String> {
        layer.data().column("geo_id").unwrap().str().unwrap()
            .into_no_null_iter()
            .map(String::from)
            .collect()
    }

    fn poverty(layer: &TractLayer) -> Vec<Option<f64>> {
        layer.data().column("poverty").unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn left_merge_preserves_base_order_with_shuffled_incoming() {
        let base = make_layer(&["003", "001", "002"]);
        let table = incoming(&["001", "002", "003"], &[Some(1.0), Some(2.0), Some(3.0)]);

        let (merged, report) = base
            .merge(&table, "geo_id", "GEOID", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap();

        assert_eq!(merged.len(), base.len());
        assert_eq!(geo_id_order(&merged), vec!["003", "001", "002"]);
        assert_eq!(poverty(&merged), vec![Some(3.0), Some(1.0), Some(2.0)]);
        assert_eq!(report.matched, 3);
        assert_eq!(report.unmatched_base, 0);
        assert_eq!(report.unmatched_incoming, 0);
    }

    #[test]
    fn left_merge_null_fills_unmatched_base_rows() {
        let base = make_layer(&["003", "001", "002"]);
        let table = incoming(&["001"], &[Some(9.5)]);

        let (merged, report) = base
            .merge(&table, "geo_id", "GEOID", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap();

        assert_eq!(geo_id_order(&merged), vec!["003", "001", "002"]);
        assert_eq!(poverty(&merged), vec![None, Some(9.5), None]);
        assert_eq!(report.matched, 1);
        assert_eq!(report.unmatched_base, 2);
    }

    #[test]
    fn outer_merge_reports_incoming_only_keys() {
        let base = make_layer(&["001", "002"]);
        let table = incoming(&["002", "999"], &[Some(4.0), Some(5.0)]);

        let (merged, report) = base
            .merge(&table, "geo_id", "GEOID", MergeMode::Outer, DuplicatePolicy::Error)
            .unwrap();

        // incoming-only keys have no geometry; they are reported, not appended
        assert_eq!(merged.len(), 2);
        assert_eq!(geo_id_order(&merged), vec!["001", "002"]);
        assert_eq!(report.unmatched_incoming, 1);
    }

    #[test]
    fn inner_merge_drops_rows_and_geometry_together() {
        let base = make_layer(&["003", "001", "002"]);
        let table = incoming(&["001"], &[Some(7.0)]);

        let (merged, _) = base
            .merge(&table, "geo_id", "GEOID", MergeMode::Inner, DuplicatePolicy::Error)
            .unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(geo_id_order(&merged), vec!["001"]);
        assert_eq!(merged.shapes().len(), 1);
        assert_eq!(merged.geo_ids()[0].as_str(), "001");
        // the kept shape is the one that belonged to "001" (offset 1)
        assert_eq!(merged.shapes()[0], square(1.0));
    }

    #[test]
    fn duplicate_incoming_key_errors_under_error_policy() {
        let base = make_layer(&["001", "002"]);
        let table = incoming(&["001", "001"], &[Some(5.0), Some(7.0)]);

        let err = base
            .merge(&table, "geo_id", "GEOID", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap_err();

        assert!(matches!(err, TractError::DuplicateKey { ref key, .. } if key == "001"));
    }

    #[test]
    fn duplicate_incoming_key_first_wins() {
        let base = make_layer(&["001", "002"]);
        let table = incoming(&["001", "001"], &[Some(5.0), Some(7.0)]);

        let (merged, _) = base
            .merge(&table, "geo_id", "GEOID", MergeMode::Left, DuplicatePolicy::FirstWins)
            .unwrap();

        assert_eq!(poverty(&merged), vec![Some(5.0), None]);
    }

    #[test]
    fn empty_incoming_left_merge_yields_base_with_null_columns() {
        let base = make_layer(&["003", "001", "002"]);
        let table = incoming(&[], &[]);

        let (merged, report) = base
            .merge(&table, "geo_id", "GEOID", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap();

        assert_eq!(merged.len(), base.len());
        assert_eq!(geo_id_order(&merged), geo_id_order(&base));
        assert_eq!(poverty(&merged), vec![None, None, None]);
        assert_eq!(report.matched, 0);
    }

    #[test]
    fn successive_merges_compose_and_keep_order() {
        let base = make_layer(&["003", "001", "002"]);
        let lead = incoming(&["002", "001", "003"], &[Some(0.2), Some(0.1), Some(0.3)]);

        let (step1, _) = base
            .merge(&lead, "geo_id", "GEOID", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap();

        let econ = DataFrame::new(vec![
            Column::new("tract".into(), vec!["001".to_string(), "003".to_string()]),
            Column::new("income".into(), vec![Some(52000.0), Some(38000.0)]),
        ]).unwrap();

        let (step2, _) = step1
            .merge(&econ, "geo_id", "tract", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap();

        assert_eq!(geo_id_order(&step2), vec!["003", "001", "002"]);
        assert_eq!(poverty(&step2), vec![Some(0.3), Some(0.1), Some(0.2)]);
        let income: Vec<Option<f64>> =
            step2.data().column("income").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(income, vec![Some(38000.0), Some(52000.0), None]);
    }

    #[test]
    fn missing_key_field_is_a_schema_error() {
        let base = make_layer(&["001"]);
        let table = incoming(&["001"], &[Some(1.0)]);

        let err = base
            .merge(&table, "geo_id", "nope", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap_err();
        assert!(matches!(err, TractError::Schema { .. }));

        let err = base
            .merge(&table, "nope", "GEOID", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap_err();
        assert!(matches!(err, TractError::Schema { .. }));
    }

    #[test]
    fn reserved_columns_are_rejected() {
        let base = make_layer(&["001"]);

        let table = DataFrame::new(vec![
            Column::new("GEOID".into(), vec!["001".to_string()]),
            Column::new("idx".into(), vec![0i64]),
        ]).unwrap();
        let err = base
            .merge(&table, "geo_id", "GEOID", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap_err();
        assert!(matches!(err, TractError::Schema { .. }));

        // a stray non-key geo_id would shadow the layer's canonical id column
        let table = DataFrame::new(vec![
            Column::new("GEOID".into(), vec!["001".to_string()]),
            Column::new("geo_id".into(), vec!["x".to_string()]),
        ]).unwrap();
        let err = base
            .merge(&table, "geo_id", "GEOID", MergeMode::Left, DuplicatePolicy::Error)
            .unwrap_err();
        assert!(matches!(err, TractError::Schema { .. }));
    }
}
