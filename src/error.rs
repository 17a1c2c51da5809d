use thiserror::Error;

/// Result alias for fallible tractmap operations.
pub type Result<T> = std::result::Result<T, TractError>;

/// Errors raised by the core pipeline.
///
/// Unmatched points and unmatched join keys are *not* errors; they surface
/// as `None` assignments, null-filled columns, and report counters.
#[derive(Debug, Error)]
pub enum TractError {
    /// A point handed to the spatial join had a NaN or infinite coordinate.
    /// Rows with absent coordinates must be filtered out before assignment.
    #[error("invalid point coordinate at row {row}: ({x}, {y})")]
    InvalidInput { row: usize, x: f64, y: f64 },

    /// CRS tags of the point set and the polygon layer disagree.
    /// Reprojection is an external concern; the join refuses to guess.
    #[error("projection mismatch: points are EPSG:{points}, polygons are EPSG:{polygons}")]
    ProjectionMismatch { points: u32, polygons: u32 },

    /// The incoming table has multiple rows for one join key under a mode
    /// that requires uniqueness.
    #[error("duplicate join key {key:?} in column {column:?}")]
    DuplicateKey { column: String, key: String },

    /// A referenced key/fill/label field does not exist in the given table,
    /// or has an unusable type.
    #[error("column {column:?} {problem} in {table}")]
    Schema {
        table: &'static str,
        column: String,
        problem: &'static str,
    },

    /// Loader-side failure (file, network, parse). The core components never
    /// produce or catch this category; it belongs to the IO boundary.
    #[error("data source error: {0}")]
    DataSource(#[from] anyhow::Error),
}

impl TractError {
    pub(crate) fn missing_column(table: &'static str, column: impl Into<String>) -> Self {
        TractError::Schema { table, column: column.into(), problem: "not found" }
    }

    pub(crate) fn bad_column(table: &'static str, column: impl Into<String>, problem: &'static str) -> Self {
        TractError::Schema { table, column: column.into(), problem }
    }
}

impl From<polars::error::PolarsError> for TractError {
    fn from(err: polars::error::PolarsError) -> Self {
        TractError::DataSource(anyhow::Error::new(err))
    }
}
