mod io;
mod layer;
mod merge;
mod tract_id;

pub use layer::TractLayer;
pub use merge::{DuplicatePolicy, MergeMode, MergeReport};
pub use tract_id::TractId;
