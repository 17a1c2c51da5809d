#![doc = "Tractmap public API"]
mod common;
mod error;
mod geom;
mod incident;
mod join;
mod render;
mod tract;

#[doc(inline)]
pub use error::{Result, TractError};

#[doc(inline)]
pub use tract::{DuplicatePolicy, MergeMode, MergeReport, TractId, TractLayer};

#[doc(inline)]
pub use incident::{IncidentSet, PointSet};

#[doc(inline)]
pub use join::{aggregate, assign, counts_to_dataframe, AggregatedCount, Assignments, JoinReport};

#[doc(inline)]
pub use render::{render_html, render_svg, BinStrategy, Bins, OverlayLayer, RenderConfig};

#[cfg(feature = "download")]
#[doc(inline)]
pub use common::download_file;
