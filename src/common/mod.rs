mod fs;
#[cfg(feature = "download")]
mod fetch;
mod io;
mod polygon;

pub(crate) use fs::*;
#[cfg(feature = "download")]
pub(crate) use fetch::fetch_bytes;
#[cfg(feature = "download")]
pub use fetch::download_file;
pub(crate) use io::*;
pub(crate) use polygon::*;
