//! Coverage geometry from rasters.
//!
//! A boolean raster is traced into contours, each contour is classified as
//! coverage or hole by sampling the pixels it encloses, and the compositor
//! punches the holes out of the coverage before packets are emitted.
mod classify;
mod compose;
mod contour;
mod error;
mod raster;
#[cfg(feature = "geotiff")]
mod reader;

pub use classify::*;
pub use compose::*;
pub use contour::*;
pub use error::*;
pub use raster::*;
#[cfg(feature = "geotiff")]
pub use reader::*;
