//! Ellipsoid geodesy used by the sightline generators.
//!
//! Local azimuth/elevation/range rays are placed in an east-north-up frame,
//! lifted to Earth-fixed cartesian coordinates and brought back to geodetic
//! coordinates on the reference ellipsoid.
mod angle;
mod cartesian3;
mod cartographic;
mod ellipsoid;
mod epsilon;
mod transform;

pub use angle::*;
pub use cartesian3::*;
pub use cartographic::*;
pub use ellipsoid::*;
pub use epsilon::*;
pub use transform::*;
