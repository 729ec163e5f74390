//! Geographic geometry for sensor coverage.
//!
//! Sensor fields of view, lattice grids, borders and raster coverage are
//! turned into polyline and polygon packets ready for a globe client. The
//! work is split over [`sightline_math`] (ellipsoid geodesy),
//! [`sightline_scene`] (the geometry generators) and [`sightline_coverage`]
//! (raster classification and composition); this crate ties them together
//! with [`Settings`] and one [`Error`] type.
mod config;
mod error;

pub use config::*;
pub use error::*;

pub use sightline_coverage;
pub use sightline_math;
pub use sightline_scene;

pub use sightline_coverage::{
    classify, compose, coverage, coverage_from_raster, trace_contours, Classification,
    ClassifiedContour, ClassifierOptions, ContourKind, CoverageRaster, GeoTransform,
    OverlapRaster, RasterData, Relation, Threshold, COVERAGE_OUTLINE_COLOR,
};
#[cfg(feature = "geotiff")]
pub use sightline_coverage::{classify_path, read_band};
pub use sightline_math::{Cartographic, Ellipsoid};
pub use sightline_scene::{
    borders, cell_pitch, fov_edges, fov_faces, grid_cells, png_data_uri, BillboardRegistry,
    BorderRegistry, BorderSource, Broadcast, CoordinateArray, Decoration, FovGenerator,
    GeodeticPoint, IdGenerator, Packet, Param, SensorArray, SensorSpec, SequentialIds, Style,
    StyleKind, GRID_OUTLINE_COLOR,
};
