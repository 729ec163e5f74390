#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Scene(#[from] sightline_scene::Error),
    #[error("a {width}x{height} raster needs {expected} values, got {actual}")]
    RasterSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("coverage rasters must be boolean: {0}")]
    NotBoolean(String),
    #[error("invalid operation {0:?}, expected one of eq, ge, le, g, l")]
    InvalidOperation(String),
    #[error("no pixel satisfies the threshold")]
    NoData,
    #[error("rasters are not aligned: {0}")]
    Misaligned(String),
    #[error("contour {index} is uncertain: coverage certainty {coverage:.3} and hole certainty {hole:.3} are both below the threshold {threshold}")]
    UncertainContour {
        index: usize,
        coverage: f64,
        hole: f64,
        threshold: f64,
    },
    #[error("contour {index} encloses no pixels")]
    DegenerateContour { index: usize },
    #[error("band {band} requested but the raster has {bands}")]
    MissingBand { band: usize, bands: usize },
    #[error("raster has no georeference: {0}")]
    MissingGeoreference(String),
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
    #[cfg(feature = "geotiff")]
    #[error(transparent)]
    Tiff(#[from] tiff::TiffError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_value(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
