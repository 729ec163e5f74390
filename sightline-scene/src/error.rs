use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => write!(f, "latitude"),
            Axis::Longitude => write!(f, "longitude"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Shape(String),
    #[error("{0}")]
    NumDimensions(String),
    #[error("{0}")]
    DataType(String),
    #[error("all inputs must have the same length: {name} has {actual} values for {expected} entities")]
    MismatchedInputs {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("{name} must be a number or a sequence of numbers: {reason}")]
    InvalidParameterType { name: String, reason: String },
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
    #[error("cannot infer the cell size along {0}: fewer than two distinct values")]
    UndefinedCellPitch(Axis),
    #[error("border {name} not found. Available borders: {}", .available.join(", "))]
    BorderNotFound { name: String, available: Vec<String> },
    #[error("billboard {name} not found. Available billboards: {}", .available.join(", "))]
    BillboardNotFound { name: String, available: Vec<String> },
    #[error("sensor {0} produced a ray that has no geodetic position")]
    Transform(usize),
    #[error("{0}")]
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
