use serde::{Deserialize, Serialize};
use serde_json::Value;
use sightline_math::{wrap_longitude_degrees, Cartographic};

use crate::{Error, Result};

/// A position on the ellipsoid in degrees and metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeodeticPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl GeodeticPoint {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    pub fn to_cartographic(&self) -> Cartographic {
        Cartographic::from_degrees(self.longitude, self.latitude, self.altitude)
    }

    /// Longitude is reduced into `(-180, 180]`.
    pub fn from_cartographic(cartographic: &Cartographic) -> Self {
        Self {
            latitude: cartographic.latitude_degrees(),
            longitude: wrap_longitude_degrees(cartographic.longitude_degrees()),
            altitude: cartographic.height,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn wrapped(mut self) -> Self {
        self.longitude = wrap_longitude_degrees(self.longitude);
        self
    }

    /// `[longitude, latitude, altitude]`, the order globe clients expect.
    pub fn cartographic_degrees(&self) -> [f64; 3] {
        [self.longitude, self.latitude, self.altitude]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateValues {
    Float(Vec<f64>),
    Integer(Vec<i64>),
}

impl CoordinateValues {
    pub fn len(&self) -> usize {
        match self {
            CoordinateValues::Float(values) => values.len(),
            CoordinateValues::Integer(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A dense, row-major array of `(latitude, longitude, altitude)` triples.
///
/// A single point is a `(3, 1)` column and a stack of points is `(n, 3, 1)`;
/// the flat `(3)` and `(n, 3)` layouts are accepted where a single point or a
/// stack is expected.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateArray {
    shape: Vec<usize>,
    values: CoordinateValues,
}

impl CoordinateArray {
    pub fn new(shape: Vec<usize>, values: CoordinateValues) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(Error::Shape(format!(
                "an array of shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self { shape, values })
    }

    pub fn from_point(point: GeodeticPoint) -> Self {
        Self {
            shape: vec![3, 1],
            values: CoordinateValues::Float(vec![
                point.latitude,
                point.longitude,
                point.altitude,
            ]),
        }
    }

    pub fn from_points(points: &[GeodeticPoint]) -> Self {
        let values = points
            .iter()
            .flat_map(|p| [p.latitude, p.longitude, p.altitude])
            .collect();
        Self {
            shape: vec![points.len(), 3, 1],
            values: CoordinateValues::Float(values),
        }
    }

    /// Reads nested JSON arrays. Integers stay integers so that the
    /// floating-point requirement can be enforced where points are used.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut shape = Vec::new();
        let mut cursor = value;
        while let Value::Array(items) = cursor {
            shape.push(items.len());
            match items.first() {
                Some(first) => cursor = first,
                None => break,
            }
        }

        let mut floats = Vec::new();
        let mut integers = Vec::new();
        let mut any_float = false;
        collect_leaves(value, &shape, 0, &mut floats, &mut integers, &mut any_float)?;

        let values = if any_float {
            CoordinateValues::Float(floats)
        } else {
            CoordinateValues::Integer(integers)
        };
        Self::new(shape, values)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn values(&self) -> &CoordinateValues {
        &self.values
    }

    /// Sensor origins: one point as `(3)`/`(3, 1)`, or several as
    /// `(n, 3)`/`(n, 3, 1)`.
    pub fn sensor_points(&self) -> Result<Vec<GeodeticPoint>> {
        match self.shape.as_slice() {
            [3] | [3, 1] | [_, 3] | [_, 3, 1] => {}
            [_] | [_, _] | [_, _, _] => {
                return Err(Error::Shape(format!(
                    "sensor positions must have shape (3, 1) or (n, 3, 1), got {:?}",
                    self.shape
                )))
            }
            _ => {
                return Err(Error::NumDimensions(format!(
                    "sensor positions must have 1 to 3 dimensions, got {}",
                    self.ndim()
                )))
            }
        }
        self.float_points("sensor positions")
    }

    /// Stacked points with shape `(n, 3, 1)`.
    pub fn stacked_points(&self) -> Result<Vec<GeodeticPoint>> {
        if self.ndim() != 3 {
            return Err(Error::NumDimensions(format!(
                "positions must have 3 dimensions, got {}",
                self.ndim()
            )));
        }
        if self.shape[1..] != [3, 1] {
            return Err(Error::Shape(format!(
                "positions must have shape (n, 3, 1), got {:?}",
                self.shape
            )));
        }
        self.float_points("positions")
    }

    fn float_points(&self, what: &str) -> Result<Vec<GeodeticPoint>> {
        match &self.values {
            CoordinateValues::Float(values) => Ok(values
                .chunks_exact(3)
                .map(|c| GeodeticPoint::new(c[0], c[1], c[2]))
                .collect()),
            CoordinateValues::Integer(_) => Err(Error::DataType(format!(
                "{what} must be floating point, got integers"
            ))),
        }
    }
}

impl From<GeodeticPoint> for CoordinateArray {
    fn from(point: GeodeticPoint) -> Self {
        Self::from_point(point)
    }
}

impl From<&[GeodeticPoint]> for CoordinateArray {
    fn from(points: &[GeodeticPoint]) -> Self {
        Self::from_points(points)
    }
}

impl From<Vec<GeodeticPoint>> for CoordinateArray {
    fn from(points: Vec<GeodeticPoint>) -> Self {
        Self::from_points(&points)
    }
}

fn collect_leaves(
    value: &Value,
    shape: &[usize],
    depth: usize,
    floats: &mut Vec<f64>,
    integers: &mut Vec<i64>,
    any_float: &mut bool,
) -> Result<()> {
    match value {
        Value::Array(items) => {
            if shape.get(depth) != Some(&items.len()) {
                return Err(Error::Shape(format!(
                    "ragged coordinate array at depth {depth}"
                )));
            }
            for item in items {
                collect_leaves(item, shape, depth + 1, floats, integers, any_float)?;
            }
            Ok(())
        }
        Value::Number(number) => {
            if depth != shape.len() {
                return Err(Error::Shape(format!(
                    "ragged coordinate array at depth {depth}"
                )));
            }
            match number.as_i64() {
                Some(integer) if !number.is_f64() => {
                    integers.push(integer);
                    floats.push(integer as f64);
                }
                _ => {
                    *any_float = true;
                    floats.push(number.as_f64().unwrap_or(f64::NAN));
                }
            }
            Ok(())
        }
        other => Err(Error::DataType(format!(
            "coordinates must be numeric, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn single_column() {
        let array = CoordinateArray::from_json(&json!([[31.4], [34.7], [1000.0]])).unwrap();
        assert_eq!(array.shape(), &[3, 1]);
        let points = array.sensor_points().unwrap();
        assert_eq!(points, vec![GeodeticPoint::new(31.4, 34.7, 1000.0)]);
    }

    #[test]
    fn flat_layouts() {
        let one = CoordinateArray::from_json(&json!([31.4, 34.7, 1000.0])).unwrap();
        assert_eq!(one.sensor_points().unwrap().len(), 1);
        let many = CoordinateArray::from_json(&json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])).unwrap();
        let points = many.sensor_points().unwrap();
        assert_eq!(points[1], GeodeticPoint::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn shape_and_rank_errors() {
        let wrong = CoordinateArray::from_json(&json!([[1.0, 2.0], [3.0, 4.0]])).unwrap();
        assert!(matches!(wrong.sensor_points(), Err(Error::Shape(_))));

        let deep = CoordinateArray::from_json(&json!([[[[1.0], [2.0], [3.0]]]])).unwrap();
        assert!(matches!(deep.sensor_points(), Err(Error::NumDimensions(_))));

        let flat = CoordinateArray::from_json(&json!([[1.0, 2.0, 3.0]])).unwrap();
        assert!(matches!(flat.stacked_points(), Err(Error::NumDimensions(_))));

        let trailing = CoordinateArray::from_json(&json!([[[1.0, 2.0, 3.0]]])).unwrap();
        assert!(matches!(trailing.stacked_points(), Err(Error::Shape(_))));
    }

    #[test]
    fn integers_are_rejected() {
        let array = CoordinateArray::from_json(&json!([[31], [34], [1000]])).unwrap();
        assert!(matches!(array.sensor_points(), Err(Error::DataType(_))));
        let mixed = CoordinateArray::from_json(&json!([[31], [34.5], [1000]])).unwrap();
        assert!(mixed.sensor_points().is_ok());
    }

    #[test]
    fn ragged_and_text() {
        assert!(matches!(
            CoordinateArray::from_json(&json!([[1.0, 2.0, 3.0], [1.0]])),
            Err(Error::Shape(_))
        ));
        assert!(matches!(
            CoordinateArray::from_json(&json!([["a"], [1.0], [2.0]])),
            Err(Error::DataType(_))
        ));
    }

    #[test]
    fn stacked_roundtrip_of_typed_points() {
        let points = vec![
            GeodeticPoint::new(33.0, 35.0, 10.0),
            GeodeticPoint::new(33.2, 35.1, 0.0),
        ];
        let array = CoordinateArray::from(points.clone());
        assert_eq!(array.shape(), &[2, 3, 1]);
        assert_eq!(array.stacked_points().unwrap(), points);
    }

    #[test]
    fn cartographic_wraps_longitude() {
        let c = Cartographic::from_degrees(190.0, 10.0, 5.0);
        let p = GeodeticPoint::from_cartographic(&c);
        assert!((p.longitude + 170.0).abs() < 1e-9);
        assert!((p.latitude - 10.0).abs() < 1e-9);
        assert_eq!(p.cartographic_degrees()[2], 5.0);
    }
}
