use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// A per-entity parameter given either once for every entity or as one value
/// per entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Broadcast<T> {
    Scalar(T),
    PerEntity(Vec<T>),
}

impl<T: Clone> Broadcast<T> {
    /// Expands to exactly `count` values. A sequence of any other length is a
    /// mismatch, even a single-element one.
    pub fn resolve(&self, name: &str, count: usize) -> Result<Vec<T>> {
        match self {
            Broadcast::Scalar(value) => Ok(vec![value.clone(); count]),
            Broadcast::PerEntity(values) if values.len() == count => Ok(values.clone()),
            Broadcast::PerEntity(values) => Err(Error::MismatchedInputs {
                name: name.to_string(),
                expected: count,
                actual: values.len(),
            }),
        }
    }
}

impl<T> Broadcast<T> {
    pub fn len(&self) -> Option<usize> {
        match self {
            Broadcast::Scalar(_) => None,
            Broadcast::PerEntity(values) => Some(values.len()),
        }
    }
}

impl<T: DeserializeOwned> Broadcast<T> {
    /// Reads a dynamically typed parameter; anything that is not a number or a
    /// sequence of numbers is reported against `name`.
    pub fn from_json(name: &str, value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| Error::InvalidParameterType {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

impl From<f64> for Broadcast<f64> {
    fn from(value: f64) -> Self {
        Broadcast::Scalar(value)
    }
}

impl From<Vec<f64>> for Broadcast<f64> {
    fn from(values: Vec<f64>) -> Self {
        Broadcast::PerEntity(values)
    }
}

impl From<&[f64]> for Broadcast<f64> {
    fn from(values: &[f64]) -> Self {
        Broadcast::PerEntity(values.to_vec())
    }
}

impl From<usize> for Broadcast<usize> {
    fn from(value: usize) -> Self {
        Broadcast::Scalar(value)
    }
}

impl From<Vec<usize>> for Broadcast<usize> {
    fn from(values: Vec<usize>) -> Self {
        Broadcast::PerEntity(values)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalar_repeats() {
        let b: Broadcast<f64> = 10.0.into();
        assert_eq!(b.resolve("azimuth", 3).unwrap(), vec![10.0, 10.0, 10.0]);
        assert_eq!(b.len(), None);
    }

    #[test]
    fn sequence_must_match() {
        let b: Broadcast<f64> = vec![100.0, 120.0].into();
        assert_eq!(b.resolve("azimuth_fov", 2).unwrap(), vec![100.0, 120.0]);
        match b.resolve("azimuth_fov", 1) {
            Err(Error::MismatchedInputs {
                name,
                expected,
                actual,
            }) => {
                assert_eq!(name, "azimuth_fov");
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn single_element_sequence_is_not_a_scalar() {
        let b: Broadcast<f64> = vec![5.0].into();
        assert!(b.resolve("max_range", 2).is_err());
    }

    #[test]
    fn json_types() {
        let b: Broadcast<f64> = Broadcast::from_json("elevation", &json!(30)).unwrap();
        assert_eq!(b, Broadcast::Scalar(30.0));
        let b: Broadcast<f64> = Broadcast::from_json("elevation", &json!([1.0, 2])).unwrap();
        assert_eq!(b.len(), Some(2));
        assert!(matches!(
            Broadcast::<f64>::from_json("elevation", &json!("thirty")),
            Err(Error::InvalidParameterType { .. })
        ));
        assert!(matches!(
            Broadcast::<usize>::from_json("arc_points", &json!(10.5)),
            Err(Error::InvalidParameterType { .. })
        ));
    }
}
