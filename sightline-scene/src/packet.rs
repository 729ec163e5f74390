use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::{EntityDecoration, GeodeticPoint};

pub type Rgba = [u8; 4];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub positions: Vec<GeodeticPoint>,
    pub style: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub positions: Vec<GeodeticPoint>,
    pub holes: Vec<Vec<GeodeticPoint>>,
    pub per_position_height: Option<bool>,
    pub outline: Option<bool>,
    pub outline_color: Option<Rgba>,
    pub style: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polyline(Polyline),
    Polygon(Polygon),
}

/// One output record: an identifier, the computed geometry, and the
/// decoration fields merged onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub id: String,
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Packet {
    pub fn polyline(id: String, positions: Vec<GeodeticPoint>, decoration: &EntityDecoration) -> Self {
        Self {
            id,
            geometry: Geometry::Polyline(Polyline {
                positions,
                style: decoration.style.clone(),
            }),
            properties: decoration.properties.clone(),
        }
    }

    pub fn polygon(id: String, polygon: Polygon, decoration: &EntityDecoration) -> Self {
        Self {
            id,
            geometry: Geometry::Polygon(Polygon {
                style: decoration.style.clone(),
                ..polygon
            }),
            properties: decoration.properties.clone(),
        }
    }

    pub fn positions(&self) -> &[GeodeticPoint] {
        match &self.geometry {
            Geometry::Polyline(polyline) => &polyline.positions,
            Geometry::Polygon(polygon) => &polygon.positions,
        }
    }

    pub fn as_polyline(&self) -> Option<&Polyline> {
        match &self.geometry {
            Geometry::Polyline(polyline) => Some(polyline),
            Geometry::Polygon(_) => None,
        }
    }

    pub fn as_polygon(&self) -> Option<&Polygon> {
        match &self.geometry {
            Geometry::Polygon(polygon) => Some(polygon),
            Geometry::Polyline(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut packet = Map::new();
        packet.insert("id".to_string(), Value::String(self.id.clone()));
        packet.extend(self.properties.clone());
        match &self.geometry {
            Geometry::Polyline(polyline) => {
                let mut body = polyline.style.clone();
                body.insert("positions".to_string(), degrees(&polyline.positions));
                packet.insert("polyline".to_string(), Value::Object(body));
            }
            Geometry::Polygon(polygon) => {
                let mut body = polygon.style.clone();
                body.insert("positions".to_string(), degrees(&polygon.positions));
                if !polygon.holes.is_empty() {
                    let holes: Vec<Value> = polygon
                        .holes
                        .iter()
                        .map(|hole| Value::from(flatten(hole)))
                        .collect();
                    body.insert("holes".to_string(), json!({ "cartographicDegrees": holes }));
                }
                if let Some(per_position_height) = polygon.per_position_height {
                    body.insert("perPositionHeight".to_string(), per_position_height.into());
                }
                if let Some(outline) = polygon.outline {
                    body.insert("outline".to_string(), outline.into());
                }
                if let Some(color) = polygon.outline_color {
                    body.insert("outlineColor".to_string(), json!({ "rgba": color }));
                }
                packet.insert("polygon".to_string(), Value::Object(body));
            }
        }
        Value::Object(packet)
    }
}

impl Serialize for Packet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn flatten(points: &[GeodeticPoint]) -> Vec<f64> {
    points.iter().flat_map(|p| p.cartographic_degrees()).collect()
}

fn degrees(points: &[GeodeticPoint]) -> Value {
    json!({ "cartographicDegrees": flatten(points) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyline_json() {
        let mut decoration = EntityDecoration::default();
        decoration.properties.insert("name".into(), json!("edge"));
        decoration.style.insert("width".into(), json!(2));
        let packet = Packet::polyline(
            "edge-0".into(),
            vec![GeodeticPoint::new(31.0, 34.0, 10.0), GeodeticPoint::new(32.0, 35.0, 0.0)],
            &decoration,
        );
        let value = serde_json::to_value(&packet).unwrap();
        assert_eq!(value["id"], json!("edge-0"));
        assert_eq!(value["name"], json!("edge"));
        assert_eq!(value["polyline"]["width"], json!(2));
        assert_eq!(
            value["polyline"]["positions"]["cartographicDegrees"],
            json!([34.0, 31.0, 10.0, 35.0, 32.0, 0.0])
        );
    }

    #[test]
    fn computed_polygon_fields_override_style() {
        let mut decoration = EntityDecoration::default();
        decoration.style.insert("outlineColor".into(), json!({"rgba": [1, 2, 3, 4]}));
        let polygon = Polygon {
            positions: vec![GeodeticPoint::default(); 3],
            holes: vec![vec![GeodeticPoint::default(); 3]],
            outline: Some(true),
            outline_color: Some([255, 255, 255, 255]),
            ..Default::default()
        };
        let value = Packet::polygon("cell-0".into(), polygon, &decoration).to_json();
        assert_eq!(value["polygon"]["outlineColor"]["rgba"], json!([255, 255, 255, 255]));
        assert_eq!(value["polygon"]["holes"]["cartographicDegrees"][0].as_array().unwrap().len(), 9);
        assert!(value["polygon"].get("perPositionHeight").is_none());
    }
}
