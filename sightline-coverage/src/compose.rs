use bevy::log::debug;
use geo::{BooleanOps, Coord, Intersects, LineString, MultiPolygon, Polygon};
use sightline_scene::{
    Decoration, GeodeticPoint, IdGenerator, Packet, Polygon as PolygonGeometry, Rgba, Target,
};

use crate::{classify, ClassifierOptions, CoverageRaster, Error, Result};

pub const COVERAGE_OUTLINE_COLOR: Rgba = [255, 253, 55, 255];

fn to_polygon(ring: &[GeodeticPoint]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();
    Polygon::new(LineString::from(coords), vec![])
}

fn from_line_string(line: &LineString<f64>) -> Vec<GeodeticPoint> {
    let mut points: Vec<GeodeticPoint> = line
        .coords()
        .map(|c| GeodeticPoint::new(c.y, c.x, 0.0))
        .collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn check_rings(name: &str, rings: &[Vec<GeodeticPoint>]) -> Result<()> {
    if let Some(index) = rings.iter().position(|ring| ring.len() < 3) {
        return Err(Error::invalid_value(
            name,
            format!("ring {index} has fewer than 3 points"),
        ));
    }
    Ok(())
}

/// Each coverage ring with every intersecting hole subtracted, keeping the
/// index of the ring each piece came from.
fn compose_indexed(
    coverage: &[Vec<GeodeticPoint>],
    holes: &[Vec<GeodeticPoint>],
) -> Vec<(usize, Polygon<f64>)> {
    let holes: Vec<MultiPolygon<f64>> = holes
        .iter()
        .map(|ring| MultiPolygon::new(vec![to_polygon(ring)]))
        .collect();
    let mut used = vec![false; holes.len()];

    let mut pieces = Vec::new();
    for (index, ring) in coverage.iter().enumerate() {
        let mut shape = MultiPolygon::new(vec![to_polygon(ring)]);
        for (hole, used) in holes.iter().zip(used.iter_mut()) {
            if !shape.intersects(hole) {
                continue;
            }
            *used = true;
            shape = shape.difference(hole);
        }
        pieces.extend(shape.0.into_iter().map(|polygon| (index, polygon)));
    }

    let dropped = used.iter().filter(|u| !**u).count();
    if dropped > 0 {
        debug!("{} holes touch no coverage and were dropped", dropped);
    }
    pieces
}

/// Unions the coverage rings into one multipolygon with intersecting holes
/// punched out as interior rings.
pub fn compose(
    coverage: &[Vec<GeodeticPoint>],
    holes: &[Vec<GeodeticPoint>],
) -> Result<MultiPolygon<f64>> {
    check_rings("coverage", coverage)?;
    check_rings("holes", holes)?;
    Ok(MultiPolygon::new(
        compose_indexed(coverage, holes)
            .into_iter()
            .map(|(_, polygon)| polygon)
            .collect(),
    ))
}

/// Coverage packets, one per composed polygon. Decoration is resolved per
/// coverage ring and shared by every piece cut from that ring.
pub fn coverage(
    coverage: &[Vec<GeodeticPoint>],
    holes: &[Vec<GeodeticPoint>],
    decoration: &Decoration,
    ids: &mut dyn IdGenerator,
) -> Result<Vec<Packet>> {
    check_rings("coverage", coverage)?;
    check_rings("holes", holes)?;
    let decorations = decoration.resolve(coverage.len(), Target::COVERAGE)?;

    let packets: Vec<Packet> = compose_indexed(coverage, holes)
        .into_iter()
        .map(|(index, polygon)| {
            let geometry = PolygonGeometry {
                positions: from_line_string(polygon.exterior()),
                holes: polygon.interiors().iter().map(from_line_string).collect(),
                outline: Some(true),
                outline_color: Some(COVERAGE_OUTLINE_COLOR),
                ..Default::default()
            };
            Packet::polygon(ids.next_id("coverage"), geometry, &decorations[index])
        })
        .collect();
    debug!(
        "coverage: {} polygons from {} rings and {} holes",
        packets.len(),
        coverage.len(),
        holes.len()
    );
    Ok(packets)
}

/// [`classify`] followed by [`coverage`].
pub fn coverage_from_raster(
    raster: &CoverageRaster,
    options: &ClassifierOptions,
    decoration: &Decoration,
    ids: &mut dyn IdGenerator,
) -> Result<Vec<Packet>> {
    let classification = classify(raster, options)?;
    coverage(
        &classification.coverage_rings(),
        &classification.hole_rings(),
        decoration,
        ids,
    )
}

#[cfg(test)]
mod tests {
    use geo::Area;
    use serde_json::json;
    use sightline_scene::{SequentialIds, Style};

    use super::*;
    use crate::GeoTransform;

    fn square(lon: f64, lat: f64, size: f64) -> Vec<GeodeticPoint> {
        vec![
            GeodeticPoint::new(lat, lon, 0.0),
            GeodeticPoint::new(lat + size, lon, 0.0),
            GeodeticPoint::new(lat + size, lon + size, 0.0),
            GeodeticPoint::new(lat, lon + size, 0.0),
        ]
    }

    #[test]
    fn contained_hole_becomes_interior_ring() {
        let composed = compose(&[square(0.0, 0.0, 10.0)], &[square(4.0, 4.0, 2.0)]).unwrap();
        assert_eq!(composed.0.len(), 1);
        assert_eq!(composed.0[0].interiors().len(), 1);
        assert!((composed.unsigned_area() - 96.0).abs() < 1e-9);
    }

    #[test]
    fn distant_hole_is_dropped() {
        let composed = compose(&[square(0.0, 0.0, 10.0)], &[square(50.0, 50.0, 2.0)]).unwrap();
        assert_eq!(composed.0.len(), 1);
        assert!(composed.0[0].interiors().is_empty());
        assert!((composed.unsigned_area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn straddling_hole_cuts_the_edge() {
        let composed = compose(&[square(0.0, 0.0, 10.0)], &[square(8.0, 4.0, 4.0)]).unwrap();
        assert_eq!(composed.0.len(), 1);
        assert!(composed.0[0].interiors().is_empty());
        assert!((composed.unsigned_area() - 92.0).abs() < 1e-9);
    }

    #[test]
    fn splitting_hole_yields_pieces() {
        let band = vec![
            GeodeticPoint::new(-1.0, 4.0, 0.0),
            GeodeticPoint::new(11.0, 4.0, 0.0),
            GeodeticPoint::new(11.0, 6.0, 0.0),
            GeodeticPoint::new(-1.0, 6.0, 0.0),
        ];
        let packets = coverage(
            &[square(0.0, 0.0, 10.0)],
            &[band],
            &Decoration::new().scalar("name", "radar"),
            &mut SequentialIds::new(),
        )
        .unwrap();
        assert_eq!(packets.len(), 2);
        assert!(packets.iter().all(|p| p.properties["name"] == json!("radar")));
    }

    #[test]
    fn packets_carry_holes_and_outline() {
        let decoration = Decoration::new().template(
            Style::polygon()
                .with("holes", json!([]))
                .with("outline", false)
                .with("material", json!({"solidColor": {"color": {"rgba": [255, 0, 0, 80]}}})),
        );
        let packets = coverage(
            &[square(0.0, 0.0, 10.0)],
            &[square(4.0, 4.0, 2.0)],
            &decoration,
            &mut SequentialIds::new(),
        )
        .unwrap();
        let value = packets[0].to_json();
        assert_eq!(value["id"], json!("coverage-0"));
        assert_eq!(value["polygon"]["outline"], json!(true));
        assert_eq!(value["polygon"]["outlineColor"]["rgba"], json!([255, 253, 55, 255]));
        assert_eq!(
            value["polygon"]["holes"]["cartographicDegrees"].as_array().unwrap().len(),
            1
        );
        assert!(value["polygon"]["material"].is_object());
        let polygon = packets[0].as_polygon().unwrap();
        assert_eq!(polygon.positions.len(), 4);
        assert_eq!(polygon.holes[0].len(), 4);
    }

    #[test]
    fn per_ring_decoration() {
        let packets = coverage(
            &[square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)],
            &[],
            &Decoration::new().per_entity("name", vec![json!("a"), json!("b")]),
            &mut SequentialIds::new(),
        )
        .unwrap();
        assert_eq!(packets[0].properties["name"], json!("a"));
        assert_eq!(packets[1].properties["name"], json!("b"));
    }

    #[test]
    fn short_rings_are_rejected() {
        let short = vec![GeodeticPoint::default(); 2];
        assert!(matches!(
            compose(&[short], &[]),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn raster_to_packets() {
        let rows: Vec<Vec<bool>> = [
            "........",
            ".######.",
            ".######.",
            ".##..##.",
            ".##..##.",
            ".######.",
            ".######.",
            "........",
        ]
        .iter()
        .map(|r| r.chars().map(|c| c == '#').collect())
        .collect();
        let raster = CoverageRaster::from_rows(&rows, GeoTransform::new(34.0, 32.0, 0.01, -0.01)).unwrap();
        let options = ClassifierOptions {
            threshold: 0.8,
            ..Default::default()
        };
        let packets =
            coverage_from_raster(&raster, &options, &Decoration::new(), &mut SequentialIds::new())
                .unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].as_polygon().unwrap().holes.len(), 1);
    }
}
