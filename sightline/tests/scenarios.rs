use serde_json::json;
use sightline::{
    compose, coverage, fov_edges, fov_faces, grid_cells, sightline_coverage, sightline_scene,
    CoordinateArray, CoverageRaster, Decoration, GeoTransform, GeodeticPoint, SensorArray,
    SequentialIds, Settings, Style,
};

fn sensor() -> SensorArray {
    SensorArray::new(
        GeodeticPoint::new(31.4, 34.7, 1000.0),
        10.0,
        30.0,
        100.0,
        20.0,
        10000.0,
    )
    .with_min_range(5000.0)
}

fn square(lon: f64, lat: f64, size: f64) -> Vec<GeodeticPoint> {
    vec![
        GeodeticPoint::new(lat, lon, 0.0),
        GeodeticPoint::new(lat + size, lon, 0.0),
        GeodeticPoint::new(lat + size, lon + size, 0.0),
        GeodeticPoint::new(lat, lon + size, 0.0),
    ]
}

#[test]
fn single_sensor_wireframe() {
    let packets = fov_edges(&sensor(), &Decoration::new(), &mut SequentialIds::new()).unwrap();
    assert_eq!(packets.len(), 16);
    assert!(packets.iter().all(|p| p.as_polyline().is_some()));

    let origin = packets[0].positions()[0];
    assert!((origin.latitude - 31.4).abs() < 1e-9);
    assert!((origin.longitude - 34.7).abs() < 1e-9);
    assert!((origin.altitude - 1000.0).abs() < 1e-6);
}

#[test]
fn single_sensor_mesh_is_decorated() {
    let decoration = Decoration::new()
        .scalar("name", "radar")
        .template(Style::polygon().with("material", json!({"solidColor": {"color": {"rgba": [0, 0, 255, 90]}}})));
    let packets = fov_faces(&sensor(), &decoration, &mut SequentialIds::new()).unwrap();
    // 4 caps, then 9 lunes for each of the two radii
    assert_eq!(packets.len(), 4 + 2 * 9);
    for packet in &packets {
        let value = packet.to_json();
        assert_eq!(value["name"], json!("radar"));
        assert_eq!(value["polygon"]["perPositionHeight"], json!(true));
        assert!(value["polygon"]["material"].is_object());
    }
}

#[test]
fn contained_hole() {
    let composed = compose(&[square(0.0, 0.0, 10.0)], &[square(4.0, 4.0, 2.0)]).unwrap();
    assert_eq!(composed.0.len(), 1);
    assert_eq!(composed.0[0].interiors().len(), 1);
}

#[test]
fn distant_hole_is_dropped() {
    let packets = coverage(
        &[square(0.0, 0.0, 10.0)],
        &[square(40.0, 40.0, 1.0)],
        &Decoration::new(),
        &mut SequentialIds::new(),
    )
    .unwrap();
    assert_eq!(packets.len(), 1);
    assert!(packets[0].as_polygon().unwrap().holes.is_empty());
    assert!(packets[0].to_json()["polygon"].get("holes").is_none());
}

#[test]
fn two_point_grid() {
    let centers = CoordinateArray::from_points(&[
        GeodeticPoint::new(31.0, 34.0, 0.0),
        GeodeticPoint::new(31.2, 34.1, 0.0),
    ]);
    let packets = grid_cells(&centers, &Decoration::new(), &mut SequentialIds::new()).unwrap();
    assert_eq!(packets.len(), 2);
    for packet in &packets {
        let ring = packet.positions();
        let lons = ring.iter().map(|p| p.longitude);
        let lats = ring.iter().map(|p| p.latitude);
        let span = |values: Vec<f64>| {
            values.iter().cloned().fold(f64::MIN, f64::max)
                - values.iter().cloned().fold(f64::MAX, f64::min)
        };
        assert!((span(lons.collect()) - 0.1).abs() < 1e-9);
        assert!((span(lats.collect()) - 0.2).abs() < 1e-9);
    }
}

#[test]
fn mismatched_field_of_view() {
    let sensors = SensorArray::new(
        GeodeticPoint::new(31.4, 34.7, 1000.0),
        10.0,
        30.0,
        vec![100.0, 120.0],
        20.0,
        10000.0,
    );
    let err = fov_edges(&sensors, &Decoration::new(), &mut SequentialIds::new()).unwrap_err();
    assert!(matches!(
        err,
        sightline_scene::Error::MismatchedInputs { expected: 1, actual: 2, .. }
    ));
}

#[test]
fn errors_convert_to_one_type() {
    fn run() -> sightline::Result<usize> {
        let settings = Settings::from_toml_str("[classifier]\nthreshold = 0.6")?;
        let rows: Vec<Vec<bool>> = [
            "..........",
            ".########.",
            ".########.",
            ".##....##.",
            ".##....##.",
            ".##....##.",
            ".########.",
            ".########.",
            "..........",
        ]
        .iter()
        .map(|r| r.chars().map(|c| c == '#').collect())
        .collect();
        let raster = CoverageRaster::from_rows(&rows, GeoTransform::new(34.0, 32.0, 0.01, -0.01))?;
        let packets = sightline::coverage_from_raster(
            &raster,
            &settings.classifier,
            &Decoration::new(),
            &mut SequentialIds::new(),
        )?;
        let edges = fov_edges(&sensor(), &Decoration::new(), &mut SequentialIds::new())?;
        Ok(packets.len() + edges.len())
    }
    assert_eq!(run().unwrap(), 17);

    fn ragged() -> sightline::Result<CoverageRaster> {
        let rows = vec![vec![true; 3], vec![true; 2]];
        Ok(CoverageRaster::from_rows(&rows, GeoTransform::new(0.0, 0.0, 1.0, -1.0))?)
    }
    assert!(matches!(
        ragged(),
        Err(sightline::Error::Coverage(sightline_coverage::Error::RasterSize { .. }))
    ));
}

#[test]
fn packets_serialize_as_documents() {
    let mut ids = SequentialIds::new();
    let mut packets = fov_edges(&sensor(), &Decoration::new(), &mut ids).unwrap();
    ids.reset();
    packets.extend(fov_edges(&sensor(), &Decoration::new(), &mut ids).unwrap());
    assert_eq!(packets[0].id, packets[16].id);

    let text = serde_json::to_string(&packets).unwrap();
    let documents: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(documents.len(), 32);
    let flat = documents[0]["polyline"]["positions"]["cartographicDegrees"]
        .as_array()
        .unwrap();
    assert_eq!(flat.len(), 6);
    assert!((flat[0].as_f64().unwrap() - 34.7).abs() < 1e-9);
    assert!((flat[1].as_f64().unwrap() - 31.4).abs() < 1e-9);
}

#[test]
fn settings_drive_the_generators() {
    let dir = tempfile::tempdir().unwrap();
    let borders = dir.path().join("borders");
    std::fs::create_dir(&borders).unwrap();
    std::fs::write(borders.join("line.border"), "34.0,31.0,34.5,31.5,35.0,32.0").unwrap();
    let path = dir.path().join("sightline.toml");
    std::fs::write(
        &path,
        format!("border_dir = {:?}\n\n[classifier]\nthreshold = 0.8\n", borders.display().to_string()),
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.classifier.threshold, 0.8);
    let registry = settings.border_registry().unwrap();
    let packets = sightline::borders(
        &["Line".into()],
        &2usize.into(),
        &registry,
        &Decoration::new(),
        &mut SequentialIds::new(),
    )
    .unwrap();
    assert_eq!(packets[0].positions().len(), 2);

    let generated = settings
        .fov_generator()
        .edges(&sensor(), &Decoration::new(), &mut SequentialIds::new())
        .unwrap();
    assert_eq!(generated.len(), 16);
}
