use std::f64::consts::TAU;

use bevy::log::debug;
use serde_json::Value;
use sightline_math::{local_to_geodetic, wrap, Cartographic, Ellipsoid};

use crate::{
    Broadcast, CoordinateArray, Decoration, EntityDecoration, Error, GeodeticPoint, IdGenerator,
    Packet, Polygon, Result, Target,
};

pub const DEFAULT_ARC_POINTS: usize = 10;

/// `(label, azimuth fraction, elevation fraction)` of the four corner rays.
const CORNERS: [(&str, f64, f64); 4] = [
    ("00", 0.0, 0.0),
    ("01", 1.0, 0.0),
    ("11", 1.0, 1.0),
    ("10", 0.0, 1.0),
];

/// Sensor parameters as supplied, each broadcast against the origins.
/// Angles are in degrees and ranges in metres.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorArray {
    pub origins: CoordinateArray,
    pub azimuth_broadside: Broadcast<f64>,
    pub elevation_broadside: Broadcast<f64>,
    pub azimuth_fov: Broadcast<f64>,
    pub elevation_fov: Broadcast<f64>,
    pub max_range: Broadcast<f64>,
    pub min_range: Broadcast<f64>,
    pub arc_points: Broadcast<usize>,
}

impl SensorArray {
    pub fn new(
        origins: impl Into<CoordinateArray>,
        azimuth_broadside: impl Into<Broadcast<f64>>,
        elevation_broadside: impl Into<Broadcast<f64>>,
        azimuth_fov: impl Into<Broadcast<f64>>,
        elevation_fov: impl Into<Broadcast<f64>>,
        max_range: impl Into<Broadcast<f64>>,
    ) -> Self {
        Self {
            origins: origins.into(),
            azimuth_broadside: azimuth_broadside.into(),
            elevation_broadside: elevation_broadside.into(),
            azimuth_fov: azimuth_fov.into(),
            elevation_fov: elevation_fov.into(),
            max_range: max_range.into(),
            min_range: Broadcast::Scalar(0.0),
            arc_points: Broadcast::Scalar(DEFAULT_ARC_POINTS),
        }
    }

    pub fn with_min_range(mut self, min_range: impl Into<Broadcast<f64>>) -> Self {
        self.min_range = min_range.into();
        self
    }

    pub fn with_arc_points(mut self, arc_points: impl Into<Broadcast<usize>>) -> Self {
        self.arc_points = arc_points.into();
        self
    }

    /// Reads an object keyed by the field names of this struct; `min_range`
    /// and `arc_points` are optional.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| Error::InvalidParameterType {
            name: "sensors".to_string(),
            reason: "expected an object".to_string(),
        })?;
        let field = |name: &str| {
            object
                .get(name)
                .ok_or_else(|| Error::invalid_value(name, "missing"))
        };

        let mut sensors = Self::new(
            CoordinateArray::from_json(field("origins")?)?,
            Broadcast::from_json("azimuth_broadside", field("azimuth_broadside")?)?,
            Broadcast::from_json("elevation_broadside", field("elevation_broadside")?)?,
            Broadcast::from_json("azimuth_fov", field("azimuth_fov")?)?,
            Broadcast::from_json("elevation_fov", field("elevation_fov")?)?,
            Broadcast::from_json("max_range", field("max_range")?)?,
        );
        if let Some(min_range) = object.get("min_range") {
            sensors.min_range = Broadcast::from_json("min_range", min_range)?;
        }
        if let Some(arc_points) = object.get("arc_points") {
            sensors.arc_points = Broadcast::from_json("arc_points", arc_points)?;
        }
        Ok(sensors)
    }

    /// Validates shapes, lengths and values and yields one spec per origin.
    pub fn resolve(&self) -> Result<Vec<SensorSpec>> {
        let origins = self.origins.sensor_points()?;
        let count = origins.len();
        let azimuth_broadside = self.azimuth_broadside.resolve("azimuth_broadside", count)?;
        let elevation_broadside = self
            .elevation_broadside
            .resolve("elevation_broadside", count)?;
        let azimuth_fov = self.azimuth_fov.resolve("azimuth_fov", count)?;
        let elevation_fov = self.elevation_fov.resolve("elevation_fov", count)?;
        let max_range = self.max_range.resolve("max_range", count)?;
        let min_range = self.min_range.resolve("min_range", count)?;
        let arc_points = self.arc_points.resolve("arc_points", count)?;

        let specs = (0..count)
            .map(|i| SensorSpec {
                origin: origins[i],
                azimuth_broadside: azimuth_broadside[i],
                elevation_broadside: elevation_broadside[i],
                azimuth_fov: azimuth_fov[i],
                elevation_fov: elevation_fov[i],
                max_range: max_range[i],
                min_range: min_range[i],
                arc_points: arc_points[i],
            })
            .collect::<Vec<_>>();
        for spec in &specs {
            spec.validate()?;
        }
        Ok(specs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSpec {
    pub origin: GeodeticPoint,
    pub azimuth_broadside: f64,
    pub elevation_broadside: f64,
    pub azimuth_fov: f64,
    pub elevation_fov: f64,
    pub max_range: f64,
    pub min_range: f64,
    pub arc_points: usize,
}

impl SensorSpec {
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("latitude", self.origin.latitude),
            ("longitude", self.origin.longitude),
            ("altitude", self.origin.altitude),
            ("azimuth_broadside", self.azimuth_broadside),
            ("elevation_broadside", self.elevation_broadside),
            ("azimuth_fov", self.azimuth_fov),
            ("elevation_fov", self.elevation_fov),
            ("max_range", self.max_range),
            ("min_range", self.min_range),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(Error::invalid_value(name, format!("{value} is not finite")));
            }
        }
        if !(-90.0..=90.0).contains(&self.origin.latitude) {
            return Err(Error::invalid_value(
                "latitude",
                format!("{} is outside [-90, 90]", self.origin.latitude),
            ));
        }
        if self.min_range < 0.0 {
            return Err(Error::invalid_value("min_range", "must not be negative"));
        }
        if self.max_range <= 0.0 {
            return Err(Error::invalid_value("max_range", "must be positive"));
        }
        if self.min_range > self.max_range {
            return Err(Error::invalid_value("min_range", "must not exceed max_range"));
        }
        if self.arc_points < 2 {
            return Err(Error::invalid_value("arc_points", "at least 2 points are needed"));
        }
        Ok(())
    }
}

/// One sensor in radians, alive for a single generator call.
struct FovFrame {
    index: usize,
    origin: Cartographic,
    origin_point: GeodeticPoint,
    azimuth: f64,
    elevation: f64,
    azimuth_fov: f64,
    elevation_fov: f64,
    min_range: f64,
    max_range: f64,
    arc_points: usize,
}

impl FovFrame {
    fn new(index: usize, spec: &SensorSpec) -> Self {
        Self {
            index,
            origin: spec.origin.to_cartographic(),
            origin_point: spec.origin.wrapped(),
            azimuth: spec.azimuth_broadside.to_radians(),
            elevation: spec.elevation_broadside.to_radians(),
            azimuth_fov: spec.azimuth_fov.to_radians(),
            elevation_fov: spec.elevation_fov.to_radians(),
            min_range: spec.min_range,
            max_range: spec.max_range,
            arc_points: spec.arc_points,
        }
    }

    fn radii(&self) -> impl Iterator<Item = f64> {
        [self.min_range, self.max_range]
            .into_iter()
            .filter(|range| *range > 0.0)
    }

    /// Evenly spaced positions across the field of view, both ends included.
    fn fractions(&self) -> impl DoubleEndedIterator<Item = f64> {
        let last = (self.arc_points - 1) as f64;
        (0..self.arc_points).map(move |k| k as f64 / last)
    }

    fn azimuth_at(&self, fraction: f64) -> f64 {
        wrap(
            self.azimuth - self.azimuth_fov / 2.0 + self.azimuth_fov * fraction,
            TAU,
        )
    }

    // A half-turn period would send negative elevations behind the sensor.
    fn elevation_at(&self, fraction: f64) -> f64 {
        wrap(
            self.elevation - self.elevation_fov / 2.0 + self.elevation_fov * fraction,
            TAU,
        )
    }
}

/// Builds the boundary of each sensor's field of view.
#[derive(Debug, Clone, Copy, Default)]
pub struct FovGenerator {
    pub ellipsoid: Ellipsoid,
}

impl FovGenerator {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    /// Wireframe: per nonzero radius, four corner edges from the origin,
    /// then the two elevation arcs, then the two azimuth arcs.
    pub fn edges(
        &self,
        sensors: &SensorArray,
        decoration: &Decoration,
        ids: &mut dyn IdGenerator,
    ) -> Result<Vec<Packet>> {
        let specs = sensors.resolve()?;
        let decorations = decoration.resolve(specs.len(), Target::POLYLINE)?;

        let mut packets = Vec::new();
        for (index, (spec, decoration)) in specs.iter().zip(&decorations).enumerate() {
            let frame = FovFrame::new(index, spec);
            for range in frame.radii() {
                for (label, azimuth_side, elevation_side) in CORNERS {
                    let corner = self.place(
                        &frame,
                        frame.azimuth_at(azimuth_side),
                        frame.elevation_at(elevation_side),
                        range,
                    )?;
                    let id = ids.next_id(&format!("edge{label}"));
                    packets.push(Packet::polyline(
                        id,
                        vec![frame.origin_point, corner],
                        decoration,
                    ));
                }
                for side in [0.0, 1.0] {
                    let azimuth = frame.azimuth_at(side);
                    let arc = frame
                        .fractions()
                        .map(|f| self.place(&frame, azimuth, frame.elevation_at(f), range))
                        .collect::<Result<Vec<_>>>()?;
                    packets.push(Packet::polyline(ids.next_id("elevation-arc"), arc, decoration));
                }
                for side in [0.0, 1.0] {
                    let elevation = frame.elevation_at(side);
                    let arc = frame
                        .fractions()
                        .map(|f| self.place(&frame, frame.azimuth_at(f), elevation, range))
                        .collect::<Result<Vec<_>>>()?;
                    packets.push(Packet::polyline(ids.next_id("azimuth-arc"), arc, decoration));
                }
            }
        }
        debug!(
            "fov edges: {} polylines for {} sensors",
            packets.len(),
            specs.len()
        );
        Ok(packets)
    }

    /// Closed mesh: two azimuth end caps, two elevation end caps, then for
    /// each nonzero radius a band of strips between consecutive elevation
    /// rows.
    pub fn faces(
        &self,
        sensors: &SensorArray,
        decoration: &Decoration,
        ids: &mut dyn IdGenerator,
    ) -> Result<Vec<Packet>> {
        let specs = sensors.resolve()?;
        let decorations = decoration.resolve(specs.len(), Target::FOV_POLYGON)?;

        let mut packets = Vec::new();
        for (index, (spec, decoration)) in specs.iter().zip(&decorations).enumerate() {
            let frame = FovFrame::new(index, spec);
            for side in [0.0, 1.0] {
                let azimuth = frame.azimuth_at(side);
                let ring = self.cap(&frame, |f| (azimuth, frame.elevation_at(f)))?;
                packets.push(mesh_polygon(ids.next_id("azimuth-cap"), ring, decoration));
            }
            for side in [0.0, 1.0] {
                let elevation = frame.elevation_at(side);
                let ring = self.cap(&frame, |f| (frame.azimuth_at(f), elevation))?;
                packets.push(mesh_polygon(ids.next_id("elevation-cap"), ring, decoration));
            }
            for range in frame.radii() {
                let mut previous: Option<Vec<GeodeticPoint>> = None;
                for (row_index, row_fraction) in frame.fractions().enumerate() {
                    let elevation = frame.elevation_at(row_fraction);
                    let row = frame
                        .fractions()
                        .map(|f| if row_index % 2 == 0 { f } else { 1.0 - f })
                        .map(|f| self.place(&frame, frame.azimuth_at(f), elevation, range))
                        .collect::<Result<Vec<_>>>()?;
                    if let Some(mut ring) = previous.take() {
                        ring.extend_from_slice(&row);
                        packets.push(mesh_polygon(ids.next_id("lune"), ring, decoration));
                    }
                    previous = Some(row);
                }
            }
        }
        debug!(
            "fov faces: {} polygons for {} sensors",
            packets.len(),
            specs.len()
        );
        Ok(packets)
    }

    /// The sweep at minimum range followed by the reversed sweep at maximum
    /// range. With no minimum range the near side is the origin alone.
    fn cap(
        &self,
        frame: &FovFrame,
        sweep: impl Fn(f64) -> (f64, f64),
    ) -> Result<Vec<GeodeticPoint>> {
        let mut ring = Vec::with_capacity(2 * frame.arc_points);
        if frame.min_range > 0.0 {
            for f in frame.fractions() {
                let (azimuth, elevation) = sweep(f);
                ring.push(self.place(frame, azimuth, elevation, frame.min_range)?);
            }
        } else {
            ring.push(frame.origin_point);
        }
        for f in frame.fractions().rev() {
            let (azimuth, elevation) = sweep(f);
            ring.push(self.place(frame, azimuth, elevation, frame.max_range)?);
        }
        Ok(ring)
    }

    fn place(
        &self,
        frame: &FovFrame,
        azimuth: f64,
        elevation: f64,
        range: f64,
    ) -> Result<GeodeticPoint> {
        local_to_geodetic(azimuth, elevation, range, &frame.origin, &self.ellipsoid)
            .map(|c| GeodeticPoint::from_cartographic(&c))
            .ok_or(Error::Transform(frame.index))
    }
}

fn mesh_polygon(id: String, ring: Vec<GeodeticPoint>, decoration: &EntityDecoration) -> Packet {
    let polygon = Polygon {
        positions: ring,
        per_position_height: Some(true),
        ..Default::default()
    };
    Packet::polygon(id, polygon, decoration)
}

/// [`FovGenerator::edges`] on WGS84.
pub fn fov_edges(
    sensors: &SensorArray,
    decoration: &Decoration,
    ids: &mut dyn IdGenerator,
) -> Result<Vec<Packet>> {
    FovGenerator::default().edges(sensors, decoration, ids)
}

/// [`FovGenerator::faces`] on WGS84.
pub fn fov_faces(
    sensors: &SensorArray,
    decoration: &Decoration,
    ids: &mut dyn IdGenerator,
) -> Result<Vec<Packet>> {
    FovGenerator::default().faces(sensors, decoration, ids)
}
