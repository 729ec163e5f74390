use bevy::log::debug;

use crate::{
    Axis, CoordinateArray, Decoration, Error, GeodeticPoint, IdGenerator, Packet, Polygon, Result,
    Rgba, Target,
};

pub const GRID_OUTLINE_COLOR: Rgba = [255, 255, 255, 255];

/// Lattice spacing in degrees, the smallest nonzero gap seen along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPitch {
    pub latitude: f64,
    pub longitude: f64,
}

impl CellPitch {
    pub fn half_height(&self) -> f64 {
        self.latitude / 2.0
    }

    pub fn half_width(&self) -> f64 {
        self.longitude / 2.0
    }
}

pub fn cell_pitch(centers: &[GeodeticPoint]) -> Result<CellPitch> {
    Ok(CellPitch {
        latitude: min_gap(centers.iter().map(|p| p.latitude), Axis::Latitude)?,
        longitude: min_gap(centers.iter().map(|p| p.longitude), Axis::Longitude)?,
    })
}

fn min_gap(values: impl Iterator<Item = f64>, axis: Axis) -> Result<f64> {
    let mut values: Vec<f64> = values.collect();
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(Error::invalid_value(
            &axis.to_string(),
            format!("{bad} is not finite"),
        ));
    }
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .min_by(f64::total_cmp)
        .ok_or(Error::UndefinedCellPitch(axis))
}

/// One rectangle per center, flattened to the ellipsoid surface, sized by
/// the inferred [`CellPitch`].
pub fn grid_cells(
    centers: &CoordinateArray,
    decoration: &Decoration,
    ids: &mut dyn IdGenerator,
) -> Result<Vec<Packet>> {
    let centers: Vec<GeodeticPoint> = centers
        .stacked_points()?
        .into_iter()
        .map(|p| p.with_altitude(0.0))
        .collect();
    let pitch = cell_pitch(&centers)?;
    let decorations = decoration.resolve(centers.len(), Target::GRID_CELL)?;

    let (hw, hh) = (pitch.half_width(), pitch.half_height());
    let packets: Vec<Packet> = centers
        .iter()
        .zip(&decorations)
        .map(|(center, decoration)| {
            let corner = |dlon: f64, dlat: f64| {
                GeodeticPoint::new(center.latitude + dlat, center.longitude + dlon, 0.0).wrapped()
            };
            let polygon = Polygon {
                positions: vec![
                    corner(-hw, -hh),
                    corner(-hw, hh),
                    corner(hw, hh),
                    corner(hw, -hh),
                ],
                outline: Some(true),
                outline_color: Some(GRID_OUTLINE_COLOR),
                ..Default::default()
            };
            Packet::polygon(ids.next_id("cell"), polygon, decoration)
        })
        .collect();
    debug!(
        "grid: {} cells, pitch {:.6} x {:.6} deg",
        packets.len(),
        pitch.latitude,
        pitch.longitude
    );
    Ok(packets)
}
