use bevy::math::{DMat4, DVec3};

use crate::{equals_epsilon, Cartesian3, Cartographic, Ellipsoid, EPSILON14};

/// Local east-north-up axes expressed in the Earth-fixed frame, with the
/// translation set to `origin`.
pub fn east_north_up_to_fixed_frame(origin: DVec3, ellipsoid: Option<&Ellipsoid>) -> DMat4 {
    let east;
    let north;
    let up;
    if origin.equals_epsilon(DVec3::ZERO, Some(EPSILON14), None) {
        east = DVec3::new(0.0, 1.0, 0.0);
        north = DVec3::new(-1.0, 0.0, 0.0);
        up = DVec3::new(0.0, 0.0, 1.0);
    } else if equals_epsilon(origin.x, 0.0, Some(EPSILON14), None)
        && equals_epsilon(origin.y, 0.0, Some(EPSILON14), None)
    {
        // pole: east is fixed, north and up flip with the hemisphere
        let sign = origin.z.signum();
        east = DVec3::new(0.0, 1.0, 0.0);
        north = DVec3::new(-sign, 0.0, 0.0);
        up = DVec3::new(0.0, 0.0, sign);
    } else {
        let ellipsoid = ellipsoid.unwrap_or(&Ellipsoid::WGS84);
        up = ellipsoid
            .geodetic_surface_normal(&origin)
            .unwrap_or(DVec3::new(0.0, 0.0, 1.0));
        east = DVec3::new(-origin.y, origin.x, 0.0).normalize();
        north = up.cross(east);
    }
    DMat4::from_cols_array(&[
        east.x, east.y, east.z, 0.0, //
        north.x, north.y, north.z, 0.0, //
        up.x, up.y, up.z, 0.0, //
        origin.x, origin.y, origin.z, 1.0,
    ])
}

/// Azimuth (clockwise from north), elevation (above the local horizon) and
/// slant range to a local east-north-up offset.
pub fn aer_to_enu(azimuth: f64, elevation: f64, range: f64) -> DVec3 {
    let horizontal = range * elevation.cos();
    DVec3::new(
        horizontal * azimuth.sin(),
        horizontal * azimuth.cos(),
        range * elevation.sin(),
    )
}

/// Places a local azimuth/elevation/range ray (radians, radians, metres)
/// anchored at `origin` and returns its end point as geodetic coordinates.
pub fn local_to_geodetic(
    azimuth: f64,
    elevation: f64,
    range: f64,
    origin: &Cartographic,
    ellipsoid: &Ellipsoid,
) -> Option<Cartographic> {
    let origin_fixed = ellipsoid.cartographic_to_cartesian(origin);
    let frame = east_north_up_to_fixed_frame(origin_fixed, Some(ellipsoid));
    let target = frame.transform_point3(aer_to_enu(azimuth, elevation, range));
    ellipsoid.cartesian_to_cartographic(&target)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use bevy::math::DVec4;

    use super::*;
    use crate::{EPSILON7, EPSILON9};

    #[test]
    fn test_init() {
        let origin = DVec3::new(0.0, 0.0, 1.0);
        let result = east_north_up_to_fixed_frame(origin, None);
        assert_eq!(result.col(0), DVec4::new(0., 1., 0., 0.));
        assert_eq!(result.col(1), DVec4::new(-1., 0., 0., 0.));
        assert_eq!(result.col(2), DVec4::new(0., 0., 1., 0.));
        assert_eq!(result.col(3), DVec4::new(0., 0., 1., 1.));
    }

    #[test]
    fn south_pole_frame_points_down() {
        let result = east_north_up_to_fixed_frame(DVec3::new(0.0, 0.0, -1.0), None);
        assert_eq!(result.col(1), DVec4::new(1., 0., 0., 0.));
        assert_eq!(result.col(2), DVec4::new(0., 0., -1., 0.));
    }

    #[test]
    fn equator_frame() {
        let origin = Ellipsoid::WGS84.cartographic_to_cartesian(&Cartographic::ZERO);
        let result = east_north_up_to_fixed_frame(origin, None);
        assert!(result
            .col(0)
            .truncate()
            .equals_epsilon(DVec3::new(0.0, 1.0, 0.0), Some(EPSILON14), None));
        assert!(result
            .col(1)
            .truncate()
            .equals_epsilon(DVec3::new(0.0, 0.0, 1.0), Some(EPSILON14), None));
        assert!(result
            .col(2)
            .truncate()
            .equals_epsilon(DVec3::new(1.0, 0.0, 0.0), Some(EPSILON14), None));
    }

    #[test]
    fn aer_axes() {
        assert!(aer_to_enu(0.0, 0.0, 10.0).equals_epsilon(
            DVec3::new(0.0, 10.0, 0.0),
            None,
            Some(EPSILON9)
        ));
        assert!(aer_to_enu(FRAC_PI_2, 0.0, 10.0).equals_epsilon(
            DVec3::new(10.0, 0.0, 0.0),
            None,
            Some(EPSILON9)
        ));
        assert!(aer_to_enu(1.0, FRAC_PI_2, 10.0).equals_epsilon(
            DVec3::new(0.0, 0.0, 10.0),
            None,
            Some(EPSILON9)
        ));
    }

    #[test]
    fn zenith_ray_only_gains_height() {
        let origin = Cartographic::from_degrees(34.7, 31.4, 1000.0);
        let end = local_to_geodetic(0.3, FRAC_PI_2, 5000.0, &origin, &Ellipsoid::WGS84).unwrap();
        assert!((end.longitude - origin.longitude).abs() < EPSILON9);
        assert!((end.latitude - origin.latitude).abs() < EPSILON9);
        assert!((end.height - 6000.0).abs() < 1e-4);
    }

    #[test]
    fn north_ray_moves_north() {
        let origin = Cartographic::from_degrees(10.0, 0.0, 0.0);
        let end = local_to_geodetic(0.0, 0.0, 10000.0, &origin, &Ellipsoid::WGS84).unwrap();
        assert!(end.latitude > origin.latitude);
        assert!((end.longitude - origin.longitude).abs() < EPSILON7);
        // the tangent plane rises above the curved surface
        assert!(end.height > 0.0);
    }
}
