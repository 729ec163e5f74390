use bevy::math::DVec3;

use crate::{Cartesian3, Cartographic, EPSILON1, EPSILON12, EPSILON14};

pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6378137.0;
pub const WGS84_SEMI_MINOR_AXIS: f64 = 6356752.314245179;

const MAX_SURFACE_ITERATIONS: usize = 100;

/// A triaxial ellipsoid centred at the origin of an Earth-fixed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub radii: DVec3,
    pub radii_squared: DVec3,
    pub one_over_radii: DVec3,
    pub one_over_radii_squared: DVec3,
    pub minimum_radius: f64,
    pub maximum_radius: f64,
    pub center_tolerance_squared: f64,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Ellipsoid::WGS84
    }
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        radii: DVec3::new(
            WGS84_SEMI_MAJOR_AXIS,
            WGS84_SEMI_MAJOR_AXIS,
            WGS84_SEMI_MINOR_AXIS,
        ),
        radii_squared: DVec3::new(
            WGS84_SEMI_MAJOR_AXIS * WGS84_SEMI_MAJOR_AXIS,
            WGS84_SEMI_MAJOR_AXIS * WGS84_SEMI_MAJOR_AXIS,
            WGS84_SEMI_MINOR_AXIS * WGS84_SEMI_MINOR_AXIS,
        ),
        one_over_radii: DVec3::new(
            1.0 / WGS84_SEMI_MAJOR_AXIS,
            1.0 / WGS84_SEMI_MAJOR_AXIS,
            1.0 / WGS84_SEMI_MINOR_AXIS,
        ),
        one_over_radii_squared: DVec3::new(
            1.0 / (WGS84_SEMI_MAJOR_AXIS * WGS84_SEMI_MAJOR_AXIS),
            1.0 / (WGS84_SEMI_MAJOR_AXIS * WGS84_SEMI_MAJOR_AXIS),
            1.0 / (WGS84_SEMI_MINOR_AXIS * WGS84_SEMI_MINOR_AXIS),
        ),
        minimum_radius: WGS84_SEMI_MINOR_AXIS,
        maximum_radius: WGS84_SEMI_MAJOR_AXIS,
        center_tolerance_squared: EPSILON1,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Ellipsoid {
            radii: DVec3::new(x, y, z),
            radii_squared: DVec3::new(x * x, y * y, z * z),
            one_over_radii: DVec3::new(1.0 / x, 1.0 / y, 1.0 / z),
            one_over_radii_squared: DVec3::new(1.0 / (x * x), 1.0 / (y * y), 1.0 / (z * z)),
            minimum_radius: x.min(y).min(z),
            maximum_radius: x.max(y).max(z),
            center_tolerance_squared: EPSILON1,
        }
    }

    /// Oblate spheroid from its semi-major (equatorial) and semi-minor (polar) axes.
    pub fn from_axes(semi_major_axis: f64, semi_minor_axis: f64) -> Self {
        Ellipsoid::new(semi_major_axis, semi_major_axis, semi_minor_axis)
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.radii.x
    }

    pub fn semi_minor_axis(&self) -> f64 {
        self.radii.z
    }

    pub fn geodetic_surface_normal_cartographic(&self, cartographic: &Cartographic) -> DVec3 {
        let cos_latitude = cartographic.latitude.cos();
        DVec3::new(
            cos_latitude * cartographic.longitude.cos(),
            cos_latitude * cartographic.longitude.sin(),
            cartographic.latitude.sin(),
        )
        .normalize()
    }

    pub fn geodetic_surface_normal(&self, cartesian: &DVec3) -> Option<DVec3> {
        if cartesian.equals_epsilon(DVec3::ZERO, Some(EPSILON14), None) {
            return None;
        }
        Some(cartesian.multiply_components(&self.one_over_radii_squared).normalize())
    }

    pub fn cartographic_to_cartesian(&self, cartographic: &Cartographic) -> DVec3 {
        let n = self.geodetic_surface_normal_cartographic(cartographic);
        let k = self.radii_squared.multiply_components(&n);
        let gamma = n.dot(k).sqrt();
        k / gamma + n * cartographic.height
    }

    /// Projects `cartesian` along the geodetic surface normal onto the
    /// ellipsoid. `None` when the point is too close to the centre, too far
    /// out to square, or the iteration does not converge.
    pub fn scale_to_geodetic_surface(&self, cartesian: &DVec3) -> Option<DVec3> {
        let one_over_radii = self.one_over_radii;
        let one_over_radii_squared = self.one_over_radii_squared;

        let x2 = cartesian.x * cartesian.x * one_over_radii.x * one_over_radii.x;
        let y2 = cartesian.y * cartesian.y * one_over_radii.y * one_over_radii.y;
        let z2 = cartesian.z * cartesian.z * one_over_radii.z * one_over_radii.z;

        let squared_norm = x2 + y2 + z2;
        if !squared_norm.is_finite() {
            return None;
        }
        let ratio = (1.0 / squared_norm).sqrt();
        let intersection = *cartesian * ratio;

        if squared_norm < self.center_tolerance_squared {
            return ratio.is_finite().then_some(intersection);
        }

        let gradient = intersection.multiply_components(&one_over_radii_squared) * 2.0;
        let mut lambda = (1.0 - ratio) * cartesian.length() / (0.5 * gradient.length());
        let mut correction = 0.0;

        let mut multiplier = DVec3::ONE;
        let mut converged = false;
        for _ in 0..MAX_SURFACE_ITERATIONS {
            lambda -= correction;
            if !lambda.is_finite() {
                return None;
            }

            multiplier = DVec3::new(
                1.0 / (1.0 + lambda * one_over_radii_squared.x),
                1.0 / (1.0 + lambda * one_over_radii_squared.y),
                1.0 / (1.0 + lambda * one_over_radii_squared.z),
            );
            let multiplier2 = multiplier.multiply_components(&multiplier);
            let multiplier3 = multiplier2.multiply_components(&multiplier);

            let func = x2 * multiplier2.x + y2 * multiplier2.y + z2 * multiplier2.z - 1.0;
            let denominator = x2 * multiplier3.x * one_over_radii_squared.x
                + y2 * multiplier3.y * one_over_radii_squared.y
                + z2 * multiplier3.z * one_over_radii_squared.z;
            let derivative = -2.0 * denominator;
            correction = func / derivative;

            if !func.is_finite() {
                return None;
            }
            if func.abs() <= EPSILON12 {
                converged = true;
                break;
            }
        }

        converged.then(|| cartesian.multiply_components(&multiplier))
    }

    pub fn cartesian_to_cartographic(&self, cartesian: &DVec3) -> Option<Cartographic> {
        let p = self.scale_to_geodetic_surface(cartesian)?;
        let n = self.geodetic_surface_normal(&p)?;
        let h = *cartesian - p;
        let longitude = n.y.atan2(n.x);
        let latitude = n.z.asin();
        let height = h.dot(*cartesian).signum() * h.length();
        Some(Cartographic::from_radians(longitude, latitude, height))
    }
}
