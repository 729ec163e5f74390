/// Reduces `angle` into `[0, period)`.
pub fn wrap(angle: f64, period: f64) -> f64 {
    let wrapped = angle.rem_euclid(period);
    // rem_euclid rounds tiny negative inputs up to `period`
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// Longitude in degrees reduced into `(-180, 180]`.
pub fn wrap_longitude_degrees(longitude: f64) -> f64 {
    if longitude > -180.0 && longitude <= 180.0 {
        return longitude;
    }
    180.0 - wrap(180.0 - longitude, 360.0)
}
