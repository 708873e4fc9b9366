//! Linear proper-motion extrapolation of catalog star positions
//!
//! Stars move in a straight line on the sky at their catalog rates. There is
//! no precession, parallax or light-time correction.

use crate::catalogs::{ProperMotion, Star};
use crate::constants::{JULIAN_YEAR_S, LIGHT_YEAR_KM, MAS2RAD};
use crate::coordinates::SphericalCoordinate;

/// Below this |cos δ| the right ascension rate is not applied
const POLE_COS_LIMIT: f64 = 1e-9;

/// Radial velocity in km/s expressed in light-years per Julian year
pub fn radial_velocity_ly_per_year(velocity_kms: f64) -> f64 {
    velocity_kms * JULIAN_YEAR_S / LIGHT_YEAR_KM
}

/// Position of `star` after `years` Julian years from the catalog epoch
pub fn apparent_position(star: &Star, years: f64) -> SphericalCoordinate {
    let location = star.location;
    let motion = star.motion.unwrap_or_default();
    let ProperMotion {
        right_asc,
        decl,
        radial,
    } = motion;

    let cos_dec = location.dec.cos();
    let ra_rate = match right_asc {
        Some(rate) if cos_dec.abs() > POLE_COS_LIMIT => rate * MAS2RAD / cos_dec,
        _ => 0.0,
    };
    let dec_rate = decl.unwrap_or(0.0) * MAS2RAD;

    let mut position = SphericalCoordinate::folded(
        location.ra + ra_rate * years,
        location.dec + dec_rate * years,
    );

    if let Some(distance) = location.distance_ly {
        let rate = radial.map(radial_velocity_ly_per_year).unwrap_or(0.0);
        position.distance_ly = Some((distance + rate * years).max(0.0));
        position.distance_rate = Some(rate);
    }
    position
}
