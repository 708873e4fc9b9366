pub mod angle;

pub use angle::{format_dms, format_hms, parse_dms, parse_hms};

use crate::constants::{DEG2RAD, TAU};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

/// Position on the celestial sphere, optionally with a distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalCoordinate {
    /// Right ascension in radians, in [0, 2π)
    pub ra: f64,
    /// Declination in radians, in [-π/2, π/2]
    pub dec: f64,
    /// Distance in light-years, when the catalog gives one
    pub distance_ly: Option<f64>,
    /// Rate of change of distance in light-years per Julian year
    pub distance_rate: Option<f64>,
}

impl SphericalCoordinate {
    /// Direction-only coordinate; right ascension is wrapped into [0, 2π)
    pub fn new(ra: f64, dec: f64) -> Self {
        Self {
            ra: ra.rem_euclid(TAU),
            dec,
            distance_ly: None,
            distance_rate: None,
        }
    }

    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self::new(ra_deg * DEG2RAD, dec_deg * DEG2RAD)
    }

    pub fn with_distance(mut self, distance_ly: f64) -> Self {
        self.distance_ly = Some(distance_ly);
        self
    }

    /// Wrap a declination that ran past a pole back onto the sphere.
    ///
    /// Crossing a pole flips the right ascension by 12 hours.
    pub fn folded(ra: f64, dec: f64) -> Self {
        let mut ra = ra;
        // Bring dec into (-π, π] first so a single reflection suffices
        let mut dec = (dec + PI).rem_euclid(TAU) - PI;
        if dec > FRAC_PI_2 {
            dec = PI - dec;
            ra += PI;
        } else if dec < -FRAC_PI_2 {
            dec = -PI - dec;
            ra += PI;
        }
        Self::new(ra, dec)
    }

    /// Unit vector in the equatorial frame
    pub fn unit_vector(&self) -> Vector3<f64> {
        let cos_dec = self.dec.cos();
        Vector3::new(cos_dec * self.ra.cos(), cos_dec * self.ra.sin(), self.dec.sin())
    }

    /// Angle between two directions in radians
    pub fn angle_between(&self, other: &Self) -> f64 {
        self.unit_vector().angle(&other.unit_vector())
    }
}

impl fmt::Display for SphericalCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(RA, Dec):  {} ,  {}", format_hms(self.ra), format_dms(self.dec))?;
        if let Some(distance) = self.distance_ly {
            write!(f, "  at {} ly", distance)?;
        }
        Ok(())
    }
}
