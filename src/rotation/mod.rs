//! Rotational state of bodies
//!
//! Prime meridian angle grows linearly from its value at the rotation epoch.
//! Pole directions are fixed in the reference frame; there is no precession.

use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;

use crate::catalogs::{CelestialBody, RotationalElements};
use crate::constants::DEG2RAD;
use crate::coordinates::SphericalCoordinate;
use crate::time::JulianDate;

/// Orientation of a body at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Orientation {
    /// North pole direction
    pub pole: SphericalCoordinate,
    /// Prime meridian angle W in degrees, in [0, 360)
    pub meridian_deg: f64,
    /// Body-fixed frame to reference frame
    pub rotation: UnitQuaternion<f64>,
    /// North pole as a unit vector in the reference frame
    pub north_pole: Vector3<f64>,
}

impl Orientation {
    /// Express a body-fixed vector in the reference frame
    pub fn to_reference(&self, body_fixed: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * body_fixed
    }
}

/// Prime meridian angle in degrees at `t`, in [0, 360)
pub fn meridian_at(rotation: &RotationalElements, t: JulianDate) -> f64 {
    let rate = 360.0 / rotation.period;
    (rotation.meridian + rate * t.seconds_since(rotation.epoch)).rem_euclid(360.0)
}

/// Rotation Rz(90° + α)·Rx(90° − δ)·Rz(W) for pole (α, δ) and meridian W
pub fn body_frame_rotation(pole: &SphericalCoordinate, meridian_deg: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 90.0 * DEG2RAD + pole.ra)
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 90.0 * DEG2RAD - pole.dec)
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), meridian_deg * DEG2RAD)
}

pub fn orientation_from(rotation: &RotationalElements, t: JulianDate) -> Orientation {
    let meridian_deg = meridian_at(rotation, t);
    Orientation {
        pole: rotation.pole,
        meridian_deg,
        rotation: body_frame_rotation(&rotation.pole, meridian_deg),
        north_pole: rotation.pole.unit_vector(),
    }
}

/// Orientation of `body` at `t`, or `None` when the catalog gives no rotation
pub fn orientation_at(body: &CelestialBody, t: JulianDate) -> Option<Orientation> {
    body.rotation.as_ref().map(|rotation| orientation_from(rotation, t))
}
