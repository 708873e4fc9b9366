//! Keplerian propagation of catalog elements
//!
//! A [`KeplerOrbit`] fixes everything about an orbit that does not depend on
//! time (mean motion, orientation) so each query only solves Kepler's
//! equation and rotates the result.

use nalgebra::{Rotation3, Vector3};
use serde::Serialize;

use super::kepler::{elliptic_anomalies, hyperbolic_anomalies, parabolic_anomalies, KeplerConfig};
use crate::catalogs::{OrbitKind, OrbitalElements};
use crate::constants::TAU;
use crate::errors::{OrreryError, Result};
use crate::time::JulianDate;

/// State of a body on its orbit at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitState {
    /// Mean anomaly, radians; in [0, 2π) for elliptic orbits
    pub mean_anomaly: f64,
    /// E, H or tan(ν/2) depending on the orbit kind
    pub eccentric_anomaly: f64,
    pub true_anomaly: f64,
    /// Distance from the parent in km
    pub radius: f64,
    /// Position relative to the parent in km, parent reference frame
    pub position: Vector3<f64>,
}

/// Mean motion in rad/s.
///
/// An explicit period wins for closed orbits. Otherwise the parent's
/// gravitational parameter `parent_mu` (km³/s²) is required.
pub fn mean_motion(elements: &OrbitalElements, parent_mu: Option<f64>) -> Result<f64> {
    let kind = elements.kind();
    if let Some(period) = elements.period {
        if kind != OrbitKind::Elliptic {
            return Err(OrreryError::Domain(format!(
                "an explicit period needs a closed orbit, got e = {}",
                elements.eccentricity
            )));
        }
        return Ok(TAU / period);
    }

    let mu = parent_mu.ok_or_else(|| {
        OrreryError::Domain(
            "mean motion needs an orbital period or a parent with mass or density and radius"
                .to_string(),
        )
    })?;
    let a = elements.semimajor_axis;
    if a <= 0.0 {
        return Err(OrreryError::Domain(format!(
            "semimajor axis must be positive to derive mean motion, got {} km",
            a
        )));
    }

    Ok(match kind {
        OrbitKind::Parabolic => (mu / (2.0 * a.powi(3))).sqrt(),
        OrbitKind::Elliptic | OrbitKind::Hyperbolic => (mu / a.powi(3)).sqrt(),
    })
}

/// Rotation taking perifocal coordinates into the parent frame:
/// Rz(Ω)·Rx(i)·Rz(ω)
pub fn perifocal_rotation(elements: &OrbitalElements) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), elements.longitude_ascending)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), elements.inclination)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), elements.argument_periapsis)
}

/// A propagatable orbit
#[derive(Debug, Clone)]
pub struct KeplerOrbit {
    elements: OrbitalElements,
    mean_motion: f64,
    rotation: Rotation3<f64>,
}

impl KeplerOrbit {
    pub fn new(elements: &OrbitalElements, parent_mu: Option<f64>) -> Result<Self> {
        Ok(Self {
            elements: elements.clone(),
            mean_motion: mean_motion(elements, parent_mu)?,
            rotation: perifocal_rotation(elements),
        })
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    /// Mean motion in rad/s
    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    /// Mean anomaly at `t`; wrapped into [0, 2π) for closed orbits
    pub fn mean_anomaly_at(&self, t: JulianDate) -> f64 {
        let m = self.elements.mean_anomaly
            + self.mean_motion * t.seconds_since(self.elements.epoch);
        match self.elements.kind() {
            OrbitKind::Elliptic => m.rem_euclid(TAU),
            OrbitKind::Parabolic | OrbitKind::Hyperbolic => m,
        }
    }

    pub fn state_at(&self, t: JulianDate, config: &KeplerConfig) -> Result<OrbitState> {
        let e = self.elements.eccentricity;
        let mean_anomaly = self.mean_anomaly_at(t);

        let anomalies = match self.elements.kind() {
            OrbitKind::Elliptic => elliptic_anomalies(mean_anomaly, e, config)?,
            OrbitKind::Hyperbolic => hyperbolic_anomalies(mean_anomaly, e, config)?,
            OrbitKind::Parabolic => parabolic_anomalies(mean_anomaly),
        };

        let radius = self.elements.semimajor_axis * anomalies.radius;
        let nu = anomalies.true_anomaly;
        let perifocal = Vector3::new(radius * nu.cos(), radius * nu.sin(), 0.0);

        Ok(OrbitState {
            mean_anomaly,
            eccentric_anomaly: anomalies.eccentric_anomaly,
            true_anomaly: nu,
            radius,
            position: self.rotation * perifocal,
        })
    }

    /// Position relative to the parent in km
    pub fn position_at(&self, t: JulianDate, config: &KeplerConfig) -> Result<Vector3<f64>> {
        Ok(self.state_at(t, config)?.position)
    }
}
