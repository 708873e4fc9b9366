//! Ephemeris snapshot and query surface
//!
//! An [`Ephemeris`] bundles a validated catalog with its resolved hierarchy
//! and one precomputed [`KeplerOrbit`] per propagated body. It never changes
//! after construction; share it with `Arc` and swap a fresh one in through an
//! [`EphemerisHandle`] on reload.

use std::sync::Arc;

use log::{debug, info};
use nalgebra::Vector3;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::catalogs::{Catalog, CelestialBody, Star};
use crate::coordinates::SphericalCoordinate;
use crate::errors::{reject_all, OrreryError, Result, Violation};
use crate::hierarchy::{BodyId, Hierarchy};
use crate::orbits::{KeplerConfig, KeplerOrbit, OrbitState};
use crate::rotation::{orientation_at, Orientation};
use crate::stellar::apparent_position;
use crate::time::JulianDate;

/// Snapshot settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemerisConfig {
    pub kepler: KeplerConfig,
    /// Reference epoch of catalog star positions and proper motions
    pub stellar_epoch: JulianDate,
}

impl EphemerisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kepler(mut self, kepler: KeplerConfig) -> Self {
        self.kepler = kepler;
        self
    }

    pub fn with_stellar_epoch(mut self, epoch: JulianDate) -> Self {
        self.stellar_epoch = epoch;
        self
    }
}

/// Immutable catalog snapshot answering position and orientation queries
#[derive(Debug, Clone)]
pub struct Ephemeris {
    catalog: Catalog,
    hierarchy: Hierarchy,
    /// `None` for bodies fixed at the origin of their tree
    orbits: Vec<Option<KeplerOrbit>>,
    config: EphemerisConfig,
}

impl Ephemeris {
    /// Resolve the hierarchy and prepare every orbit.
    ///
    /// Orbits whose mean motion cannot be derived fail here rather than at
    /// query time, all of them in one error.
    pub fn new(catalog: Catalog, config: EphemerisConfig) -> Result<Self> {
        let hierarchy = Hierarchy::resolve(&catalog)?;
        let bodies = catalog.bodies();

        let mut problems = Vec::new();
        let mut orbits = Vec::with_capacity(bodies.len());
        for (i, body) in bodies.iter().enumerate() {
            let orbit = match hierarchy.parent(BodyId(i)) {
                None => None,
                Some(parent) => {
                    let parent_mu = bodies[parent.index()].gravitational_parameter();
                    match KeplerOrbit::new(&body.orbit, parent_mu) {
                        Ok(orbit) => {
                            debug!(
                                "Body '{}' orbits '{}' with mean motion {:.6e} rad/s",
                                body.name,
                                bodies[parent.index()].name,
                                orbit.mean_motion()
                            );
                            Some(orbit)
                        }
                        Err(OrreryError::Domain(message)) => {
                            let record = format!("body '{}'", body.name);
                            problems.push((
                                OrreryError::Domain(format!("{}: {}", record, message)),
                                Violation::new(record, "orbit", message),
                            ));
                            None
                        }
                        Err(other) => return Err(other),
                    }
                }
            };
            orbits.push(orbit);
        }
        reject_all(problems)?;

        info!(
            "Ephemeris ready: {} bodies in {} tree(s), {} stars",
            bodies.len(),
            hierarchy.roots().len(),
            catalog.stars().len()
        );

        Ok(Self {
            catalog,
            hierarchy,
            orbits,
            config,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn config(&self) -> &EphemerisConfig {
        &self.config
    }

    pub fn body_id(&self, name: &str) -> Result<BodyId> {
        self.catalog
            .body_index(name)
            .map(BodyId)
            .ok_or_else(|| OrreryError::Reference(format!("no body named '{}'", name)))
    }

    pub fn body(&self, id: BodyId) -> &CelestialBody {
        &self.catalog.bodies()[id.index()]
    }

    pub fn star(&self, name: &str) -> Result<&Star> {
        self.catalog
            .star(name)
            .ok_or_else(|| OrreryError::Reference(format!("no star named '{}'", name)))
    }

    /// The orbit of `id` about its parent, if it is propagated at all
    pub fn orbit(&self, id: BodyId) -> Option<&KeplerOrbit> {
        self.orbits[id.index()].as_ref()
    }

    /// Full orbital state relative to the parent; `None` for roots
    pub fn orbit_state(&self, id: BodyId, t: JulianDate) -> Result<Option<OrbitState>> {
        self.orbit(id)
            .map(|orbit| orbit.state_at(t, &self.config.kepler))
            .transpose()
    }

    /// Position relative to the parent in km; zero for roots
    pub fn relative_position(&self, id: BodyId, t: JulianDate) -> Result<Vector3<f64>> {
        match self.orbit(id) {
            Some(orbit) => orbit.position_at(t, &self.config.kepler),
            None => Ok(Vector3::zeros()),
        }
    }

    /// Position in the root frame in km
    pub fn position(&self, id: BodyId, t: JulianDate) -> Result<Vector3<f64>> {
        self.hierarchy
            .ancestor_chain(id)
            .iter()
            .try_fold(Vector3::zeros(), |sum, &link| {
                Ok(sum + self.relative_position(link, t)?)
            })
    }

    pub fn position_of(&self, name: &str, t: JulianDate) -> Result<Vector3<f64>> {
        self.position(self.body_id(name)?, t)
    }

    pub fn relative_position_of(&self, name: &str, t: JulianDate) -> Result<Vector3<f64>> {
        self.relative_position(self.body_id(name)?, t)
    }

    /// `Ok(None)` when the body has no rotational elements
    pub fn orientation_of(&self, name: &str, t: JulianDate) -> Result<Option<Orientation>> {
        let id = self.body_id(name)?;
        Ok(orientation_at(self.body(id), t))
    }

    pub fn apparent_position_of(&self, name: &str, t: JulianDate) -> Result<SphericalCoordinate> {
        let star = self.star(name)?;
        Ok(apparent_position(
            star,
            t.julian_years_since(self.config.stellar_epoch),
        ))
    }
}

/// Shared, replaceable reference to the current [`Ephemeris`].
///
/// Readers take an `Arc` snapshot and query it without holding the lock, so a
/// concurrent [`replace`](EphemerisHandle::replace) never changes what an
/// in-flight query sees.
#[derive(Debug)]
pub struct EphemerisHandle {
    current: RwLock<Arc<Ephemeris>>,
}

impl EphemerisHandle {
    pub fn new(ephemeris: Ephemeris) -> Self {
        Self {
            current: RwLock::new(Arc::new(ephemeris)),
        }
    }

    pub fn snapshot(&self) -> Arc<Ephemeris> {
        Arc::clone(&self.current.read())
    }

    /// Install `ephemeris`, returning the snapshot it replaced
    pub fn replace(&self, ephemeris: Ephemeris) -> Arc<Ephemeris> {
        let fresh = Arc::new(ephemeris);
        let previous = std::mem::replace(&mut *self.current.write(), fresh);
        info!("Ephemeris snapshot replaced");
        previous
    }
}

impl From<Ephemeris> for EphemerisHandle {
    fn from(ephemeris: Ephemeris) -> Self {
        Self::new(ephemeris)
    }
}
