//! Two-body orbital propagation
//!
//! [`kepler`] holds the equation solvers; [`propagator`] turns catalog
//! elements into positions relative to the parent body.

pub mod kepler;
pub mod propagator;

pub use kepler::{KeplerConfig, solve_elliptic, solve_hyperbolic, solve_parabolic};
pub use propagator::{KeplerOrbit, OrbitState};
