//! Kepler's equation
//!
//! Solvers for the three conic cases, each returning the anomaly triple the
//! propagator needs:
//!
//! - elliptic, `M = E - e sin E`, Newton-Raphson
//! - hyperbolic, `M = e sinh H - H`, Newton-Raphson
//! - parabolic, Barker's equation `M = D + D³/3` with `D = tan(ν/2)`, closed form
//!
//! The iterative solvers never return an under-converged value: running out of
//! iterations is a [`OrreryError::Convergence`].

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::TAU;
use crate::errors::{OrreryError, Result};

/// Solver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeplerConfig {
    /// Largest accepted |residual| of Kepler's equation, radians
    pub tolerance: f64,
    /// Newton steps allowed before giving up
    pub max_iterations: usize,
}

impl Default for KeplerConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 30,
        }
    }
}

impl KeplerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Solution of Kepler's equation for one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anomalies {
    /// E (elliptic), H (hyperbolic) or D = tan(ν/2) (parabolic)
    pub eccentric_anomaly: f64,
    pub true_anomaly: f64,
    /// Distance from the focus in units of the orbit's length scale
    pub radius: f64,
}

/// Newton-Raphson over `f(x) = 0`, stopping when |f| < tolerance
fn newton<F, D>(
    mut x: f64,
    f: F,
    df: D,
    tolerance: f64,
    config: &KeplerConfig,
    eccentricity: f64,
    mean_anomaly: f64,
) -> Result<f64>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    let mut residual = f(x);
    for _ in 0..config.max_iterations {
        if residual.abs() < tolerance {
            return Ok(x);
        }
        x -= residual / df(x);
        residual = f(x);
    }
    if residual.abs() < tolerance {
        return Ok(x);
    }

    Err(OrreryError::Convergence {
        eccentricity,
        mean_anomaly,
        residual,
        iterations: config.max_iterations,
    })
}

/// Solve `M = E - e sin E` for `0 <= e < 1`.
///
/// E₀ = M when e < 0.8, otherwise π. The result differs from M by less than
/// 2π·k exactly as M itself does, so any revolution count in M is preserved.
pub fn solve_elliptic(mean_anomaly: f64, eccentricity: f64, config: &KeplerConfig) -> Result<f64> {
    let e = eccentricity;
    if !(0.0..1.0).contains(&e) {
        return Err(OrreryError::Domain(format!(
            "elliptic Kepler solver needs 0 <= e < 1, got e = {}",
            e
        )));
    }

    // Solve on [0, 2π) where the π start is guaranteed to converge
    let m = mean_anomaly.rem_euclid(TAU);
    let start = if e < 0.8 { m } else { PI };
    let ea = newton(
        start,
        |ea| m - (ea - e * ea.sin()),
        |ea| -(1.0 - e * ea.cos()),
        config.tolerance,
        config,
        e,
        mean_anomaly,
    )?;

    Ok(ea + (mean_anomaly - m))
}

/// Solve `M = e sinh H - H` for `e > 1`
pub fn solve_hyperbolic(mean_anomaly: f64, eccentricity: f64, config: &KeplerConfig) -> Result<f64> {
    let e = eccentricity;
    if e <= 1.0 || !e.is_finite() {
        return Err(OrreryError::Domain(format!(
            "hyperbolic Kepler solver needs e > 1, got e = {}",
            e
        )));
    }

    let m = mean_anomaly;
    let start = m.signum() * (2.0 * m.abs() / e + 1.8).ln();
    // sinh grows fast; judge the residual relative to the size of M
    let tolerance = config.tolerance * m.abs().max(1.0);
    newton(
        start,
        |h| e * h.sinh() - h - m,
        |h| e * h.cosh() - 1.0,
        tolerance,
        config,
        e,
        m,
    )
}

/// Solve Barker's equation `M = D + D³/3`, returning D = tan(ν/2)
pub fn solve_parabolic(mean_anomaly: f64) -> f64 {
    // D is odd in M; solving for |M| avoids cancellation inside the cube root
    let m = mean_anomaly.abs();
    let y = (1.5 * m + (2.25 * m * m + 1.0).sqrt()).cbrt();
    mean_anomaly.signum() * (y - 1.0 / y)
}

/// Solve an elliptic orbit; radius in units of the semimajor axis
pub fn elliptic_anomalies(mean_anomaly: f64, e: f64, config: &KeplerConfig) -> Result<Anomalies> {
    let ea = solve_elliptic(mean_anomaly, e, config)?;
    let half = ea / 2.0;
    let nu = 2.0 * ((1.0 + e).sqrt() * half.sin()).atan2((1.0 - e).sqrt() * half.cos());
    Ok(Anomalies {
        eccentric_anomaly: ea,
        true_anomaly: nu.rem_euclid(TAU),
        radius: 1.0 - e * ea.cos(),
    })
}

/// Solve a hyperbolic orbit; radius in units of |a|
pub fn hyperbolic_anomalies(mean_anomaly: f64, e: f64, config: &KeplerConfig) -> Result<Anomalies> {
    let h = solve_hyperbolic(mean_anomaly, e, config)?;
    let nu = 2.0 * (((e + 1.0) / (e - 1.0)).sqrt() * (h / 2.0).tanh()).atan();
    Ok(Anomalies {
        eccentric_anomaly: h,
        true_anomaly: nu,
        radius: e * h.cosh() - 1.0,
    })
}

/// Solve a parabolic orbit; radius in units of the periapsis distance
pub fn parabolic_anomalies(mean_anomaly: f64) -> Anomalies {
    let d = solve_parabolic(mean_anomaly);
    Anomalies {
        eccentric_anomaly: d,
        true_anomaly: 2.0 * d.atan(),
        radius: 1.0 + d * d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    #[test]
    fn test_elliptic_residual_sweep() {
        let config = KeplerConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..5000 {
            let e = rng.gen_range(0.0..0.99);
            let m = rng.gen_range(-20.0..20.0);
            let ea = solve_elliptic(m, e, &config).unwrap();
            assert!((m - (ea - e * ea.sin())).abs() < 1e-9, "e={} M={}", e, m);
        }
    }

    #[rstest]
    #[case(0.999, 1e-6)]
    #[case(0.999, 3.1)]
    #[case(0.95, 0.01)]
    #[case(0.0, 2.5)]
    fn test_elliptic_hard_cases(#[case] e: f64, #[case] m: f64) {
        let ea = solve_elliptic(m, e, &KeplerConfig::default()).unwrap();
        assert!((m - (ea - e * ea.sin())).abs() < 1e-9);
    }

    #[test]
    fn test_circular_is_identity() {
        let ea = solve_elliptic(1.234, 0.0, &KeplerConfig::default()).unwrap();
        assert_relative_eq!(ea, 1.234, epsilon = 1e-12);
        let anomalies = elliptic_anomalies(1.234, 0.0, &KeplerConfig::default()).unwrap();
        assert_relative_eq!(anomalies.true_anomaly, 1.234, epsilon = 1e-12);
        assert_relative_eq!(anomalies.radius, 1.0);
    }

    #[rstest]
    #[case(1.0)]
    #[case(1.5)]
    #[case(-0.1)]
    fn test_elliptic_domain(#[case] e: f64) {
        assert!(matches!(
            solve_elliptic(0.5, e, &KeplerConfig::default()),
            Err(OrreryError::Domain(_))
        ));
    }

    #[test]
    fn test_convergence_failure_is_reported() {
        let config = KeplerConfig::new().with_max_iterations(1);
        match solve_elliptic(0.001, 0.99, &config) {
            Err(OrreryError::Convergence {
                iterations,
                residual,
                ..
            }) => {
                assert_eq!(iterations, 1);
                assert!(residual.abs() >= config.tolerance);
            }
            other => panic!("expected convergence error, got {:?}", other),
        }
    }

    #[rstest]
    #[case(1.1, 0.01)]
    #[case(1.5, -3.0)]
    #[case(3.0, 250.0)]
    #[case(1.0001, 0.5)]
    fn test_hyperbolic(#[case] e: f64, #[case] m: f64) {
        let h = solve_hyperbolic(m, e, &KeplerConfig::default()).unwrap();
        assert_relative_eq!(e * h.sinh() - h, m, max_relative = 1e-9, epsilon = 1e-9);
    }

    #[test]
    fn test_hyperbolic_domain() {
        assert!(solve_hyperbolic(0.5, 0.5, &KeplerConfig::default()).is_err());
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.3)]
    #[case(-12.0)]
    #[case(1.0e4)]
    fn test_barker(#[case] m: f64) {
        let d = solve_parabolic(m);
        assert_relative_eq!(d + d.powi(3) / 3.0, m, max_relative = 1e-9, epsilon = 1e-12);
    }

    #[test]
    fn test_true_anomaly_at_apsides() {
        let config = KeplerConfig::default();
        let peri = elliptic_anomalies(0.0, 0.5, &config).unwrap();
        assert_relative_eq!(peri.true_anomaly, 0.0, epsilon = 1e-12);
        assert_relative_eq!(peri.radius, 0.5, epsilon = 1e-12);

        let apo = elliptic_anomalies(PI, 0.5, &config).unwrap();
        assert_relative_eq!(apo.true_anomaly, PI, epsilon = 1e-9);
        assert_relative_eq!(apo.radius, 1.5, epsilon = 1e-12);

        let parabola = parabolic_anomalies(0.0);
        assert_relative_eq!(parabola.radius, 1.0);
    }
}
