//! End-to-end queries against the bundled test catalog

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use tempfile::TempDir;

use orrery::constants::{DAY_S, DEG2RAD, MAS2RAD, TAU};
use orrery::hierarchy::BodyId;
use orrery::{Ephemeris, EphemerisConfig, EphemerisHandle, JulianDate, Loader, OrreryError};

fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/catalog.xml")
}

fn ephemeris() -> Ephemeris {
    Loader::new()
        .with_default_paths(false)
        .with_path(catalog_path())
        .load_ephemeris(EphemerisConfig::default())
        .unwrap()
}

#[test]
fn test_sun_is_the_fixed_root() {
    let eph = ephemeris();
    let sun = eph.body_id("Sun").unwrap();
    assert!(eph.hierarchy().is_root(sun));
    assert_eq!(eph.hierarchy().roots(), &[sun]);
    assert!(eph.orbit(sun).is_none());

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let t = JulianDate::J2000 + rng.gen_range(-50_000.0..50_000.0);
        assert_eq!(eph.position_of("Sun", t).unwrap(), Vector3::zeros());
        assert_eq!(eph.position_of("sol", t).unwrap(), Vector3::zeros());
    }
}

#[test]
fn test_earth_reproduces_mean_anomaly_at_epoch() {
    let eph = ephemeris();
    let earth = eph.body_id("Earth").unwrap();
    let state = eph.orbit_state(earth, JulianDate::J2000).unwrap().unwrap();
    assert_relative_eq!(
        state.mean_anomaly,
        (-2.48284 * DEG2RAD).rem_euclid(TAU),
        epsilon = 1e-12
    );
    assert!((0.0..TAU).contains(&state.mean_anomaly));

    // The solved eccentric anomaly satisfies Kepler's equation
    let e = 0.0167086;
    let residual = state.eccentric_anomaly - e * state.eccentric_anomaly.sin() - state.mean_anomaly;
    assert!(residual.abs() < 1e-9, "residual = {:e}", residual);
}

#[test]
fn test_earth_year_and_distance_bounds() {
    let eph = ephemeris();
    let earth = eph.body_id("Earth").unwrap();
    let orbit = eph.orbit(earth).unwrap();
    assert_relative_eq!(TAU / orbit.mean_motion() / DAY_S, 365.25, max_relative = 1e-3);

    let (a, e) = (149_598_023.0, 0.0167086);
    let mut rng = StdRng::seed_from_u64(2000);
    for _ in 0..200 {
        let t = JulianDate::J2000 + rng.gen_range(-36_525.0..36_525.0);
        let r = eph.position_of("Earth", t).unwrap().norm();
        assert!(r >= a * (1.0 - e) - 1e-3 && r <= a * (1.0 + e) + 1e-3, "r = {}", r);
    }

    // One orbital period later the planet is back where it started
    let t0 = JulianDate::J2000 + 123.0;
    let period_days = TAU / orbit.mean_motion() / DAY_S;
    let p0 = eph.position_of("Earth", t0).unwrap();
    let p1 = eph.position_of("Earth", t0 + period_days).unwrap();
    assert_relative_eq!(p0, p1, max_relative = 1e-6);
}

#[test]
fn test_moon_is_placed_relative_to_earth() {
    let eph = ephemeris();
    let t = JulianDate::new(2_460_000.5);
    let earth = eph.position_of("Earth", t).unwrap();
    let moon = eph.position_of("luna", t).unwrap();
    let relative = eph.relative_position_of("Moon", t).unwrap();

    assert_relative_eq!(moon, earth + relative, max_relative = 1e-12);
    let (a, e) = (384_399.0, 0.0549);
    let r = relative.norm();
    assert!(r >= a * (1.0 - e) - 1e-3 && r <= a * (1.0 + e) + 1e-3);

    // Mean motion comes from Earth's mass: roughly a 27 day month
    let moon_id = eph.body_id("Moon").unwrap();
    let month = TAU / eph.orbit(moon_id).unwrap().mean_motion() / DAY_S;
    assert!((27.0..28.0).contains(&month), "month = {}", month);
    assert_eq!(eph.hierarchy().ancestor_chain(moon_id).len(), 3);
}

#[rstest]
#[case(0.0)]
#[case(-200.0)]
#[case(365.0)]
#[case(3650.0)]
fn test_hyperbolic_visitor_propagates(#[case] days_from_perihelion: f64) {
    let eph = ephemeris();
    let id = eph.body_id("1I/2017 U1").unwrap();
    let epoch = eph.body(id).orbit.epoch;
    let state = eph
        .orbit_state(id, epoch + days_from_perihelion)
        .unwrap()
        .unwrap();

    let q = 190_340_000.0 * (1.20113 - 1.0);
    assert!(state.radius.is_finite());
    assert!(state.radius >= q * (1.0 - 1e-9));
    assert_relative_eq!(state.position.norm(), state.radius, max_relative = 1e-9);
    if days_from_perihelion == 0.0 {
        assert_relative_eq!(state.radius, q, max_relative = 1e-9);
    } else {
        assert_eq!(state.mean_anomaly.signum(), days_from_perihelion.signum());
    }
}

#[test]
fn test_orientation_undefined_versus_zero() {
    let eph = ephemeris();
    assert_eq!(eph.orientation_of("Sun", JulianDate::J2000).unwrap(), None);

    let ceres = eph
        .orientation_of("Ceres", JulianDate::J2000)
        .unwrap()
        .unwrap();
    assert_abs_diff_eq!(ceres.meridian_deg, 0.0, epsilon = 1e-9);
    assert_relative_eq!(ceres.north_pole, Vector3::z(), epsilon = 1e-12);
}

#[test]
fn test_earth_meridian_is_periodic() {
    let eph = ephemeris();
    let t = JulianDate::new(2_459_000.25);
    let sidereal_day = 86_164.0905 / DAY_S;
    let w0 = eph.orientation_of("Earth", t).unwrap().unwrap().meridian_deg;
    let w1 = eph
        .orientation_of("Earth", t + sidereal_day)
        .unwrap()
        .unwrap()
        .meridian_deg;
    let diff = (w0 - w1).abs();
    assert!(diff.min(360.0 - diff) < 1e-4);
}

#[test]
fn test_star_proper_motion() {
    let eph = ephemeris();
    let sirius = eph.catalog().star("Sirius").unwrap().location;
    let century = JulianDate::J2000 + 36_525.0;
    let moved = eph.apparent_position_of("dog star", century).unwrap();

    assert_relative_eq!(moved.dec - sirius.dec, -1223.07 * 100.0 * MAS2RAD, epsilon = 1e-10);
    assert_relative_eq!(
        (moved.ra - sirius.ra) * sirius.dec.cos(),
        -546.01 * 100.0 * MAS2RAD,
        epsilon = 1e-10
    );
    let distance = moved.distance_ly.unwrap();
    assert!(distance < 8.6 && distance > 8.59);

    // The reference epoch is configurable
    let config = EphemerisConfig::new().with_stellar_epoch(century);
    let shifted = Ephemeris::new(eph.catalog().clone(), config).unwrap();
    let at_epoch = shifted.apparent_position_of("Sirius", century).unwrap();
    assert_relative_eq!(at_epoch.ra, sirius.ra, epsilon = 1e-12);
    assert_relative_eq!(at_epoch.dec, sirius.dec, epsilon = 1e-12);
}

#[test]
fn test_unknown_targets_are_reference_errors() {
    let eph = ephemeris();
    let t = JulianDate::J2000;
    for result in [
        eph.position_of("Vulcan", t).map(|_| ()),
        eph.orientation_of("Vulcan", t).map(|_| ()),
        eph.apparent_position_of("Earth", t).map(|_| ()),
    ] {
        assert!(matches!(result, Err(OrreryError::Reference(_))));
    }
}

const EARTH_FARTHER: &str = r#"<catalog>
    <body name="Earth" type="planet" parent="Sun">
        <orbit eccentricity="0" semimajor="300000000" period="31557600" inclination="0"
               longitude-ascending="0" argument-periapsis="0">
            <point mean-anomaly="0"/>
        </orbit>
        <physical mass="5.97237e24"/>
    </body>
</catalog>"#;

#[test]
fn test_later_documents_override_and_reload_swaps() {
    let dir = TempDir::new().unwrap();
    let override_path = dir.path().join("override.xml");
    fs::write(&override_path, EARTH_FARTHER).unwrap();

    let handle = Arc::new(EphemerisHandle::new(ephemeris()));
    let t = JulianDate::J2000 + 10.0;
    let near = handle.snapshot().position_of("Earth", t).unwrap().norm();

    let reloaded = Loader::new()
        .with_default_paths(false)
        .with_path(catalog_path())
        .with_path(&override_path)
        .load_ephemeris(EphemerisConfig::default())
        .unwrap();
    assert_eq!(reloaded.catalog().bodies().len(), 5);
    // The override carries no rotation
    assert_eq!(reloaded.orientation_of("Earth", t).unwrap(), None);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let handle = Arc::clone(&handle);
            scope.spawn(move || {
                for _ in 0..200 {
                    let snapshot = handle.snapshot();
                    let earth = snapshot.position_of("Earth", t).unwrap();
                    let moon = snapshot.position_of("Moon", t).unwrap();
                    let relative = snapshot.relative_position_of("Moon", t).unwrap();
                    // Every query against one snapshot agrees with itself
                    assert_relative_eq!(moon, earth + relative, max_relative = 1e-12);
                    let r = earth.norm();
                    assert!((r - near).abs() < 1.0 || (r - 3.0e8).abs() < 1e-3);
                }
            });
        }
        let previous = handle.replace(reloaded);
        assert_relative_eq!(previous.position_of("Earth", t).unwrap().norm(), near);
    });

    assert_relative_eq!(
        handle.snapshot().position_of("Earth", t).unwrap().norm(),
        3.0e8,
        max_relative = 1e-12
    );
}

#[test]
fn test_body_ids_follow_catalog_order() {
    let eph = ephemeris();
    assert_eq!(eph.body_id("Sun").unwrap(), BodyId(0));
    let tree: Vec<&str> = eph
        .hierarchy()
        .depth_first()
        .into_iter()
        .map(|(id, _)| eph.body(id).name.as_str())
        .collect();
    assert_eq!(tree, vec!["Sun", "Earth", "Moon", "Ceres", "Oumuamua"]);
}
