//! Solar-system bodies: orbital, rotational and physical elements

use crate::constants::{G_KM, G_PER_ML_TO_KG_PER_KM3, RAD2DEG};
use crate::coordinates::{format_dms, format_hms, SphericalCoordinate};
use crate::time::JulianDate;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Kind of body. Carries display metadata only; every kind is propagated the
/// same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyType {
    Sun,
    Planet,
    Moon,
    DwarfPlanet,
    Asteroid,
    Comet,
}

impl BodyType {
    pub const ALL: [BodyType; 6] = [
        BodyType::Sun,
        BodyType::Planet,
        BodyType::Moon,
        BodyType::DwarfPlanet,
        BodyType::Asteroid,
        BodyType::Comet,
    ];

    /// Identifier as written in catalog documents
    pub fn id(&self) -> &'static str {
        match self {
            BodyType::Sun => "Sun",
            BodyType::Planet => "Planet",
            BodyType::Moon => "Moon",
            BodyType::DwarfPlanet => "Dwarf Planet",
            BodyType::Asteroid => "Asteroid",
            BodyType::Comet => "Comet",
        }
    }

    /// Symbol used when the record gives none
    pub fn symbol(&self) -> &'static str {
        match self {
            BodyType::Sun => "<S>",
            BodyType::Planet => "[Pl]",
            BodyType::Moon => "[m]",
            BodyType::DwarfPlanet => "[d]",
            BodyType::Asteroid => "[a]",
            BodyType::Comet => "[c]",
        }
    }
}

impl FromStr for BodyType {
    type Err = String;

    /// Case-insensitive; `dwarf planet`, `dwarf-planet` and `dwarf_planet` are equivalent
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
        BodyType::ALL
            .iter()
            .copied()
            .find(|kind| kind.id().to_lowercase() == wanted)
            .ok_or_else(|| {
                format!(
                    "'{}' is not one of sun, planet, moon, dwarf planet, asteroid, comet",
                    s
                )
            })
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Shape of an orbit, decided by eccentricity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitKind {
    Elliptic,
    Parabolic,
    Hyperbolic,
}

/// Keplerian elements of a body relative to its parent
///
/// Angles are stored in radians; catalog documents give them in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Eccentricity, >= 0
    pub eccentricity: f64,
    /// Semimajor axis in km. For a parabolic orbit this is the periapsis distance.
    pub semimajor_axis: f64,
    /// Explicit orbital period in seconds
    pub period: Option<f64>,
    pub inclination: f64,
    pub longitude_ascending: f64,
    pub argument_periapsis: f64,
    /// Mean anomaly at `epoch`
    pub mean_anomaly: f64,
    pub epoch: JulianDate,
}

impl OrbitalElements {
    /// A body that sits at its own origin: e = 0 and a = 0
    pub fn is_degenerate(&self) -> bool {
        self.eccentricity == 0.0 && self.semimajor_axis == 0.0
    }

    pub fn kind(&self) -> OrbitKind {
        if self.eccentricity < 1.0 {
            OrbitKind::Elliptic
        } else if self.eccentricity == 1.0 {
            OrbitKind::Parabolic
        } else {
            OrbitKind::Hyperbolic
        }
    }
}

/// Spin state of a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationalElements {
    /// Sidereal rotation period in seconds, negative for retrograde spin
    pub period: f64,
    /// Direction of the north pole
    pub pole: SphericalCoordinate,
    /// Prime meridian angle at `epoch`, degrees
    pub meridian: f64,
    pub epoch: JulianDate,
}

impl RotationalElements {
    /// Pole along the reference +Z axis
    pub fn default_pole() -> SphericalCoordinate {
        SphericalCoordinate::new(0.0, PI / 2.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperties {
    /// Mass in kg
    pub mass: Option<f64>,
    /// Mean radius in km
    pub mean_radius: Option<f64>,
    /// Mean density in g/mL
    pub density: Option<f64>,
}

impl PhysicalProperties {
    /// Mass as given, or derived from density and mean radius
    pub fn effective_mass(&self) -> Option<f64> {
        self.mass.or_else(|| {
            let (density, radius) = (self.density?, self.mean_radius?);
            Some(density * G_PER_ML_TO_KG_PER_KM3 * 4.0 / 3.0 * PI * radius.powi(3))
        })
    }

    /// Gravitational parameter μ in km^3/s^2
    pub fn gravitational_parameter(&self) -> Option<f64> {
        self.effective_mass().map(|mass| G_KM * mass)
    }
}

/// A body of the solar-system tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BodyType,
    pub symbol: String,
    /// Name of the body this one orbits
    pub parent: Option<String>,
    pub orbit: OrbitalElements,
    pub rotation: Option<RotationalElements>,
    pub physical: Option<PhysicalProperties>,
    /// Alternative names in declared order
    pub aliases: Vec<String>,
}

impl CelestialBody {
    pub fn gravitational_parameter(&self) -> Option<f64> {
        self.physical.as_ref()?.gravitational_parameter()
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(parent) = &self.parent {
            write!(f, "    ({})", parent)?;
        }
        writeln!(f)?;
        if !self.aliases.is_empty() {
            writeln!(f, "{}", self.aliases.join("  |  "))?;
        }
        writeln!(f, "Type: {} {}", self.kind, self.symbol)?;

        let orbit = &self.orbit;
        writeln!(f, "Eccentricity: {}", orbit.eccentricity)?;
        writeln!(f, "Semimajor Axis: {} km", orbit.semimajor_axis)?;
        writeln!(f, "Inclination: {} degrees", orbit.inclination * RAD2DEG)?;
        writeln!(
            f,
            "Longitude of the Ascending Node: {} degrees",
            orbit.longitude_ascending * RAD2DEG
        )?;
        writeln!(f, "Argument of Periapsis: {} degrees", orbit.argument_periapsis * RAD2DEG)?;
        if let Some(period) = orbit.period {
            writeln!(f, "Orbital Period: {} s", period)?;
        }

        if let Some(rotation) = &self.rotation {
            writeln!(f, "Sidereal Rotation Period: {} s", rotation.period)?;
            writeln!(
                f,
                "Pole (RA, Dec): {} ,  {}",
                format_hms(rotation.pole.ra),
                format_dms(rotation.pole.dec)
            )?;
        }

        if let Some(physical) = &self.physical {
            if let Some(mass) = physical.mass {
                writeln!(f, "Mass: {} kg", mass)?;
            }
            if let Some(radius) = physical.mean_radius {
                writeln!(f, "Mean Radius: {} km", radius)?;
            }
            if let Some(density) = physical.density {
                writeln!(f, "Density: {} g/mL", density)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("planet", BodyType::Planet)]
    #[case("SUN", BodyType::Sun)]
    #[case("Dwarf Planet", BodyType::DwarfPlanet)]
    #[case("dwarf-planet", BodyType::DwarfPlanet)]
    #[case(" comet ", BodyType::Comet)]
    fn test_body_type_parsing(#[case] text: &str, #[case] expected: BodyType) {
        assert_eq!(text.parse::<BodyType>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_body_type() {
        assert!("star".parse::<BodyType>().is_err());
    }

    #[test]
    fn test_mass_from_density() {
        // Earth: 5.514 g/mL, 6371 km
        let physical = PhysicalProperties {
            mass: None,
            mean_radius: Some(6371.0),
            density: Some(5.514),
        };
        assert_relative_eq!(physical.effective_mass().unwrap(), 5.972e24, max_relative = 1e-3);

        let explicit = PhysicalProperties {
            mass: Some(1.0e20),
            ..physical
        };
        assert_eq!(explicit.effective_mass(), Some(1.0e20));
        assert!(PhysicalProperties::default().gravitational_parameter().is_none());
    }

    #[test]
    fn test_solar_gravitational_parameter() {
        let sun = PhysicalProperties {
            mass: Some(1.988_47e30),
            ..Default::default()
        };
        assert_relative_eq!(
            sun.gravitational_parameter().unwrap(),
            1.327_124_4e11,
            max_relative = 1e-4
        );
    }
}
