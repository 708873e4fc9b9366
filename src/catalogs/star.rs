//! Background stars and other fixed-sky objects

use crate::coordinates::{format_dms, format_hms, SphericalCoordinate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog position of a star: right ascension, declination and optional distance
pub type SphericalLocation = SphericalCoordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StellarType {
    #[default]
    Star,
    Nebula,
    OpenCluster,
}

impl StellarType {
    pub fn id(&self) -> &'static str {
        match self {
            StellarType::Star => "Star",
            StellarType::Nebula => "Nebula",
            StellarType::OpenCluster => "Open Cluster",
        }
    }
}

impl FromStr for StellarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
        [StellarType::Star, StellarType::Nebula, StellarType::OpenCluster]
            .into_iter()
            .find(|kind| kind.id().to_lowercase() == wanted)
            .ok_or_else(|| format!("'{}' is not one of star, nebula, open cluster", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Magnitude {
    pub apparent: Option<f64>,
    pub absolute: Option<f64>,
}

/// Proper motion and radial velocity. Absent components mean a zero rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProperMotion {
    /// Right ascension rate in mas/yr, as an angle on the sky
    pub right_asc: Option<f64>,
    /// Declination rate in mas/yr
    pub decl: Option<f64>,
    /// Radial velocity in km/s, positive receding
    pub radial: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StellarType,
    pub constellation: Option<String>,
    pub location: SphericalLocation,
    pub magnitude: Option<Magnitude>,
    pub motion: Option<ProperMotion>,
    /// Alternative names in declared order
    pub aliases: Vec<String>,
}

impl Star {
    pub fn apparent_magnitude(&self) -> Option<f64> {
        self.magnitude.and_then(|m| m.apparent)
    }

    /// Display symbol: brightness-graded for stars, type marker otherwise
    pub fn symbol(&self) -> &'static str {
        match self.kind {
            StellarType::Nebula => "~N~",
            StellarType::OpenCluster => "~O~",
            StellarType::Star => match self.apparent_magnitude() {
                Some(mag) if mag < 0.0 => "{@}",
                Some(mag) if mag < 6.0 => ["(#)", "(*)", "(\")", "#", "*", "\""][mag as usize],
                _ => "`",
            },
        }
    }
}

impl fmt::Display for Star {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(constellation) = &self.constellation {
            write!(f, "      {}", constellation)?;
        }
        writeln!(f)?;
        if !self.aliases.is_empty() {
            writeln!(f, "{}", self.aliases.join("  |  "))?;
        }
        writeln!(
            f,
            "(RA, Dec):  {} ,  {}",
            format_hms(self.location.ra),
            format_dms(self.location.dec)
        )?;

        if let Some(magnitude) = &self.magnitude {
            if let Some(apparent) = magnitude.apparent {
                write!(f, "App Mag: {}    ", apparent)?;
            }
            if let Some(absolute) = magnitude.absolute {
                write!(f, "Abs Mag: {}", absolute)?;
            }
            writeln!(f)?;
        }
        if let Some(distance) = self.location.distance_ly {
            writeln!(f, "Distance: {} ly", distance)?;
        }
        if let Some(motion) = &self.motion {
            if let Some(radial) = motion.radial {
                writeln!(f, "Radial Motion: {:.6} km/s", radial)?;
            }
            writeln!(
                f,
                "Proper Motion (RA, Dec): {:.6} mas/yr,  {:.6} mas/yr",
                motion.right_asc.unwrap_or(0.0),
                motion.decl.unwrap_or(0.0)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn star_with_magnitude(kind: StellarType, apparent: Option<f64>) -> Star {
        Star {
            name: "Test".into(),
            kind,
            constellation: None,
            location: SphericalLocation::new(0.0, 0.0),
            magnitude: Some(Magnitude {
                apparent,
                absolute: None,
            }),
            motion: None,
            aliases: Vec::new(),
        }
    }

    #[rstest]
    #[case(Some(-1.46), "{@}")]
    #[case(Some(0.03), "(#)")]
    #[case(Some(2.2), "(\")")]
    #[case(Some(5.99), "\"")]
    #[case(Some(6.0), "`")]
    #[case(None, "`")]
    fn test_star_symbol_by_magnitude(#[case] apparent: Option<f64>, #[case] symbol: &str) {
        assert_eq!(star_with_magnitude(StellarType::Star, apparent).symbol(), symbol);
    }

    #[test]
    fn test_non_star_symbols() {
        assert_eq!(star_with_magnitude(StellarType::Nebula, Some(1.0)).symbol(), "~N~");
        assert_eq!(
            "open cluster".parse::<StellarType>().unwrap(),
            StellarType::OpenCluster
        );
    }
}
