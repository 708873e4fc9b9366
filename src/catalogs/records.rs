//! Raw catalog records
//!
//! These mirror the catalog document one-to-one and carry attribute text
//! unconverted. The loader turns them into domain entities and reports every
//! problem it finds. The same structures deserialize from the JSON form of a
//! catalog, where numeric attributes may be written as numbers or strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An attribute value as it appeared in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Numeric value, parsing text if needed
    pub fn to_f64(&self) -> Result<f64, String> {
        match self {
            Scalar::Number(value) => Ok(*value),
            Scalar::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", text)),
        }
    }
}

impl From<&str> for Scalar {
    fn from(text: &str) -> Self {
        Scalar::Text(text.to_string())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(value) => write!(f, "{}", value),
            Scalar::Text(text) => f.write_str(text),
        }
    }
}

/// A whole catalog document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDocument {
    pub bodies: Vec<BodyRecord>,
    pub stars: Vec<StarRecord>,
}

impl CatalogDocument {
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty() && self.stars.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BodyRecord {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub symbol: Option<String>,
    pub parent: Option<String>,
    pub orbit: Option<OrbitRecord>,
    pub rotation: Option<RotationRecord>,
    pub physical: Option<PhysicalRecord>,
    #[serde(alias = "alias")]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OrbitRecord {
    pub eccentricity: Option<Scalar>,
    pub semimajor: Option<Scalar>,
    pub period: Option<Scalar>,
    pub inclination: Option<Scalar>,
    pub longitude_ascending: Option<Scalar>,
    pub argument_periapsis: Option<Scalar>,
    pub point: Option<OrbitPointRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OrbitPointRecord {
    pub mean_anomaly: Option<Scalar>,
    pub epoch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RotationRecord {
    pub period: Option<Scalar>,
    pub pole: Option<PoleRecord>,
    pub point: Option<MeridianPointRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PoleRecord {
    pub right_asc: Option<String>,
    pub decl: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MeridianPointRecord {
    pub meridian: Option<Scalar>,
    pub epoch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PhysicalRecord {
    pub mass: Option<Scalar>,
    pub mean_radius: Option<Scalar>,
    pub density: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StarRecord {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub constellation: Option<String>,
    pub location: Option<LocationRecord>,
    pub magnitude: Option<MagnitudeRecord>,
    pub motion: Option<MotionRecord>,
    #[serde(alias = "alias")]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LocationRecord {
    pub right_asc: Option<String>,
    pub decl: Option<String>,
    pub distance: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MagnitudeRecord {
    pub apparent: Option<Scalar>,
    pub absolute: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MotionRecord {
    pub right_asc: Option<Scalar>,
    pub decl: Option<Scalar>,
    pub radial: Option<Scalar>,
}
