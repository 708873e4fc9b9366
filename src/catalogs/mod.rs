//! Catalog module
//!
//! This module holds the validated, immutable catalog of solar-system bodies
//! and background stars, along with the raw record types and the readers that
//! produce them from catalog documents.

pub mod body;
pub mod document;
pub mod loader;
pub mod records;
pub mod star;

pub use body::{
    BodyType, CelestialBody, OrbitKind, OrbitalElements, PhysicalProperties, RotationalElements,
};
pub use document::{read_document, read_document_str, DocumentFormat};
pub use loader::{load, merge_documents};
pub use records::CatalogDocument;
pub use star::{Magnitude, ProperMotion, SphericalLocation, Star, StellarType};

/// Anything addressable by a primary name or one of its aliases
pub trait Named {
    fn name(&self) -> &str;

    fn aliases(&self) -> &[String];

    /// Case-insensitive match against the name and every alias
    fn answers_to(&self, key: &str) -> bool {
        self.name().eq_ignore_ascii_case(key)
            || self.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(key))
    }
}

impl Named for CelestialBody {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl Named for Star {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// Index of `key` in `items`: exact name first, then any case-insensitive name or alias
fn find_index<T: Named>(items: &[T], key: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.name() == key)
        .or_else(|| items.iter().position(|item| item.answers_to(key)))
}

/// Validated bodies and stars
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    bodies: Vec<CelestialBody>,
    stars: Vec<Star>,
}

impl Catalog {
    pub(crate) fn new(bodies: Vec<CelestialBody>, stars: Vec<Star>) -> Self {
        Self { bodies, stars }
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn body_index(&self, key: &str) -> Option<usize> {
        find_index(&self.bodies, key)
    }

    pub fn star_index(&self, key: &str) -> Option<usize> {
        find_index(&self.stars, key)
    }

    /// Look up a body by name or alias
    pub fn body(&self, key: &str) -> Option<&CelestialBody> {
        self.body_index(key).map(|i| &self.bodies[i])
    }

    /// Look up a star by name or alias
    pub fn star(&self, key: &str) -> Option<&Star> {
        self.star_index(key).map(|i| &self.stars[i])
    }

    pub fn len(&self) -> usize {
        self.bodies.len() + self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::SphericalCoordinate;

    fn star(name: &str, aliases: &[&str]) -> Star {
        Star {
            name: name.into(),
            kind: StellarType::Star,
            constellation: None,
            location: SphericalCoordinate::new(0.0, 0.0),
            magnitude: None,
            motion: None,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_lookup_prefers_exact_name() {
        let catalog = Catalog::new(
            Vec::new(),
            vec![star("Castor", &["Alpha"]), star("alpha", &[]), star("Mizar", &["HR 5054"])],
        );
        assert_eq!(catalog.star_index("alpha"), Some(1));
        assert_eq!(catalog.star_index("ALPHA"), Some(0));
        assert_eq!(catalog.star("hr 5054").map(|s| s.name.as_str()), Some("Mizar"));
        assert!(catalog.star("Polaris").is_none());
        assert_eq!(catalog.len(), 3);
    }
}
