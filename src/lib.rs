//! Orrery: catalog-driven ephemeris engine
//!
//! This crate reads catalogs of solar-system bodies and background stars,
//! validates them, and answers "where is it, and how is it oriented, at time
//! T" from Keplerian orbital elements, rotational elements and proper motions.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

pub mod catalogs;
pub mod constants;
pub mod coordinates;
pub mod ephemeris;
pub mod errors;
pub mod hierarchy;
pub mod orbits;
pub mod rotation;
pub mod stellar;
pub mod time;

// Re-export commonly used types
pub use catalogs::{Catalog, CelestialBody, Star};
pub use coordinates::SphericalCoordinate;
pub use ephemeris::{Ephemeris, EphemerisConfig, EphemerisHandle};
pub use errors::{OrreryError, Result};
pub use orbits::KeplerConfig;
pub use rotation::Orientation;
pub use time::JulianDate;

/// System-wide catalog locations, read before the user's own
const SYSTEM_CATALOGS: [&str; 2] = [
    "/usr/share/orrery/catalog.xml",
    "/usr/local/share/orrery/catalog.xml",
];

/// Entry point for loading catalog documents
#[derive(Debug, Clone)]
pub struct Loader {
    paths: Vec<PathBuf>,
    use_default_paths: bool,
}

impl Loader {
    /// Create a loader that reads the default search locations
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            use_default_paths: true,
        }
    }

    /// Add a catalog document; later documents override earlier ones
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_default_paths(mut self, enabled: bool) -> Self {
        self.use_default_paths = enabled;
        self
    }

    /// Existing default documents: the system catalogs, then every
    /// `$HOME/.orrery/*.xml` in name order
    pub fn default_search_paths() -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = SYSTEM_CATALOGS
            .iter()
            .map(PathBuf::from)
            .filter(|path| path.is_file())
            .collect();

        if let Some(home) = std::env::var_os("HOME") {
            let user_dir = Path::new(&home).join(".orrery");
            if let Ok(entries) = fs::read_dir(&user_dir) {
                let mut user: Vec<PathBuf> = entries
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|path| {
                        path.is_file() && path.extension().map_or(false, |ext| ext == "xml")
                    })
                    .collect();
                user.sort();
                found.extend(user);
            }
        }
        found
    }

    /// Documents this loader will read, in override order
    pub fn document_paths(&self) -> Vec<PathBuf> {
        let mut paths = if self.use_default_paths {
            Self::default_search_paths()
        } else {
            Vec::new()
        };
        paths.extend(self.paths.iter().cloned());
        paths
    }

    /// Read, merge and validate every document
    pub fn load_catalog(&self) -> Result<Catalog> {
        let paths = self.document_paths();
        let mut documents = Vec::with_capacity(paths.len());
        for path in &paths {
            debug!("Reading catalog document {}", path.display());
            documents.push((path.display().to_string(), catalogs::read_document(path)?));
        }

        let merged = catalogs::merge_documents(documents);
        if merged.is_empty() {
            return Err(OrreryError::Document {
                origin: paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                message: "no bodies or stars found in any catalog document".to_string(),
            });
        }
        info!("Loaded {} catalog document(s)", paths.len());
        catalogs::load(&merged)
    }

    /// Load the catalog and build a snapshot from it
    pub fn load_ephemeris(&self, config: EphemerisConfig) -> Result<Ephemeris> {
        Ephemeris::new(self.load_catalog()?, config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
