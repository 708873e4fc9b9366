//! Catalog validation
//!
//! [`load`] converts raw records into domain entities. Every record is checked
//! completely and all violations are returned together; a catalog with any
//! violation is rejected as a whole.

use std::collections::HashMap;

use log::{debug, info, warn};

use super::body::{BodyType, CelestialBody, OrbitalElements, PhysicalProperties, RotationalElements};
use super::records::{BodyRecord, CatalogDocument, Scalar, StarRecord};
use super::star::{Magnitude, ProperMotion, SphericalLocation, Star, StellarType};
use super::Catalog;
use crate::constants::DEG2RAD;
use crate::coordinates::{parse_dms, parse_hms};
use crate::errors::{FormatError, Result, ValidationError, Violation};
use crate::time::{parse_epoch, JulianDate};

/// Collects violations for a single record
struct RecordCheck<'a> {
    record: String,
    violations: &'a mut Vec<Violation>,
}

impl<'a> RecordCheck<'a> {
    fn new(kind: &str, name: Option<&str>, index: usize, violations: &'a mut Vec<Violation>) -> Self {
        let record = match name {
            Some(name) if !name.trim().is_empty() => format!("{} '{}'", kind, name),
            _ => format!("{} #{}", kind, index + 1),
        };
        Self { record, violations }
    }

    fn flag(&mut self, field: &str, message: impl Into<String>) {
        self.violations
            .push(Violation::new(self.record.clone(), field, message));
    }

    fn missing(&mut self, field: &str) {
        self.flag(field, "missing required value");
    }

    fn text(&mut self, field: &str, value: Option<&String>) -> Option<String> {
        match value.map(|v| v.trim()) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            Some(_) => {
                self.flag(field, "must not be empty");
                None
            }
            None => {
                self.missing(field);
                None
            }
        }
    }

    fn optional_number(&mut self, field: &str, value: Option<&Scalar>) -> Option<f64> {
        match value?.to_f64() {
            Ok(number) if number.is_finite() => Some(number),
            Ok(number) => {
                self.flag(field, format!("{} is not a finite number", number));
                None
            }
            Err(message) => {
                self.flag(field, message);
                None
            }
        }
    }

    fn number(&mut self, field: &str, value: Option<&Scalar>) -> Option<f64> {
        if value.is_none() {
            self.missing(field);
            return None;
        }
        self.optional_number(field, value)
    }

    /// Optional number that must be strictly positive when present
    fn positive(&mut self, field: &str, value: Option<&Scalar>) -> Option<Option<f64>> {
        match self.optional_number(field, value) {
            Some(number) if number <= 0.0 => {
                self.flag(field, format!("must be > 0, got {}", number));
                None
            }
            parsed => {
                if value.is_some() && parsed.is_none() {
                    None
                } else {
                    Some(parsed)
                }
            }
        }
    }

    fn degrees(&mut self, field: &str, value: Option<&Scalar>) -> Option<f64> {
        self.number(field, value).map(|deg| deg * DEG2RAD)
    }

    fn angle(
        &mut self,
        field: &str,
        value: Option<&String>,
        parser: fn(&str) -> std::result::Result<f64, FormatError>,
    ) -> Option<f64> {
        let text = self.text(field, value)?;
        parser(&text)
            .map_err(|err| self.flag(field, err.to_string()))
            .ok()
    }

    fn epoch(&mut self, field: &str, value: Option<&String>) -> Option<JulianDate> {
        parse_epoch(value.map(|s| s.as_str()))
            .map_err(|err| self.flag(field, err.to_string()))
            .ok()
    }

    fn aliases(&mut self, aliases: &[String]) -> Vec<String> {
        for (i, alias) in aliases.iter().enumerate() {
            if alias.trim().is_empty() {
                self.flag(&format!("alias[{}]", i + 1), "must not be empty");
            }
        }
        aliases.iter().map(|alias| alias.trim().to_string()).collect()
    }
}

fn body_from_record(
    record: &BodyRecord,
    index: usize,
    violations: &mut Vec<Violation>,
) -> Option<CelestialBody> {
    let mut check = RecordCheck::new("body", record.name.as_deref(), index, violations);

    let name = check.text("@name", record.name.as_ref());
    let kind = match record.kind.as_deref() {
        Some(text) => text
            .parse::<BodyType>()
            .map_err(|message| check.flag("@type", message))
            .ok(),
        None => {
            check.missing("@type");
            None
        }
    };

    let parent = match record.parent.as_deref().map(str::trim) {
        Some("") => {
            check.flag("@parent", "must not be empty");
            None
        }
        other => Some(other.map(str::to_string)),
    };
    let has_parent = matches!(parent, Some(Some(_)));

    let orbit = match &record.orbit {
        Some(orbit) => {
            let eccentricity = check.number("orbit/@eccentricity", orbit.eccentricity.as_ref());
            if let Some(e) = eccentricity.filter(|e| *e < 0.0) {
                check.flag("orbit/@eccentricity", format!("must be >= 0, got {}", e));
            }
            let semimajor = check.number("orbit/@semimajor", orbit.semimajor.as_ref());
            match semimajor {
                Some(a) if a < 0.0 => check.flag("orbit/@semimajor", format!("must be >= 0, got {}", a)),
                Some(a) if a == 0.0 && has_parent => {
                    check.flag("orbit/@semimajor", "must be > 0 for a body with a parent")
                }
                _ => {}
            }
            let period = check.positive("orbit/@period", orbit.period.as_ref());
            if let (Some(e), Some(Some(_))) = (eccentricity, period) {
                if e >= 1.0 {
                    check.flag("orbit/@period", "an open orbit (e >= 1) has no period");
                }
            }
            let inclination = check.degrees("orbit/@inclination", orbit.inclination.as_ref());
            let longitude_ascending =
                check.degrees("orbit/@longitude-ascending", orbit.longitude_ascending.as_ref());
            let argument_periapsis =
                check.degrees("orbit/@argument-periapsis", orbit.argument_periapsis.as_ref());
            let (mean_anomaly, epoch) = match &orbit.point {
                Some(point) => (
                    check.degrees("orbit/point/@mean-anomaly", point.mean_anomaly.as_ref()),
                    check.epoch("orbit/point/@epoch", point.epoch.as_ref()),
                ),
                None => {
                    check.missing("orbit/point");
                    (None, None)
                }
            };

            match (eccentricity, semimajor) {
                (Some(e), Some(a)) if e >= 0.0 && a >= 0.0 => (move || {
                    Some(OrbitalElements {
                        eccentricity: e,
                        semimajor_axis: a,
                        period: period?,
                        inclination: inclination?,
                        longitude_ascending: longitude_ascending?,
                        argument_periapsis: argument_periapsis?,
                        mean_anomaly: mean_anomaly?,
                        epoch: epoch?,
                    })
                })(),
                _ => None,
            }
        }
        None => {
            check.missing("orbit");
            None
        }
    };

    let rotation = match &record.rotation {
        Some(rotation) => {
            let period = check.number("rotation/@period", rotation.period.as_ref());
            if period == Some(0.0) {
                check.flag("rotation/@period", "must be non-zero");
            }
            let pole = match &rotation.pole {
                Some(pole) => {
                    let ra = check.angle("rotation/pole/@right-asc", pole.right_asc.as_ref(), parse_hms);
                    let dec = check.angle("rotation/pole/@decl", pole.decl.as_ref(), parse_dms);
                    ra.zip(dec).map(|(ra, dec)| SphericalLocation::new(ra, dec))
                }
                None => Some(RotationalElements::default_pole()),
            };
            let (meridian, epoch) = match &rotation.point {
                Some(point) => {
                    let meridian = match point.meridian.as_ref() {
                        Some(_) => check.optional_number("rotation/point/@meridian", point.meridian.as_ref()),
                        None => Some(0.0),
                    };
                    (meridian, check.epoch("rotation/point/@epoch", point.epoch.as_ref()))
                }
                None => (Some(0.0), Some(JulianDate::J2000)),
            };
            (move || {
                Some(RotationalElements {
                    period: period.filter(|p| *p != 0.0)?,
                    pole: pole?,
                    meridian: meridian?,
                    epoch: epoch?,
                })
            })()
            .map(Some)
        }
        None => Some(None),
    };

    let physical = match &record.physical {
        Some(physical) => {
            let mass = check.positive("physical/@mass", physical.mass.as_ref());
            let mean_radius = check.positive("physical/@mean-radius", physical.mean_radius.as_ref());
            let density = check.positive("physical/@density", physical.density.as_ref());
            (move || {
                Some(PhysicalProperties {
                    mass: mass?,
                    mean_radius: mean_radius?,
                    density: density?,
                })
            })()
            .map(Some)
        }
        None => Some(None),
    };

    let aliases = check.aliases(&record.aliases);

    let kind = kind?;
    let body = CelestialBody {
        name: name?,
        kind,
        symbol: record
            .symbol
            .clone()
            .unwrap_or_else(|| kind.symbol().to_string()),
        parent: parent?,
        orbit: orbit?,
        rotation: rotation?,
        physical: physical?,
        aliases,
    };
    debug!("Validated body '{}' ({})", body.name, body.kind);
    Some(body)
}

fn star_from_record(record: &StarRecord, index: usize, violations: &mut Vec<Violation>) -> Option<Star> {
    let mut check = RecordCheck::new("star", record.name.as_deref(), index, violations);

    let name = check.text("@name", record.name.as_ref());
    let kind = match record.kind.as_deref() {
        Some(text) => text
            .parse::<StellarType>()
            .map_err(|message| check.flag("@type", message))
            .ok(),
        None => Some(StellarType::Star),
    };

    let location = match &record.location {
        Some(location) => {
            let ra = check.angle("location/@right-asc", location.right_asc.as_ref(), parse_hms);
            let dec = check.angle("location/@decl", location.decl.as_ref(), parse_dms);
            let distance = check.optional_number("location/@distance", location.distance.as_ref());
            if let Some(d) = distance.filter(|d| *d < 0.0) {
                check.flag("location/@distance", format!("must be >= 0, got {}", d));
            }
            let distance_ok = location.distance.is_none() || distance.is_some_and(|d| d >= 0.0);
            match (ra, dec, distance_ok) {
                (Some(ra), Some(dec), true) => {
                    let coord = SphericalLocation::new(ra, dec);
                    Some(match distance {
                        Some(d) => coord.with_distance(d),
                        None => coord,
                    })
                }
                _ => None,
            }
        }
        None => {
            check.missing("location");
            None
        }
    };

    let magnitude = match &record.magnitude {
        Some(magnitude) => {
            let apparent = check.optional_number("magnitude/@apparent", magnitude.apparent.as_ref());
            let absolute = check.optional_number("magnitude/@absolute", magnitude.absolute.as_ref());
            let ok = (magnitude.apparent.is_none() || apparent.is_some())
                && (magnitude.absolute.is_none() || absolute.is_some());
            ok.then_some(Some(Magnitude { apparent, absolute }))
        }
        None => Some(None),
    };

    let motion = match &record.motion {
        Some(motion) => {
            let right_asc = check.optional_number("motion/@right-asc", motion.right_asc.as_ref());
            let decl = check.optional_number("motion/@decl", motion.decl.as_ref());
            let radial = check.optional_number("motion/@radial", motion.radial.as_ref());
            let ok = (motion.right_asc.is_none() || right_asc.is_some())
                && (motion.decl.is_none() || decl.is_some())
                && (motion.radial.is_none() || radial.is_some());
            ok.then_some(Some(ProperMotion {
                right_asc,
                decl,
                radial,
            }))
        }
        None => Some(None),
    };

    let aliases = check.aliases(&record.aliases);

    let star = Star {
        name: name?,
        kind: kind?,
        constellation: record.constellation.as_ref().map(|c| c.trim().to_string()),
        location: location?,
        magnitude: magnitude?,
        motion: motion?,
        aliases,
    };
    debug!("Validated star '{}'", star.name);
    Some(star)
}

/// Flag every record whose name repeats an earlier one, ignoring case
fn check_unique<'r>(
    kind: &str,
    names: impl Iterator<Item = Option<&'r String>>,
    violations: &mut Vec<Violation>,
) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (index, name) in names.enumerate() {
        let Some(name) = name.map(|n| n.trim()).filter(|n| !n.is_empty()) else {
            continue;
        };
        if let Some(first) = seen.get(&name.to_lowercase()) {
            violations.push(Violation::new(
                format!("{} '{}'", kind, name),
                "@name",
                format!("duplicate of {} #{}", kind, first + 1),
            ));
        } else {
            seen.insert(name.to_lowercase(), index);
        }
    }
}

/// Validate a catalog document and build the catalog.
///
/// Fails with a [`ValidationError`] naming every offending record and field.
pub fn load(document: &CatalogDocument) -> Result<Catalog> {
    let mut violations = Vec::new();

    let bodies: Vec<_> = document
        .bodies
        .iter()
        .enumerate()
        .filter_map(|(i, record)| body_from_record(record, i, &mut violations))
        .collect();
    let stars: Vec<_> = document
        .stars
        .iter()
        .enumerate()
        .filter_map(|(i, record)| star_from_record(record, i, &mut violations))
        .collect();

    check_unique("body", document.bodies.iter().map(|b| b.name.as_ref()), &mut violations);
    check_unique("star", document.stars.iter().map(|s| s.name.as_ref()), &mut violations);

    if !violations.is_empty() {
        return Err(ValidationError { violations }.into());
    }

    info!(
        "Loaded catalog with {} bodies and {} stars",
        bodies.len(),
        stars.len()
    );
    Ok(Catalog::new(bodies, stars))
}

/// Append `records` from document number `doc_index`, replacing same-named
/// records that came from earlier documents.
fn merge_records<T>(
    merged: &mut Vec<T>,
    owners: &mut HashMap<String, (usize, usize)>,
    records: Vec<T>,
    doc_index: usize,
    origin: &str,
    name_of: fn(&T) -> Option<&String>,
) {
    for record in records {
        let key = name_of(&record).map(|n| n.trim().to_lowercase());
        match key.as_ref().and_then(|k| owners.get(k).copied()) {
            Some((slot, owner)) if owner < doc_index => {
                warn!(
                    "'{}' from {} replaces an earlier definition",
                    name_of(&record).map(|n| n.as_str()).unwrap_or_default(),
                    origin
                );
                merged[slot] = record;
                if let Some(key) = key {
                    owners.insert(key, (slot, doc_index));
                }
            }
            Some(_) => merged.push(record),
            None => {
                if let Some(key) = key {
                    owners.insert(key, (merged.len(), doc_index));
                }
                merged.push(record);
            }
        }
    }
}

/// Combine documents in order. Later documents override same-named records of
/// earlier ones; repeats inside one document are kept so [`load`] reports them.
pub fn merge_documents<I>(documents: I) -> CatalogDocument
where
    I: IntoIterator<Item = (String, CatalogDocument)>,
{
    let mut merged = CatalogDocument::default();
    let mut body_owners = HashMap::new();
    let mut star_owners = HashMap::new();

    for (doc_index, (origin, document)) in documents.into_iter().enumerate() {
        debug!(
            "Merging {} bodies and {} stars from {}",
            document.bodies.len(),
            document.stars.len(),
            origin
        );
        merge_records(
            &mut merged.bodies,
            &mut body_owners,
            document.bodies,
            doc_index,
            &origin,
            |b| b.name.as_ref(),
        );
        merge_records(
            &mut merged.stars,
            &mut star_owners,
            document.stars,
            doc_index,
            &origin,
            |s| s.name.as_ref(),
        );
    }
    merged
}
