//! Catalog document reader
//!
//! Reads the XML catalog format (root `<catalog>` holding `<body>` and
//! `<star>` elements) or its JSON mirror into raw [`CatalogDocument`] records.
//! Files ending in `.gz` are decompressed first. Only structure is checked
//! here; values are validated by the loader.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::records::*;
use crate::errors::{OrreryError, Result};

/// Encoding of a catalog document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Xml,
    Json,
}

impl DocumentFormat {
    /// Guess from the file name; `.json` and `.json.gz` are JSON, anything else XML
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        if name.ends_with(".json") {
            DocumentFormat::Json
        } else {
            DocumentFormat::Xml
        }
    }
}

fn document_error(origin: &str, message: impl ToString) -> OrreryError {
    OrreryError::Document {
        origin: origin.to_string(),
        message: message.to_string(),
    }
}

/// Read and parse a catalog file
pub fn read_document(path: &Path) -> Result<CatalogDocument> {
    let origin = path.display().to_string();
    let bytes = fs::read(path).map_err(|e| {
        OrreryError::Io(std::io::Error::new(e.kind(), format!("{}: {}", origin, e)))
    })?;

    let text = if path.extension().is_some_and(|ext| ext == "gz") {
        let mut decoder = GzDecoder::new(&bytes[..]);
        let mut text = String::new();
        decoder
            .read_to_string(&mut text)
            .map_err(|e| document_error(&origin, format!("gzip: {}", e)))?;
        text
    } else {
        String::from_utf8(bytes).map_err(|e| document_error(&origin, format!("invalid UTF-8: {}", e)))?
    };

    read_document_str(&text, DocumentFormat::from_path(path), &origin)
}

/// Parse catalog text. `origin` names the source in error messages.
pub fn read_document_str(text: &str, format: DocumentFormat, origin: &str) -> Result<CatalogDocument> {
    let document = match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| document_error(origin, e))?,
        DocumentFormat::Xml => XmlCatalog::new(origin).parse(text)?,
    };
    debug!(
        "Read {} bodies and {} stars from {}",
        document.bodies.len(),
        document.stars.len(),
        origin
    );
    Ok(document)
}

fn scalar(attrs: &mut HashMap<String, String>, key: &str) -> Option<Scalar> {
    attrs.remove(key).map(Scalar::Text)
}

/// Event-driven builder over the XML element tree
struct XmlCatalog<'o> {
    origin: &'o str,
    document: CatalogDocument,
    /// Names of the currently open elements, outermost first
    open: Vec<String>,
    saw_root: bool,
}

impl<'o> XmlCatalog<'o> {
    fn new(origin: &'o str) -> Self {
        Self {
            origin,
            document: CatalogDocument::default(),
            open: Vec::new(),
            saw_root: false,
        }
    }

    fn parse(mut self, xml: &str) -> Result<CatalogDocument> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = self.handle_element(e)?;
                    self.open.push(name);
                }
                Ok(Event::Empty(ref e)) => {
                    self.handle_element(e)?;
                }
                Ok(Event::End(_)) => {
                    self.open.pop();
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|err| document_error(self.origin, err))?;
                    self.handle_text(&text);
                }
                Ok(Event::Eof) => {
                    if !self.open.is_empty() {
                        return Err(document_error(
                            self.origin,
                            format!("unexpected end of document inside <{}>", self.open.join("/")),
                        ));
                    }
                    break;
                }
                Err(e) => {
                    return Err(document_error(
                        self.origin,
                        format!("at byte {}: {}", reader.buffer_position(), e),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        if !self.saw_root {
            return Err(document_error(self.origin, "no <catalog> root element"));
        }
        Ok(self.document)
    }

    fn attributes(&self, element: &BytesStart) -> Result<HashMap<String, String>> {
        let mut attrs = HashMap::new();
        for attr in element.attributes() {
            let attr = attr.map_err(|e| document_error(self.origin, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| document_error(self.origin, e))?
                .to_string();
            attrs.insert(key, value);
        }
        Ok(attrs)
    }

    fn body(&mut self) -> Result<&mut BodyRecord> {
        let origin = self.origin;
        self.document
            .bodies
            .last_mut()
            .ok_or_else(|| document_error(origin, "element outside <body>"))
    }

    fn star(&mut self) -> Result<&mut StarRecord> {
        let origin = self.origin;
        self.document
            .stars
            .last_mut()
            .ok_or_else(|| document_error(origin, "element outside <star>"))
    }

    /// Record one opening (or empty) element; returns its name
    fn handle_element(&mut self, element: &BytesStart) -> Result<String> {
        let name = String::from_utf8_lossy(element.name().as_ref()).to_string();
        let mut attrs = self.attributes(element)?;
        let open = self.open.clone();
        let parents: Vec<&str> = open.iter().map(String::as_str).collect();
        match (parents.as_slice(), name.as_str()) {
            ([], "catalog") => self.saw_root = true,
            ([], other) => {
                return Err(document_error(
                    self.origin,
                    format!("root element must be <catalog>, found <{}>", other),
                ))
            }

            (["catalog"], "body") => self.document.bodies.push(BodyRecord {
                name: attrs.remove("name"),
                kind: attrs.remove("type"),
                symbol: attrs.remove("symbol"),
                parent: attrs.remove("parent"),
                ..Default::default()
            }),
            (["catalog"], "star" | "stellar") => self.document.stars.push(StarRecord {
                name: attrs.remove("name"),
                kind: attrs.remove("type"),
                constellation: attrs.remove("constellation"),
                ..Default::default()
            }),
            (["catalog"], other) => {
                return Err(document_error(
                    self.origin,
                    format!("unknown element <{}> in <catalog>", other),
                ))
            }

            (["catalog", "body"], "orbit") => {
                let orbit = OrbitRecord {
                    eccentricity: scalar(&mut attrs, "eccentricity"),
                    semimajor: scalar(&mut attrs, "semimajor"),
                    period: scalar(&mut attrs, "period"),
                    inclination: scalar(&mut attrs, "inclination"),
                    longitude_ascending: scalar(&mut attrs, "longitude-ascending"),
                    argument_periapsis: scalar(&mut attrs, "argument-periapsis"),
                    point: None,
                };
                self.body()?.orbit = Some(orbit);
            }
            (["catalog", "body", "orbit"], "point") => {
                let point = OrbitPointRecord {
                    mean_anomaly: scalar(&mut attrs, "mean-anomaly"),
                    epoch: attrs.remove("epoch"),
                };
                if let Some(orbit) = self.body()?.orbit.as_mut() {
                    orbit.point = Some(point);
                }
            }
            (["catalog", "body"], "rotation") => {
                let rotation = RotationRecord {
                    period: scalar(&mut attrs, "period"),
                    ..Default::default()
                };
                self.body()?.rotation = Some(rotation);
            }
            (["catalog", "body", "rotation"], "pole") => {
                let pole = PoleRecord {
                    right_asc: attrs.remove("right-asc"),
                    decl: attrs.remove("decl"),
                };
                if let Some(rotation) = self.body()?.rotation.as_mut() {
                    rotation.pole = Some(pole);
                }
            }
            (["catalog", "body", "rotation"], "point") => {
                let point = MeridianPointRecord {
                    meridian: scalar(&mut attrs, "meridian"),
                    epoch: attrs.remove("epoch"),
                };
                if let Some(rotation) = self.body()?.rotation.as_mut() {
                    rotation.point = Some(point);
                }
            }
            (["catalog", "body"], "physical") => {
                let physical = PhysicalRecord {
                    mass: scalar(&mut attrs, "mass"),
                    mean_radius: scalar(&mut attrs, "mean-radius"),
                    density: scalar(&mut attrs, "density"),
                };
                self.body()?.physical = Some(physical);
            }
            (["catalog", "body"], "alias") => self.body()?.aliases.push(String::new()),

            (["catalog", "star" | "stellar"], "location") => {
                let location = LocationRecord {
                    right_asc: attrs.remove("right-asc"),
                    decl: attrs.remove("decl"),
                    distance: scalar(&mut attrs, "distance"),
                };
                self.star()?.location = Some(location);
            }
            (["catalog", "star" | "stellar"], "magnitude") => {
                let magnitude = MagnitudeRecord {
                    apparent: scalar(&mut attrs, "apparent"),
                    absolute: scalar(&mut attrs, "absolute"),
                };
                self.star()?.magnitude = Some(magnitude);
            }
            (["catalog", "star" | "stellar"], "motion") => {
                let motion = MotionRecord {
                    right_asc: scalar(&mut attrs, "right-asc"),
                    decl: scalar(&mut attrs, "decl"),
                    radial: scalar(&mut attrs, "radial"),
                };
                self.star()?.motion = Some(motion);
            }
            (["catalog", "star" | "stellar"], "alias") => self.star()?.aliases.push(String::new()),

            (parents, other) => debug!("Ignoring <{}> inside <{}>", other, parents.join("/")),
        }
        Ok(name)
    }

    fn handle_text(&mut self, text: &str) {
        let parents: Vec<&str> = self.open.iter().map(String::as_str).collect();
        let aliases = match parents.as_slice() {
            ["catalog", "body", "alias"] => self.document.bodies.last_mut().map(|b| &mut b.aliases),
            ["catalog", "star" | "stellar", "alias"] => {
                self.document.stars.last_mut().map(|s| &mut s.aliases)
            }
            _ => None,
        };
        if let Some(alias) = aliases.and_then(|a| a.last_mut()) {
            alias.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<catalog>
    <body name="Sun" type="sun">
        <orbit eccentricity="0" semimajor="0" inclination="0" longitude-ascending="0" argument-periapsis="0">
            <point mean-anomaly="0"/>
        </orbit>
        <physical mass="1.9885e30" mean-radius="695700"/>
        <alias>Sol</alias>
    </body>
    <body name="Earth" type="planet" parent="Sun">
        <orbit eccentricity="0.0167086" semimajor="149598023" inclination="0.00005"
               longitude-ascending="-11.26064" argument-periapsis="114.20783">
            <point mean-anomaly="-2.48284" epoch="2000-01-01T12:00:00"/>
        </orbit>
        <rotation period="86164.1">
            <pole right-asc="0h 0m 0s" decl="+90d 0m 0s"/>
            <point meridian="190.147"/>
        </rotation>
    </body>
    <stellar name="Mizar" constellation="Ursa Major">
        <location right-asc="13h 23m 55.5s" decl="+54d 55m 31s" distance="82.9"/>
        <alias>HR 5054</alias>
        <alias>HD 116656</alias>
    </stellar>
</catalog>"#;

    #[test]
    fn test_parse_xml() {
        let doc = read_document_str(SAMPLE, DocumentFormat::Xml, "sample").unwrap();
        assert_eq!(doc.bodies.len(), 2);
        assert_eq!(doc.stars.len(), 1);

        let sun = &doc.bodies[0];
        assert_eq!(sun.kind.as_deref(), Some("sun"));
        assert_eq!(sun.aliases, vec!["Sol".to_string()]);
        assert_eq!(
            sun.physical.as_ref().unwrap().mass,
            Some(Scalar::Text("1.9885e30".into()))
        );

        let earth = &doc.bodies[1];
        assert_eq!(earth.parent.as_deref(), Some("Sun"));
        let point = earth.orbit.as_ref().unwrap().point.as_ref().unwrap();
        assert_eq!(point.mean_anomaly, Some(Scalar::Text("-2.48284".into())));
        assert_eq!(point.epoch.as_deref(), Some("2000-01-01T12:00:00"));
        let rotation = earth.rotation.as_ref().unwrap();
        assert_eq!(rotation.pole.as_ref().unwrap().decl.as_deref(), Some("+90d 0m 0s"));
        assert_eq!(
            rotation.point.as_ref().unwrap().meridian,
            Some(Scalar::Text("190.147".into()))
        );

        let mizar = &doc.stars[0];
        assert_eq!(mizar.constellation.as_deref(), Some("Ursa Major"));
        assert_eq!(mizar.aliases, vec!["HR 5054".to_string(), "HD 116656".to_string()]);
    }

    #[test]
    fn test_rejects_wrong_root_and_unknown_children() {
        let err = read_document_str("<stars/>", DocumentFormat::Xml, "x").unwrap_err();
        assert!(err.to_string().contains("root element must be <catalog>"));

        let err = read_document_str("<catalog><planet/></catalog>", DocumentFormat::Xml, "x").unwrap_err();
        assert!(err.to_string().contains("unknown element <planet>"));

        let err = read_document_str("<catalog><body></catalog>", DocumentFormat::Xml, "x").unwrap_err();
        assert!(matches!(err, OrreryError::Document { .. }));

        assert!(read_document_str("", DocumentFormat::Xml, "x").is_err());
    }

    #[test]
    fn test_rejects_truncated_xml() {
        let cut = SAMPLE.trim_end().trim_end_matches("</catalog>");
        let err = read_document_str(cut, DocumentFormat::Xml, "cut").unwrap_err();
        assert!(err.to_string().contains("inside <catalog>"), "{}", err);

        let cut = "<catalog><body name=\"Sun\" type=\"sun\"><orbit eccentricity=\"0\"/>";
        let err = read_document_str(cut, DocumentFormat::Xml, "cut").unwrap_err();
        assert!(err.to_string().contains("inside <catalog/body>"), "{}", err);
    }

    #[test]
    fn test_read_gzipped_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json.gz");
        let json = r#"{"stars": [{"name": "Vega", "location": {"right-asc": "18h 36m 56.33635s", "decl": "+38d 47m 1.2802s"}}]}"#;

        let file = fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        encoder.finish().unwrap();

        assert_eq!(DocumentFormat::from_path(&path), DocumentFormat::Json);
        let doc = read_document(&path).unwrap();
        assert_eq!(doc.stars[0].name.as_deref(), Some("Vega"));
        assert!(doc.bodies.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_document(&dir.path().join("nope.xml")).unwrap_err();
        assert!(matches!(err, OrreryError::Io(_)));
    }
}
