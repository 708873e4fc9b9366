//! # Sexagesimal Angle Codec
//!
//! Catalog documents write right ascension in hours-minutes-seconds and
//! declination in degrees-minutes-seconds:
//!
//! - HMS: `H?H h M?M m S?S(.S+)? s`, hours 0-23, unsigned
//! - DMS: `[sign] D?D d M?M m S?S(.S+)? s`, at most 90 degrees in magnitude
//!
//! Unit letters are case-insensitive and whitespace between the components
//! is optional. Minutes and seconds must be below 60.
//!
//! ## Examples
//!
//! ```rust
//! use orrery::coordinates::angle::{format_hms, parse_hms};
//!
//! let ra = parse_hms("18h 36m 56.33635s").unwrap();
//! assert_eq!(format_hms(ra), "18h 36m 56.336350s");
//! ```

use crate::constants::{DEG2RAD, HOUR2RAD, TAU};
use crate::errors::FormatError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HMS_RE: Regex =
        Regex::new(r"(?i)^\s*(\d{1,2})\s*h\s*(\d{1,2})\s*m\s*(\d{1,2}(?:\.\d+)?)\s*s\s*$")
            .expect("valid HMS pattern");
    static ref DMS_RE: Regex = Regex::new(
        r"(?i)^\s*([+-])?\s*(\d{1,2})\s*d\s*(\d{1,2})\s*m\s*(\d{1,2}(?:\.\d+)?)\s*s\s*$"
    )
    .expect("valid DMS pattern");
}

/// Split a sexagesimal triple out of regex captures starting at `first`
fn components(
    caps: &regex::Captures<'_>,
    first: usize,
    what: &'static str,
    text: &str,
) -> Result<(f64, f64, f64), FormatError> {
    let field = |i: usize| -> Result<f64, FormatError> {
        caps.get(i)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .parse::<f64>()
            .map_err(|e| FormatError::new(what, text, e.to_string()))
    };
    let (major, minutes, seconds) = (field(first)?, field(first + 1)?, field(first + 2)?);

    if minutes >= 60.0 {
        return Err(FormatError::new(what, text, "minutes must be in 0-59"));
    }
    if seconds >= 60.0 {
        return Err(FormatError::new(what, text, "seconds must be below 60"));
    }
    Ok((major, minutes, seconds))
}

/// Parse an hours-minutes-seconds angle into radians in [0, 2π)
pub fn parse_hms(text: &str) -> Result<f64, FormatError> {
    const WHAT: &str = "HMS angle";
    let caps = HMS_RE
        .captures(text)
        .ok_or_else(|| FormatError::new(WHAT, text, "expected the form '12h 34m 56.7s'"))?;
    let (hours, minutes, seconds) = components(&caps, 1, WHAT, text)?;
    if hours > 23.0 {
        return Err(FormatError::new(WHAT, text, "hours must be in 0-23"));
    }

    Ok((hours + minutes / 60.0 + seconds / 3600.0) * HOUR2RAD)
}

/// Parse a signed degrees-minutes-seconds angle into radians in [-π/2, π/2]
pub fn parse_dms(text: &str) -> Result<f64, FormatError> {
    const WHAT: &str = "DMS angle";
    let caps = DMS_RE
        .captures(text)
        .ok_or_else(|| FormatError::new(WHAT, text, "expected the form '+12d 34m 56.7s'"))?;
    let (degrees, minutes, seconds) = components(&caps, 2, WHAT, text)?;

    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;
    if magnitude > 90.0 {
        return Err(FormatError::new(WHAT, text, "magnitude exceeds 90 degrees"));
    }

    let sign = match caps.get(1).map(|m| m.as_str()) {
        Some("-") => -1.0,
        _ => 1.0,
    };
    Ok(sign * magnitude * DEG2RAD)
}

/// Split a non-negative quantity into (whole, minutes, seconds) at microsecond
/// resolution so rounding never produces a 60 in the lower fields.
fn split_sexagesimal(value: f64) -> (i64, i64, f64) {
    let micro = (value * 3600.0 * 1e6).round() as i64;
    let whole = micro / 3_600_000_000;
    let rest = micro % 3_600_000_000;
    let minutes = rest / 60_000_000;
    let seconds = (rest % 60_000_000) as f64 / 1e6;
    (whole, minutes, seconds)
}

/// Render radians as `"Hh Mm S.SSSSSSs"`, wrapping into 0-24h
pub fn format_hms(radians: f64) -> String {
    let hours = radians.rem_euclid(TAU) / HOUR2RAD;
    let (h, m, s) = split_sexagesimal(hours);
    format!("{}h {}m {:.6}s", h % 24, m, s)
}

/// Render radians as `"+Dd Mm S.SSSSSSs"`
pub fn format_dms(radians: f64) -> String {
    let sign = if radians < 0.0 { '-' } else { '+' };
    let (d, m, s) = split_sexagesimal(radians.abs() / DEG2RAD);
    format!("{}{}d {}m {:.6}s", sign, d, m, s)
}
