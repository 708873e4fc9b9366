//! Time module for epoch handling
//!
//! Catalog epochs are ISO-8601 strings; every computation works on Julian
//! Dates. Calendar dates are treated as proleptic Gregorian UTC and no time
//! scale corrections are applied.

use crate::constants::{DAY_S, J2000, JULIAN_YEAR_DAYS};
use crate::errors::FormatError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Naive layouts accepted for catalog epochs, tried in order
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// An instant expressed as a Julian Date (days)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JulianDate(pub f64);

impl JulianDate {
    /// The J2000.0 reference epoch, 2000-01-01T12:00:00
    pub const J2000: JulianDate = JulianDate(J2000);

    pub fn new(jd: f64) -> Self {
        Self(jd)
    }

    /// Julian Date as a plain number
    pub fn jd(&self) -> f64 {
        self.0
    }

    /// Build from calendar components
    pub fn from_calendar(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        let day_fraction = (hour as f64 * 3600.0 + minute as f64 * 60.0 + second) / DAY_S;
        Self(julian_day(year, month, day) as f64 - 0.5 + day_fraction)
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_naive(&dt.naive_utc())
    }

    fn from_naive(dt: &NaiveDateTime) -> Self {
        let second = dt.second() as f64 + dt.nanosecond() as f64 * 1e-9;
        Self::from_calendar(dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute(), second)
    }

    /// The current instant
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Days elapsed since `earlier`
    pub fn days_since(&self, earlier: JulianDate) -> f64 {
        self.0 - earlier.0
    }

    /// Seconds elapsed since `earlier`
    pub fn seconds_since(&self, earlier: JulianDate) -> f64 {
        self.days_since(earlier) * DAY_S
    }

    /// Julian years elapsed since `earlier`
    pub fn julian_years_since(&self, earlier: JulianDate) -> f64 {
        self.days_since(earlier) / JULIAN_YEAR_DAYS
    }

    /// UTC calendar instant, rounded to the millisecond.
    ///
    /// A single `f64` day count near the present carries roughly 20 µs of
    /// resolution, so finer digits would be noise.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let base = NaiveDate::from_ymd_opt(2000, 1, 1)?.and_hms_opt(12, 0, 0)?.and_utc();
        let millis = (self.seconds_since(Self::J2000) * 1e3).round();
        if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
            return None;
        }
        base.checked_add_signed(Duration::milliseconds(millis as i64))
    }

    /// ISO-8601 rendering, e.g. `2000-01-01T12:00:00.000Z`
    pub fn to_iso(&self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            None => format!("JD {}", self.0),
        }
    }
}

impl Default for JulianDate {
    fn default() -> Self {
        Self::J2000
    }
}

impl fmt::Display for JulianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JD {:.6}", self.0)
    }
}

impl From<DateTime<Utc>> for JulianDate {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl Add<f64> for JulianDate {
    type Output = Self;

    /// Add a number of days
    fn add(self, days: f64) -> Self::Output {
        Self(self.0 + days)
    }
}

impl Sub<f64> for JulianDate {
    type Output = Self;

    fn sub(self, days: f64) -> Self::Output {
        Self(self.0 - days)
    }
}

impl Sub<JulianDate> for JulianDate {
    type Output = f64;

    /// Difference in days
    fn sub(self, other: JulianDate) -> Self::Output {
        self.0 - other.0
    }
}

/// Calculate Julian day number from a proleptic Gregorian calendar date
///
/// This follows the algorithm in the Explanatory Supplement to the Astronomical Almanac 15.11.
pub fn julian_day(year: i32, month: u32, day: u32) -> i64 {
    let janfeb = month <= 2;
    let g = year as i64 + 4716 - if janfeb { 1 } else { 0 };
    let f = (month as i64 + 9) % 12;
    let e = 1461 * g / 4 + day as i64 - 1402;
    let j = e + (153 * f + 2) / 5;

    j + 38 - (g + 184) / 100 * 3 / 4
}

/// Convert an ISO-8601 date or date-time into a Julian Date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS[.fff]]` (a space may replace
/// the `T`) and RFC 3339 strings carrying a zone offset. Naive inputs are
/// taken as UTC.
pub fn to_julian_date(text: &str) -> Result<f64, FormatError> {
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(JulianDate::from_datetime(dt.with_timezone(&Utc)).jd());
    }
    for layout in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Ok(JulianDate::from_naive(&dt).jd());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(JulianDate::from_calendar(date.year(), date.month(), date.day(), 0, 0, 0.0).jd());
    }

    Err(FormatError::new(
        "epoch",
        text,
        "expected ISO-8601 such as 2000-01-01T12:00:00",
    ))
}

/// Parse an optional catalog epoch; an absent epoch means J2000
pub fn parse_epoch(text: Option<&str>) -> Result<JulianDate, FormatError> {
    match text {
        None => Ok(JulianDate::J2000),
        Some(text) => to_julian_date(text).map(JulianDate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn test_j2000_definition() {
        assert_relative_eq!(to_julian_date("2000-01-01T12:00:00").unwrap(), J2000, epsilon = 1e-9);
        assert_eq!(parse_epoch(None).unwrap(), JulianDate::J2000);
    }

    #[rstest]
    #[case("2000-01-01", 2_451_544.5)]
    #[case("2000-01-01 18:00", 2_451_545.25)]
    #[case("1987-04-10T19:21:00", 2_446_896.306_25)]
    #[case("2000-01-01T13:00:00+01:00", 2_451_545.0)]
    #[case("2000-01-01T12:00:00Z", 2_451_545.0)]
    #[case("1858-11-17T00:00:00.000", 2_400_000.5)]
    fn test_known_julian_dates(#[case] text: &str, #[case] expected: f64) {
        assert_relative_eq!(to_julian_date(text).unwrap(), expected, epsilon = 1e-8);
    }

    #[rstest]
    #[case("yesterday")]
    #[case("2000-13-01")]
    #[case("2000-02-30T00:00:00")]
    #[case("")]
    fn test_bad_epochs(#[case] text: &str) {
        let err = parse_epoch(Some(text)).unwrap_err();
        assert_eq!(err.what, "epoch");
    }

    #[test]
    fn test_datetime_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap();
        let jd = JulianDate::from_datetime(dt);
        assert_eq!(jd.to_datetime().unwrap(), dt);
        assert_eq!(jd.to_iso(), "2024-03-20T03:06:00.000Z");

        let dt = Utc.with_ymd_and_hms(2031, 11, 7, 23, 59, 59).unwrap() + Duration::milliseconds(250);
        assert_eq!(JulianDate::from_datetime(dt).to_datetime().unwrap(), dt);
    }

    #[test]
    fn test_arithmetic() {
        let t = JulianDate::J2000 + JULIAN_YEAR_DAYS;
        assert_relative_eq!(t.julian_years_since(JulianDate::J2000), 1.0);
        assert_relative_eq!(t - JulianDate::J2000, JULIAN_YEAR_DAYS);
        assert_relative_eq!((t - 1.0).seconds_since(JulianDate::J2000), (JULIAN_YEAR_DAYS - 1.0) * DAY_S);
    }
}
