//! Constants module for ephemeris calculations

use std::f64::consts::PI;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date (2000-01-01T12:00:00)
pub const J2000: f64 = 2_451_545.0;
/// Days in a Julian year
pub const JULIAN_YEAR_DAYS: f64 = 365.25;
/// Seconds in a Julian year
pub const JULIAN_YEAR_S: f64 = JULIAN_YEAR_DAYS * DAY_S;

// Angles
/// Arcseconds to radians conversion factor
pub const ASEC2RAD: f64 = 4.848_136_811_095_36e-6;
/// Milliarcseconds to radians conversion factor
pub const MAS2RAD: f64 = ASEC2RAD / 1000.0;
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Hours of right ascension to radians
pub const HOUR2RAD: f64 = PI / 12.0;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;

// Physics
/// Newtonian constant of gravitation in km^3/(kg s^2) (CODATA 2018)
pub const G_KM: f64 = 6.674_30e-20;
/// Speed of light in km/s
pub const C_KMS: f64 = 299_792.458;
/// Light-year in kilometers (Julian year)
pub const LIGHT_YEAR_KM: f64 = C_KMS * JULIAN_YEAR_S;
/// Density in g/mL expressed as kg/km^3
pub const G_PER_ML_TO_KG_PER_KM3: f64 = 1.0e12;
