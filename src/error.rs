//! Error types for chart construction, ephemeris lookups, geocoding,
//! sessions and configuration.

use thiserror::Error;

use crate::{CelestialBody, JulianDay};

/// The ephemeris could not produce a position.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EphemerisError {
    #[error("julian day {julian_day} is outside the supported range [{min}, {max})")]
    OutOfRange {
        julian_day: JulianDay,
        min: JulianDay,
        max: JulianDay,
    },

    #[error("julian day is not a finite number")]
    NonFiniteJulianDay,

    #[error("no ephemeris data for {0}")]
    UnsupportedBody(CelestialBody),
}

/// Chart construction failed; no partial chart exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    /// Missing or malformed birth date/time.
    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    #[error("Ephemeris Error: {0}")]
    EphemerisUnavailable(#[from] EphemerisError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("no place given")]
    EmptyQuery,

    #[error("could not find the location {0:?}")]
    NotFound(String),
}

/// Failures surfaced by [`crate::Session`]. Geocoding and chart failures stay
/// distinct so the front end can report them separately.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(
        "Could not find the location. Please enter a valid place (e.g., Guna, India or New York, USA)."
    )]
    Geocode(#[from] GeocodeError),

    #[error("Error analyzing kundli: {0}")]
    Chart(#[from] ChartError),

    #[error("Please type a question.")]
    EmptyQuestion,

    #[error("Please enter birth details and analyze kundli first!")]
    NotAnalyzed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Invalid(String),
}
