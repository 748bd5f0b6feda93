use serde::{Deserialize, Serialize};
use std::fmt;

pub mod analyzer;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod geocode;
pub mod session;

pub use analyzer::{create_chart, AspectEntry, BirthProfile, Chart, ChartAnalyzer};
pub use config::{Config, EphemerisConfig};
pub use ephemeris::{AnalyticEphemeris, Ephemeris};
pub use error::{ChartError, ConfigError, EphemerisError, GeocodeError, SessionError};
pub use geocode::{GeoLocation, Gazetteer, Geocoder};
pub use session::{AnalysisRequest, Session, Speaker, Turn};

// ---------------------------
// ## Enumerations
// ---------------------------

/// Bodies carried by a chart. Discriminants follow the Swiss Ephemeris body
/// numbering; Rahu is the mean node and Ketu has no ephemeris id of its own.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum CelestialBody {
    Sun = 0,
    Moon = 1,
    Mercury = 2,
    Venus = 3,
    Mars = 4,
    Jupiter = 5,
    Saturn = 6,
    Rahu = 10,
    Ketu = 999,
}

/// Chart order. Planet listings and the aspect table are emitted in this order.
pub const ALL_BODIES: [CelestialBody; 9] = [
    CelestialBody::Sun,
    CelestialBody::Moon,
    CelestialBody::Mercury,
    CelestialBody::Venus,
    CelestialBody::Mars,
    CelestialBody::Jupiter,
    CelestialBody::Saturn,
    CelestialBody::Rahu,
    CelestialBody::Ketu,
];

impl CelestialBody {
    pub fn iter() -> impl Iterator<Item = CelestialBody> {
        ALL_BODIES.iter().copied()
    }

    /// Bodies the ephemeris is asked for. Ketu is derived from Rahu.
    pub fn looked_up() -> impl Iterator<Item = CelestialBody> {
        Self::iter().filter(|body| *body != CelestialBody::Ketu)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CelestialBody::Sun => "Sun",
            CelestialBody::Moon => "Moon",
            CelestialBody::Mercury => "Mercury",
            CelestialBody::Venus => "Venus",
            CelestialBody::Mars => "Mars",
            CelestialBody::Jupiter => "Jupiter",
            CelestialBody::Saturn => "Saturn",
            CelestialBody::Rahu => "Rahu",
            CelestialBody::Ketu => "Ketu",
        }
    }

    /// Exact, case-sensitive match on the display name.
    pub fn from_name(name: &str) -> Option<CelestialBody> {
        Self::iter().find(|body| body.name() == name)
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------
// ## Structures
// ---------------------------

pub type JulianDay = f64;

/// Ecliptic position of a body at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    /// Degrees in [0, 360).
    pub longitude: f64,
    pub latitude: f64,
    /// Astronomical units.
    pub distance: f64,
    /// Degrees per day in longitude; negative while retrograde.
    pub speed: f64,
}

impl BodyPosition {
    pub fn is_retrograde(&self) -> bool {
        self.speed < 0.0
    }
}

// ---------------------------
// ## Utility Functions
// ---------------------------

/// Wraps any angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest distance between two longitudes, in [0, 180].
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}
