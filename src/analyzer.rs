//! Chart construction and the keyword responder.
//!
//! A [`ChartAnalyzer`] is built once from a [`BirthProfile`]: eight ephemeris
//! lookups, Ketu derived from Rahu, then the 36-row aspect table. After that it
//! is read-only.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::ephemeris::Ephemeris;
use crate::error::{ChartError, EphemerisError};
use crate::{
    angular_separation, normalize_degrees, BodyPosition, CelestialBody, JulianDay, ALL_BODIES,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

const FALLBACK: &str =
    "I can help you with planetary positions, aspects, and birth info. Ask me about the Sun, Moon, planets, or aspects.";

// ---------------------------
// ## Birth profile
// ---------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthProfile {
    name: String,
    /// Local civil time as entered, to the whole second; no timezone is
    /// attached or applied.
    birth_datetime: NaiveDateTime,
    /// Display only. Never geometrically resolved here.
    place: String,
}

impl BirthProfile {
    /// Sub-second precision is dropped.
    pub fn new(
        name: impl Into<String>,
        birth_datetime: NaiveDateTime,
        place: impl Into<String>,
    ) -> Self {
        BirthProfile {
            name: name.into(),
            birth_datetime: birth_datetime.with_nanosecond(0).unwrap_or(birth_datetime),
            place: place.into(),
        }
    }

    /// Builds a profile from raw form fields: `YYYY-MM-DD` and `HH:MM[:SS]`.
    pub fn parse(name: &str, date: &str, time: &str, place: &str) -> Result<Self, ChartError> {
        let date = date.trim();
        let time = time.trim();
        if date.is_empty() {
            return Err(ChartError::InvalidInput("date of birth is missing".to_string()));
        }
        if time.is_empty() {
            return Err(ChartError::InvalidInput("time of birth is missing".to_string()));
        }

        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|e| ChartError::InvalidInput(format!("date of birth {date:?}: {e}")))?;
        let time = TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(time, format).ok())
            .ok_or_else(|| {
                ChartError::InvalidInput(format!("time of birth {time:?} is not HH:MM or HH:MM:SS"))
            })?;

        Ok(Self::new(name, date.and_time(time), place))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birth_datetime(&self) -> NaiveDateTime {
        self.birth_datetime
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    /// Julian day of the birth instant. Seconds are dropped: only
    /// `hour + minute / 60` reaches the ephemeris.
    pub fn julian_day(&self, ephemeris: &dyn Ephemeris) -> JulianDay {
        let dt = self.birth_datetime;
        let hour = dt.hour() as f64 + dt.minute() as f64 / 60.0;
        ephemeris.julian_day(dt.year(), dt.month(), dt.day(), hour)
    }
}

// ---------------------------
// ## Chart
// ---------------------------

/// Positions of the nine chart bodies, in chart order. Serialize-only: a chart
/// only comes from [`Chart::compute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    julian_day: JulianDay,
    positions: [(CelestialBody, BodyPosition); 9],
}

impl Chart {
    pub fn compute(
        julian_day: JulianDay,
        ephemeris: &dyn Ephemeris,
    ) -> Result<Self, EphemerisError> {
        let mut positions = [(CelestialBody::Sun, BodyPosition::default()); 9];
        let mut rahu = None;

        for (slot, body) in positions.iter_mut().zip(ALL_BODIES) {
            let position = match body {
                CelestialBody::Ketu => {
                    let rahu = rahu.ok_or(EphemerisError::UnsupportedBody(CelestialBody::Ketu))?;
                    derive_ketu(&rahu)
                }
                _ => ephemeris.body_position(julian_day, body)?,
            };
            if body == CelestialBody::Rahu {
                rahu = Some(position);
            }
            *slot = (body, position);
        }

        Ok(Chart {
            julian_day,
            positions,
        })
    }

    pub fn julian_day(&self) -> JulianDay {
        self.julian_day
    }

    pub fn iter(&self) -> impl Iterator<Item = (CelestialBody, &BodyPosition)> {
        self.positions.iter().map(|(body, position)| (*body, position))
    }

    pub fn get(&self, body: CelestialBody) -> &BodyPosition {
        // every chart holds all nine bodies, in ALL_BODIES order
        let index = ALL_BODIES.iter().position(|b| *b == body).unwrap_or(0);
        &self.positions[index].1
    }

    pub fn by_name(&self, name: &str) -> Option<&BodyPosition> {
        CelestialBody::from_name(name).map(|body| self.get(body))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Ketu sits opposite Rahu and otherwise copies it unchanged, latitude and
/// speed included. Astronomically the latitude sign should flip; this keeps
/// the conventional shortcut.
pub fn derive_ketu(rahu: &BodyPosition) -> BodyPosition {
    BodyPosition {
        longitude: normalize_degrees(rahu.longitude + 180.0),
        ..*rahu
    }
}

// ---------------------------
// ## Aspects
// ---------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectEntry {
    pub body_a: CelestialBody,
    pub body_b: CelestialBody,
    /// Shortest separation, in [0, 180].
    pub degrees: f64,
}

/// One row per unordered pair. Rows follow chart order for both bodies, keeping
/// only pairs whose names sort `a < b`.
pub fn calculate_aspects(chart: &Chart) -> Vec<AspectEntry> {
    let mut aspects = Vec::with_capacity(36);
    for (body_a, position_a) in chart.iter() {
        for (body_b, position_b) in chart.iter() {
            if body_a.name() < body_b.name() {
                aspects.push(AspectEntry {
                    body_a,
                    body_b,
                    degrees: angular_separation(position_a.longitude, position_b.longitude),
                });
            }
        }
    }
    aspects
}

// ---------------------------
// ## Analyzer
// ---------------------------

/// Serialize-only. To restore one, deserialize its [`BirthProfile`] and call
/// [`ChartAnalyzer::new`] again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartAnalyzer {
    profile: BirthProfile,
    chart: Chart,
    aspects: Vec<AspectEntry>,
}

/// Builds an analyzer from loose fields.
pub fn create_chart(
    name: &str,
    birth_datetime: NaiveDateTime,
    place: &str,
    ephemeris: &dyn Ephemeris,
) -> Result<ChartAnalyzer, ChartError> {
    ChartAnalyzer::new(BirthProfile::new(name, birth_datetime, place), ephemeris)
}

impl ChartAnalyzer {
    /// Computes the chart and aspect table. Either everything succeeds or the
    /// first ephemeris failure is returned.
    pub fn new(profile: BirthProfile, ephemeris: &dyn Ephemeris) -> Result<Self, ChartError> {
        let julian_day = profile.julian_day(ephemeris);
        log::debug!(
            "computing chart for {:?} at {} (jd {julian_day})",
            profile.name(),
            profile.birth_datetime()
        );

        let chart = Chart::compute(julian_day, ephemeris)?;
        let aspects = calculate_aspects(&chart);
        log::info!(
            "chart ready: {} bodies, {} aspects, sun at {:.2}",
            chart.len(),
            aspects.len(),
            chart.get(CelestialBody::Sun).longitude
        );

        Ok(ChartAnalyzer {
            profile,
            chart,
            aspects,
        })
    }

    pub fn profile(&self) -> &BirthProfile {
        &self.profile
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn position(&self, body: CelestialBody) -> &BodyPosition {
        self.chart.get(body)
    }

    /// Longitude of the named body, or `0.0` when the name is not a chart body.
    pub fn position_of(&self, name: &str) -> f64 {
        self.chart.by_name(name).map_or(0.0, |position| position.longitude)
    }

    pub fn all_aspects(&self) -> &[AspectEntry] {
        &self.aspects
    }

    /// Answers a free-text question. Rules are plain substring checks on the
    /// lowercased query, tried in order; the first hit wins.
    pub fn respond(&self, query: &str) -> String {
        let query = query.to_lowercase();

        if query.contains("hello") || query.contains("hi") {
            format!(
                "Hello {}! How can I help you with your kundli analysis today?",
                self.profile.name
            )
        } else if query.contains("sun") {
            format!("The Sun is at {:.2}°.", self.position(CelestialBody::Sun).longitude)
        } else if query.contains("moon") {
            format!("The Moon is at {:.2}°.", self.position(CelestialBody::Moon).longitude)
        } else if query.contains("planets") {
            self.chart
                .iter()
                .map(|(body, position)| format!("{}: {:.2}°", body, position.longitude))
                .collect::<Vec<_>>()
                .join("\n")
        } else if query.contains("birth") {
            format!(
                "Name: {}\nDOB: {}\nPlace: {}",
                self.profile.name, self.profile.birth_datetime, self.profile.place
            )
        } else if query.contains("aspects") {
            self.aspects
                .iter()
                .map(|aspect| {
                    format!("{} - {}: {:.2}°", aspect.body_a, aspect.body_b, aspect.degrees)
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            FALLBACK.to_string()
        }
    }
}
