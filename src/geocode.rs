//! Place name → coordinates.
//!
//! Coordinates are shown to the user but never fed into the chart; positions
//! are geocentric.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GeocodeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub trait Geocoder {
    fn geocode(&self, place: &str) -> Result<GeoLocation, GeocodeError>;
}

/// In-memory place table, matched case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct Gazetteer {
    places: BTreeMap<String, (f64, f64)>,
}

const DEFAULT_PLACES: &[(&str, f64, f64)] = &[
    ("delhi", 28.6139, 77.2090),
    ("new delhi", 28.6139, 77.2090),
    ("mumbai", 19.0760, 72.8777),
    ("bangalore", 12.9716, 77.5946),
    ("bengaluru", 12.9716, 77.5946),
    ("chennai", 13.0827, 80.2707),
    ("kolkata", 22.5726, 88.3639),
    ("guna", 24.6470, 77.3113),
    ("kannur", 11.8740, 75.3600),
    ("malappuram", 10.7900, 76.0700),
    ("kochi", 9.9312, 76.2673),
    ("kollam", 8.8857, 76.5881),
    ("thrissur", 10.5220, 76.2100),
    ("calicut", 11.2588, 75.7804),
    ("kozhikode", 11.2588, 75.7804),
    ("wayanad", 11.6900, 75.8900),
    ("munnar", 10.0889, 77.0595),
    ("kottayam", 9.5916, 76.5222),
    ("alappuzha", 9.4900, 76.3200),
    ("abu dhabi", 24.4667, 54.3667),
    ("dubai", 25.276987, 55.296234),
    ("sharjah", 25.3550, 55.4000),
    ("london", 51.5074, -0.1278),
    ("new york", 40.7128, -74.0060),
];

impl Default for Gazetteer {
    fn default() -> Self {
        let mut gazetteer = Gazetteer::empty();
        for &(name, latitude, longitude) in DEFAULT_PLACES {
            gazetteer.insert(name, latitude, longitude);
        }
        gazetteer
    }
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Gazetteer {
            places: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, latitude: f64, longitude: f64) {
        self.places
            .insert(name.trim().to_lowercase(), (latitude, longitude));
    }

    pub fn with_place(mut self, name: &str, latitude: f64, longitude: f64) -> Self {
        self.insert(name, latitude, longitude);
        self
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    fn lookup(&self, key: &str) -> Option<(f64, f64)> {
        self.places.get(&key.trim().to_lowercase()).copied()
    }
}

impl Geocoder for Gazetteer {
    /// Tries the whole string, then the part before the first comma
    /// ("Guna, India" → "guna").
    fn geocode(&self, place: &str) -> Result<GeoLocation, GeocodeError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let city = place.split(',').next().unwrap_or(place);
        let (latitude, longitude) = self
            .lookup(place)
            .or_else(|| self.lookup(city))
            .ok_or_else(|| GeocodeError::NotFound(place.to_string()))?;

        log::info!("geocoded {place:?} to ({latitude:.4}, {longitude:.4})");
        Ok(GeoLocation {
            place: place.to_string(),
            latitude,
            longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn matches_city_before_comma() {
        let location = Gazetteer::new().geocode("Guna, India").unwrap();
        assert_eq!(location.place, "Guna, India");
        assert_abs_diff_eq!(location.latitude, 24.6470, epsilon = 1e-9);
    }

    #[test]
    fn full_name_match_is_case_insensitive() {
        let location = Gazetteer::new().geocode("  NEW YORK ").unwrap();
        assert_abs_diff_eq!(location.longitude, -74.0060, epsilon = 1e-9);
        assert!(Gazetteer::new().geocode("New York, USA").is_ok());
    }

    #[test]
    fn unknown_and_empty_places() {
        let gazetteer = Gazetteer::new();
        assert_eq!(
            gazetteer.geocode("Atlantis"),
            Err(GeocodeError::NotFound("Atlantis".to_string()))
        );
        assert_eq!(gazetteer.geocode("   "), Err(GeocodeError::EmptyQuery));
    }

    #[test]
    fn custom_places() {
        let gazetteer = Gazetteer::empty().with_place("Ujjain", 23.1765, 75.7885);
        assert_eq!(gazetteer.len(), 1);
        assert!(gazetteer.geocode("ujjain, MP").is_ok());
        assert!(gazetteer.geocode("Delhi").is_err());
    }
}
