//! Calendar → Julian day conversion and geocentric body positions.
//!
//! [`Ephemeris`] is the seam the chart code talks to. [`AnalyticEphemeris`]
//! implements it with mean Keplerian elements of date (tropical, equinox of
//! date), the principal periodic terms of the Moon, Jupiter and Saturn, and the
//! mean lunar node polynomial from Meeus, *Astronomical Algorithms* ch. 47.
//! Accuracy is a few arcminutes for the Sun and planets and better than half a
//! degree for the Moon, which is plenty for a chat chart.

use crate::config::EphemerisConfig;
use crate::error::{ConfigError, EphemerisError};
use crate::{normalize_degrees, BodyPosition, CelestialBody, JulianDay};

/// Julian day of 2000 Jan 0.0 UT; element epochs are counted from here.
const ELEMENT_EPOCH: JulianDay = 2451543.5;
/// J2000.0.
const J2000: JulianDay = 2451545.0;
const DAYS_PER_CENTURY: f64 = 36525.0;

/// Equatorial Earth radius expressed in AU.
const EARTH_RADIUS_AU: f64 = 6378.14 / 149_597_870.7;
/// Mean Earth–Moon distance in AU, reported as the distance of the node.
const MEAN_LUNAR_DISTANCE_AU: f64 = 0.002_569_555;

const KEPLER_MAX_ITER: usize = 30;
const KEPLER_TOLERANCE: f64 = 1e-12;

// ---------------------------
// ## Adapter contract
// ---------------------------

pub trait Ephemeris {
    /// Civil calendar date and fractional hour to Julian day. No timezone
    /// conversion is applied.
    fn julian_day(&self, year: i32, month: u32, day: u32, hour: f64) -> JulianDay {
        julian_day(year, month, day, hour)
    }

    /// Geocentric ecliptic coordinates of `body` at `julian_day`.
    fn body_position(
        &self,
        julian_day: JulianDay,
        body: CelestialBody,
    ) -> Result<BodyPosition, EphemerisError>;
}

/// Gregorian calendar to Julian day (Meeus ch. 7).
pub fn julian_day(year: i32, month: u32, day: u32, hour: f64) -> JulianDay {
    let (y, m) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };
    let century = (y as f64 / 100.0).floor();
    let gregorian = 2.0 - century + (century / 4.0).floor();

    (365.25 * (y as f64 + 4716.0)).floor()
        + (30.6001 * (m as f64 + 1.0)).floor()
        + day as f64
        + hour / 24.0
        + gregorian
        - 1524.5
}

// ---------------------------
// ## Analytic ephemeris
// ---------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticEphemeris {
    min_jd: JulianDay,
    max_jd: JulianDay,
    speed_step: f64,
}

impl Default for AnalyticEphemeris {
    fn default() -> Self {
        Self::from_valid_config(&EphemerisConfig::default())
    }
}

impl AnalyticEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EphemerisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: &EphemerisConfig) -> Self {
        AnalyticEphemeris {
            min_jd: julian_day(config.min_year, 1, 1, 0.0),
            max_jd: julian_day(config.max_year + 1, 1, 1, 0.0),
            speed_step: config.speed_step_days,
        }
    }

    /// Supported span as `[start, end)`.
    pub fn range(&self) -> (JulianDay, JulianDay) {
        (self.min_jd, self.max_jd)
    }

    fn check_range(&self, julian_day: JulianDay) -> Result<(), EphemerisError> {
        if !julian_day.is_finite() {
            return Err(EphemerisError::NonFiniteJulianDay);
        }
        if julian_day < self.min_jd || julian_day >= self.max_jd {
            return Err(EphemerisError::OutOfRange {
                julian_day,
                min: self.min_jd,
                max: self.max_jd,
            });
        }
        Ok(())
    }
}

impl Ephemeris for AnalyticEphemeris {
    fn body_position(
        &self,
        julian_day: JulianDay,
        body: CelestialBody,
    ) -> Result<BodyPosition, EphemerisError> {
        self.check_range(julian_day)?;

        let here = geocentric(julian_day, body)?;
        let before = geocentric(julian_day - self.speed_step, body)?;
        let after = geocentric(julian_day + self.speed_step, body)?;
        let speed = signed_difference(after.longitude, before.longitude) / (2.0 * self.speed_step);

        Ok(BodyPosition {
            longitude: here.longitude,
            latitude: here.latitude,
            distance: here.distance,
            speed,
        })
    }
}

/// `a - b` wrapped into (-180, 180].
fn signed_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_degrees(a - b);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

// ---------------------------
// ## Geometry
// ---------------------------

#[derive(Debug, Clone, Copy)]
struct Spherical {
    longitude: f64,
    latitude: f64,
    distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct Rectangular {
    x: f64,
    y: f64,
    z: f64,
}

impl Rectangular {
    fn to_spherical(self) -> Spherical {
        Spherical {
            longitude: normalize_degrees(self.y.atan2(self.x).to_degrees()),
            latitude: self.z.atan2(self.x.hypot(self.y)).to_degrees(),
            distance: (self.x * self.x + self.y * self.y + self.z * self.z).sqrt(),
        }
    }
}

impl Spherical {
    fn to_rectangular(self) -> Rectangular {
        let (lon, lat) = (self.longitude.to_radians(), self.latitude.to_radians());
        Rectangular {
            x: self.distance * lon.cos() * lat.cos(),
            y: self.distance * lon.sin() * lat.cos(),
            z: self.distance * lat.sin(),
        }
    }
}

fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

fn cos_deg(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

// ---------------------------
// ## Orbital elements
// ---------------------------

/// Mean elements in degrees; `a` is in AU, or Earth radii for the Moon.
#[derive(Debug, Clone, Copy)]
struct OrbitalElements {
    node: f64,
    inclination: f64,
    perihelion: f64,
    a: f64,
    e: f64,
    mean_anomaly: f64,
}

impl OrbitalElements {
    /// `d` is days since [`ELEMENT_EPOCH`].
    fn of(body: CelestialBody, d: f64) -> Option<OrbitalElements> {
        let elements = match body {
            CelestialBody::Sun => OrbitalElements {
                node: 0.0,
                inclination: 0.0,
                perihelion: 282.9404 + 4.70935e-5 * d,
                a: 1.0,
                e: 0.016709 - 1.151e-9 * d,
                mean_anomaly: 356.0470 + 0.9856002585 * d,
            },
            CelestialBody::Moon => OrbitalElements {
                node: 125.1228 - 0.0529538083 * d,
                inclination: 5.1454,
                perihelion: 318.0634 + 0.1643573223 * d,
                a: 60.2666,
                e: 0.054900,
                mean_anomaly: 115.3654 + 13.0649929509 * d,
            },
            CelestialBody::Mercury => OrbitalElements {
                node: 48.3313 + 3.24587e-5 * d,
                inclination: 7.0047 + 5.00e-8 * d,
                perihelion: 29.1241 + 1.01444e-5 * d,
                a: 0.387098,
                e: 0.205635 + 5.59e-10 * d,
                mean_anomaly: 168.6562 + 4.0923344368 * d,
            },
            CelestialBody::Venus => OrbitalElements {
                node: 76.6799 + 2.46590e-5 * d,
                inclination: 3.3946 + 2.75e-8 * d,
                perihelion: 54.8910 + 1.38374e-5 * d,
                a: 0.723330,
                e: 0.006773 - 1.302e-9 * d,
                mean_anomaly: 48.0052 + 1.6021302244 * d,
            },
            CelestialBody::Mars => OrbitalElements {
                node: 49.5574 + 2.11081e-5 * d,
                inclination: 1.8497 - 1.78e-8 * d,
                perihelion: 286.5016 + 2.92961e-5 * d,
                a: 1.523688,
                e: 0.093405 + 2.516e-9 * d,
                mean_anomaly: 18.6021 + 0.5240207766 * d,
            },
            CelestialBody::Jupiter => OrbitalElements {
                node: 100.4542 + 2.76854e-5 * d,
                inclination: 1.3030 - 1.557e-7 * d,
                perihelion: 273.8777 + 1.64505e-5 * d,
                a: 5.20256,
                e: 0.048498 + 4.469e-9 * d,
                mean_anomaly: 19.8950 + 0.0830853001 * d,
            },
            CelestialBody::Saturn => OrbitalElements {
                node: 113.6634 + 2.38980e-5 * d,
                inclination: 2.4886 - 1.081e-7 * d,
                perihelion: 339.3939 + 2.97661e-5 * d,
                a: 9.55475,
                e: 0.055546 - 9.499e-9 * d,
                mean_anomaly: 316.9670 + 0.0334442282 * d,
            },
            CelestialBody::Rahu | CelestialBody::Ketu => return None,
        };
        Some(elements)
    }

    /// Position in the frame the elements are referred to: geocentric for the
    /// Sun and Moon, heliocentric for the planets.
    fn position(&self) -> Rectangular {
        let mean_anomaly = normalize_degrees(self.mean_anomaly).to_radians();
        let ecc_anomaly = solve_kepler(mean_anomaly, self.e);

        let xv = self.a * (ecc_anomaly.cos() - self.e);
        let yv = self.a * (1.0 - self.e * self.e).sqrt() * ecc_anomaly.sin();
        let true_anomaly = yv.atan2(xv);
        let r = xv.hypot(yv);

        let node = self.node.to_radians();
        let incl = self.inclination.to_radians();
        let arg = true_anomaly + self.perihelion.to_radians();

        Rectangular {
            x: r * (node.cos() * arg.cos() - node.sin() * arg.sin() * incl.cos()),
            y: r * (node.sin() * arg.cos() + node.cos() * arg.sin() * incl.cos()),
            z: r * arg.sin() * incl.sin(),
        }
    }
}

/// Eccentric anomaly (radians) by Newton iteration on Kepler's equation.
fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc_anomaly =
        mean_anomaly + e * mean_anomaly.sin() * (1.0 + e * mean_anomaly.cos());
    for _ in 0..KEPLER_MAX_ITER {
        let delta = (ecc_anomaly - e * ecc_anomaly.sin() - mean_anomaly)
            / (1.0 - e * ecc_anomaly.cos());
        ecc_anomaly -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    ecc_anomaly
}

fn elements(body: CelestialBody, d: f64) -> Result<OrbitalElements, EphemerisError> {
    OrbitalElements::of(body, d).ok_or(EphemerisError::UnsupportedBody(body))
}

// ---------------------------
// ## Per-body positions
// ---------------------------

fn geocentric(julian_day: JulianDay, body: CelestialBody) -> Result<Spherical, EphemerisError> {
    let d = julian_day - ELEMENT_EPOCH;
    match body {
        CelestialBody::Sun => Ok(elements(body, d)?.position().to_spherical()),
        CelestialBody::Moon => moon(d),
        CelestialBody::Rahu => Ok(mean_node(julian_day)),
        CelestialBody::Ketu => Err(EphemerisError::UnsupportedBody(body)),
        planet => planet_geocentric(planet, d),
    }
}

fn moon(d: f64) -> Result<Spherical, EphemerisError> {
    let sun = elements(CelestialBody::Sun, d)?;
    let moon = elements(CelestialBody::Moon, d)?;
    let mut pos = moon.position().to_spherical();

    let ms = sun.mean_anomaly;
    let mm = moon.mean_anomaly;
    let sun_lon = ms + sun.perihelion;
    let moon_lon = mm + moon.perihelion + moon.node;
    let d_el = moon_lon - sun_lon;
    let f = moon_lon - moon.node;

    pos.longitude = normalize_degrees(
        pos.longitude - 1.274 * sin_deg(mm - 2.0 * d_el) // evection
            + 0.658 * sin_deg(2.0 * d_el) // variation
            - 0.186 * sin_deg(ms) // yearly equation
            - 0.059 * sin_deg(2.0 * mm - 2.0 * d_el)
            - 0.057 * sin_deg(mm - 2.0 * d_el + ms)
            + 0.053 * sin_deg(mm + 2.0 * d_el)
            + 0.046 * sin_deg(2.0 * d_el - ms)
            + 0.041 * sin_deg(mm - ms)
            - 0.035 * sin_deg(d_el) // parallactic equation
            - 0.031 * sin_deg(mm + ms)
            - 0.015 * sin_deg(2.0 * f - 2.0 * d_el)
            + 0.011 * sin_deg(mm - 4.0 * d_el),
    );
    pos.latitude += -0.173 * sin_deg(f - 2.0 * d_el) - 0.055 * sin_deg(mm - f - 2.0 * d_el)
        - 0.046 * sin_deg(mm + f - 2.0 * d_el)
        + 0.033 * sin_deg(f + 2.0 * d_el)
        + 0.017 * sin_deg(2.0 * mm + f);
    pos.distance += -0.58 * cos_deg(mm - 2.0 * d_el) - 0.46 * cos_deg(2.0 * d_el);

    pos.distance *= EARTH_RADIUS_AU;
    Ok(pos)
}

fn planet_geocentric(planet: CelestialBody, d: f64) -> Result<Spherical, EphemerisError> {
    let mut helio = elements(planet, d)?.position().to_spherical();

    if matches!(planet, CelestialBody::Jupiter | CelestialBody::Saturn) {
        let mj = elements(CelestialBody::Jupiter, d)?.mean_anomaly;
        let ms = elements(CelestialBody::Saturn, d)?.mean_anomaly;
        let (dlon, dlat) = giant_planet_perturbation(planet, mj, ms);
        helio.longitude = normalize_degrees(helio.longitude + dlon);
        helio.latitude += dlat;
    }

    let helio = helio.to_rectangular();
    let sun = elements(CelestialBody::Sun, d)?.position();
    Ok(Rectangular {
        x: helio.x + sun.x,
        y: helio.y + sun.y,
        z: helio.z + sun.z,
    }
    .to_spherical())
}

/// Jupiter–Saturn mutual terms (the "great inequality" and friends), in
/// degrees of heliocentric longitude and latitude.
fn giant_planet_perturbation(planet: CelestialBody, mj: f64, ms: f64) -> (f64, f64) {
    match planet {
        CelestialBody::Jupiter => (
            -0.332 * sin_deg(2.0 * mj - 5.0 * ms - 67.6)
                - 0.056 * sin_deg(2.0 * mj - 2.0 * ms + 21.0)
                + 0.042 * sin_deg(3.0 * mj - 5.0 * ms + 21.0)
                - 0.036 * sin_deg(mj - 2.0 * ms)
                + 0.022 * cos_deg(mj - ms)
                + 0.023 * sin_deg(2.0 * mj - 3.0 * ms + 52.0)
                - 0.016 * sin_deg(mj - 5.0 * ms - 69.0),
            0.0,
        ),
        CelestialBody::Saturn => (
            0.812 * sin_deg(2.0 * mj - 5.0 * ms - 67.6)
                - 0.229 * cos_deg(2.0 * mj - 4.0 * ms - 2.0)
                + 0.119 * sin_deg(mj - 2.0 * ms - 3.0)
                + 0.046 * sin_deg(2.0 * mj - 6.0 * ms - 69.0)
                + 0.014 * sin_deg(mj - 3.0 * ms + 32.0),
            -0.020 * cos_deg(2.0 * mj - 4.0 * ms - 2.0)
                + 0.018 * sin_deg(2.0 * mj - 6.0 * ms - 49.0),
        ),
        _ => (0.0, 0.0),
    }
}

/// Mean longitude of the Moon's ascending node (Meeus 47.7).
fn mean_node(julian_day: JulianDay) -> Spherical {
    let t = (julian_day - J2000) / DAYS_PER_CENTURY;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let omega = 125.0445479 - 1934.1362891 * t + 0.0020754 * t2 + t3 / 467_441.0
        - t4 / 60_616_000.0;

    Spherical {
        longitude: normalize_degrees(omega),
        latitude: 0.0,
        distance: MEAN_LUNAR_DISTANCE_AU,
    }
}
