//! Runtime settings, read from a JSON file with serde defaults for every field.

use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming a config file when none is passed explicitly.
pub const CONFIG_ENV: &str = "KUNDLI_CHAT_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ephemeris: EphemerisConfig,
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ephemeris: EphemerisConfig::default(),
            log_filter: "warn".to_string(),
        }
    }
}

/// Bounds and sampling for [`crate::AnalyticEphemeris`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EphemerisConfig {
    /// First supported calendar year (inclusive).
    pub min_year: i32,
    /// Last supported calendar year (inclusive).
    pub max_year: i32,
    /// Half-width of the central difference used for daily speed.
    pub speed_step_days: f64,
}

impl Default for EphemerisConfig {
    // Same span as the sepl_18 data file.
    fn default() -> Self {
        EphemerisConfig {
            min_year: 1800,
            max_year: 2399,
            speed_step_days: 0.01,
        }
    }
}

impl EphemerisConfig {
    /// Years must be representable by `chrono::NaiveDate` and ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (first, last) = (NaiveDate::MIN.year(), NaiveDate::MAX.year());
        for (field, year) in [("min_year", self.min_year), ("max_year", self.max_year)] {
            if !(first..last).contains(&year) {
                return Err(ConfigError::Invalid(format!(
                    "{field} {year} is outside {first}..{last}"
                )));
            }
        }
        if self.min_year > self.max_year {
            return Err(ConfigError::Invalid(format!(
                "min_year {} is after max_year {}",
                self.min_year, self.max_year
            )));
        }
        if !(self.speed_step_days.is_finite() && self.speed_step_days > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "speed_step_days must be positive, got {}",
                self.speed_step_days
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(raw)?;
        config.ephemeris.validate()?;
        Ok(config)
    }

    /// Explicit path first, then `KUNDLI_CHAT_CONFIG`, then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            log::debug!("loading config from {}", path.display());
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(env_path) => {
                log::debug!("loading config from ${} = {:?}", CONFIG_ENV, env_path);
                Self::from_file(Path::new(&env_path))
            }
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = Config::from_json(r#"{ "ephemeris": { "max_year": 2100 } }"#).unwrap();
        assert_eq!(config.ephemeris.min_year, 1800);
        assert_eq!(config.ephemeris.max_year, 2100);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn reads_a_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "log_filter": "debug",
                 "ephemeris": {{ "min_year": 1900, "max_year": 2000, "speed_step_days": 0.5 }} }}"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(
            config.ephemeris,
            EphemerisConfig {
                min_year: 1900,
                max_year: 2000,
                speed_step_days: 0.5
            }
        );
    }

    #[test]
    fn rejects_inverted_year_range() {
        let err = Config::from_json(r#"{ "ephemeris": { "min_year": 2100, "max_year": 2000 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_years_chrono_cannot_represent() {
        for raw in [
            r#"{ "ephemeris": { "min_year": 1800, "max_year": 2147483647 } }"#,
            r#"{ "ephemeris": { "min_year": -2147483648, "max_year": 2000 } }"#,
        ] {
            assert!(
                matches!(Config::from_json(raw), Err(ConfigError::Invalid(_))),
                "{raw}"
            );
        }
        let config = EphemerisConfig {
            max_year: i32::MAX,
            ..EphemerisConfig::default()
        };
        assert!(crate::AnalyticEphemeris::from_config(&config).is_err());
    }

    #[test]
    fn rejects_non_positive_step() {
        let config = EphemerisConfig {
            speed_step_days: 0.0,
            ..EphemerisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Config::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
