//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `coop.toml` in the working directory, or at the path given by
//! `COOP_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values. Everything the
//! daemon builds from the configuration (conditions, door timing, pins) is
//! checked by [`Config::validate`] before anything touches the hardware.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use coop_app::door::{DoorPins, DoorTiming};
use coop_app::ports::PinId;
use coop_domain::condition::{Condition, Mode};
use coop_domain::duration::parse_positive;
use coop_domain::error::ParseError;
use coop_domain::location::Location;

const DEFAULT_PATH: &str = "coop.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location and schedule.
    pub coop: CoopConfig,
    /// Motor wiring and run times.
    pub door: DoorConfig,
    /// Pin driver selection.
    pub gpio: GpioConfig,
    /// Periodic check settings.
    pub scheduler: SchedulerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Coop location and opening/closing conditions.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CoopConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub opening: ConditionConfig,
    pub closing: ConditionConfig,
}

/// One condition as written in the file.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionConfig {
    /// `time_based` or `sun_based`.
    pub mode: String,
    /// `HHhMM` for `time_based`, a signed offset such as `-30m` for `sun_based`.
    pub value: String,
}

/// Motor driver wiring and run times.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    pub pin_direction_a: u32,
    pub pin_direction_b: u32,
    pub pin_enable: u32,
    /// How long the motor runs to open the door, e.g. `"45s"`.
    pub opening_duration: String,
    /// How long the motor runs to close the door.
    pub closing_duration: String,
}

/// Which pin driver to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpioDriver {
    /// Raspberry Pi GPIO peripheral.
    Rppal,
    /// In-memory pins, for dry runs.
    Virtual,
}

/// Pin driver configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub driver: GpioDriver,
}

/// Periodic check configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval between two checks, e.g. `"15s"`.
    pub check_interval: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `coop.toml` (or `COOP_CONFIG`), apply
    /// environment-variable overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("COOP_CONFIG")
            .map_or_else(|| PathBuf::from(DEFAULT_PATH), PathBuf::from);
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(lat) = var("COOP_LATITUDE").and_then(|val| val.parse().ok()) {
            self.coop.latitude = lat;
        }
        if let Some(lon) = var("COOP_LONGITUDE").and_then(|val| val.parse().ok()) {
            self.coop.longitude = lon;
        }
        match var("COOP_GPIO_DRIVER").as_deref() {
            Some("rppal") => self.gpio.driver = GpioDriver::Rppal,
            Some("virtual") => self.gpio.driver = GpioDriver::Virtual,
            _ => {}
        }
        if let Some(val) = var("COOP_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.opening_condition()?;
        self.closing_condition()?;
        self.door_timing()?;
        self.check_interval()?;

        let door = &self.door;
        if door.pin_direction_a == door.pin_direction_b
            || door.pin_direction_a == door.pin_enable
            || door.pin_direction_b == door.pin_enable
        {
            return Err(ConfigError::Validation(format!(
                "door pins must be distinct, got {}, {} and {}",
                door.pin_direction_a, door.pin_direction_b, door.pin_enable
            )));
        }

        self.log_filter()?;
        Ok(())
    }

    /// The coop location.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Value`] for out-of-range coordinates.
    pub fn location(&self) -> Result<Location, ConfigError> {
        Location::new(self.coop.latitude, self.coop.longitude).map_err(|source| {
            ConfigError::Value {
                key: "coop.latitude/longitude",
                source,
            }
        })
    }

    /// Build the opening condition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Value`] if the mode, value or location is invalid.
    pub fn opening_condition(&self) -> Result<Condition, ConfigError> {
        self.condition("coop.opening", &self.coop.opening)
    }

    /// Build the closing condition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Value`] if the mode, value or location is invalid.
    pub fn closing_condition(&self) -> Result<Condition, ConfigError> {
        self.condition("coop.closing", &self.coop.closing)
    }

    fn condition(
        &self,
        key: &'static str,
        config: &ConditionConfig,
    ) -> Result<Condition, ConfigError> {
        let location = self.location()?;
        config
            .mode
            .parse::<Mode>()
            .and_then(|mode| Condition::new(mode, &config.value, location))
            .map_err(|source| ConfigError::Value { key, source })
    }

    /// Door motor run times.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Value`] unless both durations are positive.
    pub fn door_timing(&self) -> Result<DoorTiming, ConfigError> {
        let opening = duration("door.opening_duration", &self.door.opening_duration)?;
        let closing = duration("door.closing_duration", &self.door.closing_duration)?;
        DoorTiming::new(opening, closing).map_err(|err| ConfigError::Validation(err.to_string()))
    }

    /// Door motor wiring.
    #[must_use]
    pub fn door_pins(&self) -> DoorPins {
        DoorPins {
            direction_a: PinId(self.door.pin_direction_a),
            direction_b: PinId(self.door.pin_direction_b),
            enable: PinId(self.door.pin_enable),
        }
    }

    /// Interval between two periodic checks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Value`] unless the interval is positive.
    pub fn check_interval(&self) -> Result<Duration, ConfigError> {
        duration("scheduler.check_interval", &self.scheduler.check_interval)
    }

    /// The tracing filter built from `logging.filter`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the filter does not parse.
    pub fn log_filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(&self.logging.filter).map_err(|err| {
            ConfigError::Validation(format!(
                "invalid logging.filter '{}': {err}",
                self.logging.filter
            ))
        })
    }
}

fn duration(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse_positive(value).map_err(|source| ConfigError::Value { key, source })
}

impl Default for CoopConfig {
    fn default() -> Self {
        Self {
            latitude: 48.8566,
            longitude: 2.3522,
            opening: ConditionConfig {
                mode: Mode::SunBased.to_string(),
                value: "0".to_string(),
            },
            closing: ConditionConfig {
                mode: Mode::SunBased.to_string(),
                value: "30m".to_string(),
            },
        }
    }
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            pin_direction_a: 23,
            pin_direction_b: 24,
            pin_enable: 25,
            opening_duration: "60s".to_string(),
            closing_duration: "60s".to_string(),
        }
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            driver: GpioDriver::Rppal,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval: "15s".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "coopd=info,coop_app=info,coop_adapter_gpio_rppal=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// A value could not be decoded.
    #[error("invalid value for {key}")]
    Value {
        key: &'static str,
        #[source]
        source: ParseError,
    },
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
