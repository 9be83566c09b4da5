// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! Configuration module

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

use crate::sensors::{
    Ds18b20Sensor, SamplingSchedule, Sensor, SensorSimulator, SensorType, CONVERSION_TIME,
    DEFAULT_DEVICE_DIR,
};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level
    pub log_level: String,

    /// Poll simulated sensors instead of the configured ones
    pub demo_mode: bool,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Sensors to register at startup
    pub sensors: Vec<SensorSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo_mode: false,
            database: DatabaseConfig::default(),
            sensors: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        self.write(path)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        let (config, origin) = Self::open(path)?;
        info!("Configuration {} {:?}", origin, path);
        Ok(config)
    }

    /// Like `load_or_create` but emits nothing, for use before logging is
    /// installed. The caller reports the returned origin.
    pub fn open(path: &Path) -> Result<(Self, ConfigOrigin)> {
        if path.exists() {
            return Ok((Self::read(path)?, ConfigOrigin::Loaded));
        }

        let config = Self::default();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        config.write(path)?;
        Ok((config, ConfigOrigin::Created))
    }

    /// Parsed `log_level`, or `None` when it names no tracing level
    pub fn parsed_log_level(&self) -> Option<Level> {
        self.log_level.parse().ok()
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn write(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("sensorpoll"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Sensors registered when running in demo mode
    pub fn demo_sensors() -> Vec<SensorSpec> {
        vec![
            SensorSpec::simulated("demo-temp-1", SensorType::Temperature, 1.0),
            SensorSpec::simulated("demo-temp-2", SensorType::Temperature, 2.5),
            SensorSpec::simulated("demo-humidity-1", SensorType::Humidity, 5.0),
        ]
    }

    /// Sensors to poll: the configured list, or the demo set in demo mode
    pub fn active_sensors(&self) -> Vec<SensorSpec> {
        if self.demo_mode {
            Self::demo_sensors()
        } else {
            self.sensors.clone()
        }
    }
}

/// Whether `Config::open` read an existing file or wrote the defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Loaded,
    Created,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Loaded => write!(f, "loaded from"),
            ConfigOrigin::Created => write!(f, "created at"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database path
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/sensorpoll.db"),
        }
    }
}

/// Sensor driver selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Ds18b20,
    Simulated,
}

/// One `[[sensors]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSpec {
    pub id: String,
    pub kind: SensorKind,
    #[serde(default = "default_sensor_type")]
    pub sensor_type: SensorType,

    /// Seconds between the starts of consecutive samples
    pub interval_secs: f64,

    /// Declared time one measurement takes; driver default when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_cost_secs: Option<f64>,

    /// DS18B20 only: w1 device directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_dir: Option<PathBuf>,

    /// Simulated only: artificial measurement delay in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_secs: Option<f64>,

    /// Simulated only: noise amplitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
}

fn default_sensor_type() -> SensorType {
    SensorType::Temperature
}

impl SensorSpec {
    pub fn simulated(id: &str, sensor_type: SensorType, interval_secs: f64) -> Self {
        Self {
            id: id.to_string(),
            kind: SensorKind::Simulated,
            sensor_type,
            interval_secs,
            measurement_cost_secs: None,
            device_dir: None,
            delay_secs: Some(0.05),
            noise: Some(0.2),
        }
    }

    /// Validate the schedule and instantiate the driver
    pub fn build(&self) -> Result<Arc<dyn Sensor>> {
        let default_cost = match self.kind {
            SensorKind::Ds18b20 => CONVERSION_TIME.as_secs_f64(),
            SensorKind::Simulated => 0.0,
        };
        let schedule = SamplingSchedule::from_secs_f64(
            self.interval_secs,
            self.measurement_cost_secs.unwrap_or(default_cost),
        )
        .with_context(|| format!("invalid schedule for sensor {}", self.id))?;

        let sensor: Arc<dyn Sensor> = match self.kind {
            SensorKind::Ds18b20 => {
                let dir = self
                    .device_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE_DIR));
                Arc::new(Ds18b20Sensor::with_device_dir(&self.id, &dir).with_schedule(schedule))
            }
            SensorKind::Simulated => {
                let delay = Duration::try_from_secs_f64(self.delay_secs.unwrap_or(0.0))
                    .with_context(|| format!("invalid delay for sensor {}", self.id))?;
                Arc::new(
                    SensorSimulator::new(&self.id, self.sensor_type, schedule.interval())
                        .with_schedule(schedule)
                        .with_delay(delay)
                        .with_noise(self.noise.unwrap_or(0.0)),
                )
            }
        };

        Ok(sensor)
    }
}
