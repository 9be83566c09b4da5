// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! Sensor traits and common types

use std::time::Duration;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schedule::{ConfigError, SamplingSchedule};

/// Physical quantity a sensor measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Temperature,
    Humidity,
}

/// A single sensor reading
///
/// Readings are plain values: two readings are equal when sensor id,
/// timestamp and value all match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    /// Seconds since the Unix epoch, fractional
    pub timestamp: f64,
    pub value: f64,
}

impl SensorReading {
    pub fn new(sensor_id: &str, timestamp: f64, value: f64) -> Self {
        Self {
            sensor_id: sensor_id.to_string(),
            timestamp,
            value,
        }
    }

    /// Reading stamped with the current wall-clock time
    pub fn now(sensor_id: &str, value: f64) -> Self {
        Self::new(sensor_id, timestamp_now(), value)
    }
}

/// Current wall-clock time in fractional seconds since the Unix epoch
pub fn timestamp_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Failure while acquiring a single sample
#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("failed to read sensor device: {0}")]
    Io(#[from] std::io::Error),

    #[error("sensor {sensor_id} reported a CRC mismatch")]
    CrcMismatch { sensor_id: String },

    #[error("malformed sensor output: {0}")]
    Malformed(String),

    #[error("simulated failure on sample {sample}")]
    Simulated { sample: u64 },
}

/// Trait for all sensors
///
/// Sensors are shared between the caller and the sampling task, so every
/// method takes `&self`; implementations keep mutable state behind locks.
#[async_trait]
pub trait Sensor: Send + Sync {
    /// Get sensor identifier (not required to be unique)
    fn id(&self) -> &str;

    /// Get sensor type
    fn sensor_type(&self) -> SensorType;

    /// Acquire one reading
    async fn sample(&self) -> Result<SensorReading, MeasurementError>;

    /// Current polling interval and measurement cost
    fn schedule(&self) -> SamplingSchedule;

    /// Replace the polling interval, rejecting values below the measurement cost
    fn set_polling_interval(&self, interval: Duration) -> Result<(), ConfigError>;

    /// Time between the starts of consecutive samples
    fn polling_interval(&self) -> Duration {
        self.schedule().interval()
    }

    /// Expected duration of one `sample` call
    fn measurement_cost(&self) -> Duration {
        self.schedule().measurement_cost()
    }
}
