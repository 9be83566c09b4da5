// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! Validated polling interval / measurement cost pair

use std::time::Duration;
use thiserror::Error;

/// Invalid interval or measurement cost configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("polling interval {interval:?} is shorter than measurement cost {measurement_cost:?}")]
    IntervalBelowCost {
        interval: Duration,
        measurement_cost: Duration,
    },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a finite number of seconds")]
    NotFinite { field: &'static str },

    #[error("{field} of {value} seconds is out of range")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Polling interval together with the sensor's measurement cost.
///
/// Every mutation keeps `interval >= measurement_cost`; a write that would
/// break it is rejected and the previous values stay in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingSchedule {
    interval: Duration,
    measurement_cost: Duration,
}

impl SamplingSchedule {
    pub fn new(interval: Duration, measurement_cost: Duration) -> Result<Self, ConfigError> {
        check(interval, measurement_cost)?;
        Ok(Self {
            interval,
            measurement_cost,
        })
    }

    /// Caller guarantees `interval >= measurement_cost`
    pub(crate) const fn new_unchecked(interval: Duration, measurement_cost: Duration) -> Self {
        Self {
            interval,
            measurement_cost,
        }
    }

    /// Build from fractional seconds, as found in config files
    pub fn from_secs_f64(interval_secs: f64, measurement_cost_secs: f64) -> Result<Self, ConfigError> {
        let interval = secs_to_duration("interval", interval_secs)?;
        let measurement_cost = secs_to_duration("measurement_cost", measurement_cost_secs)?;
        Self::new(interval, measurement_cost)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn measurement_cost(&self) -> Duration {
        self.measurement_cost
    }

    pub fn set_interval(&mut self, interval: Duration) -> Result<(), ConfigError> {
        check(interval, self.measurement_cost)?;
        self.interval = interval;
        Ok(())
    }

    pub fn set_measurement_cost(&mut self, measurement_cost: Duration) -> Result<(), ConfigError> {
        check(self.interval, measurement_cost)?;
        self.measurement_cost = measurement_cost;
        Ok(())
    }
}

fn check(interval: Duration, measurement_cost: Duration) -> Result<(), ConfigError> {
    if interval < measurement_cost {
        return Err(ConfigError::IntervalBelowCost {
            interval,
            measurement_cost,
        });
    }
    Ok(())
}

fn secs_to_duration(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::OutOfRange { field, value })
}
