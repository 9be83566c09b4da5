// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! Sensor simulator for demo/testing

use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::prelude::*;
use tokio::time::Instant;

use super::schedule::{ConfigError, SamplingSchedule};
use super::{MeasurementError, Sensor, SensorReading, SensorType};

/// Start and end of one simulated measurement
#[derive(Debug, Clone, Copy)]
pub struct SampleWindow {
    pub started: Instant,
    pub finished: Instant,
}

/// Simulates a sensor with a configurable measurement delay and failure point
pub struct SensorSimulator {
    id: String,
    sensor_type: SensorType,
    schedule: Mutex<SamplingSchedule>,

    // Simulation parameters
    baseline: f64,
    noise_level: f64,
    delay: Duration,
    fail_after: Option<u64>,

    state: Mutex<SimState>,
}

struct SimState {
    rng: StdRng,
    samples: u64,
    drift: f64,
    windows: Vec<SampleWindow>,
}

impl SensorSimulator {
    pub fn new(id: &str, sensor_type: SensorType, interval: Duration) -> Self {
        let baseline = match sensor_type {
            SensorType::Temperature => 21.0,
            SensorType::Humidity => 45.0,
        };

        Self {
            id: id.to_string(),
            sensor_type,
            schedule: Mutex::new(SamplingSchedule::new_unchecked(interval, Duration::ZERO)),
            baseline,
            noise_level: 0.0,
            delay: Duration::ZERO,
            fail_after: None,
            state: Mutex::new(SimState {
                rng: StdRng::from_entropy(),
                samples: 0,
                drift: 0.0,
                windows: Vec::new(),
            }),
        }
    }

    /// Replace the declared interval and measurement cost
    pub fn with_schedule(mut self, schedule: SamplingSchedule) -> Self {
        self.schedule = Mutex::new(schedule);
        self
    }

    /// How long each `sample` call actually takes.
    ///
    /// Independent from the declared measurement cost so misbehaving
    /// hardware can be simulated.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    /// Add uniform noise of +/- `level` and a slow random drift
    pub fn with_noise(mut self, level: f64) -> Self {
        self.noise_level = level.abs();
        self
    }

    /// Succeed `n` times, then fail every subsequent sample
    pub fn fail_after(mut self, n: u64) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Number of `sample` calls so far, including failed ones
    pub fn sample_count(&self) -> u64 {
        self.state.lock().samples
    }

    /// Measurement windows of all successful samples
    pub fn windows(&self) -> Vec<SampleWindow> {
        self.state.lock().windows.clone()
    }

    fn generate_value(&self, state: &mut SimState) -> f64 {
        if self.noise_level == 0.0 {
            return self.baseline;
        }
        state.drift += state.rng.gen_range(-0.01..0.01) * self.noise_level;
        let noise = state.rng.gen_range(-self.noise_level..=self.noise_level);
        self.baseline + state.drift + noise
    }
}

#[async_trait]
impl Sensor for SensorSimulator {
    fn id(&self) -> &str { &self.id }
    fn sensor_type(&self) -> SensorType { self.sensor_type }

    async fn sample(&self) -> Result<SensorReading, MeasurementError> {
        let started = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut state = self.state.lock();
        state.samples += 1;
        if let Some(limit) = self.fail_after {
            if state.samples > limit {
                return Err(MeasurementError::Simulated { sample: state.samples });
            }
        }

        let value = self.generate_value(&mut state);
        state.windows.push(SampleWindow {
            started,
            finished: Instant::now(),
        });
        Ok(SensorReading::now(&self.id, value))
    }

    fn schedule(&self) -> SamplingSchedule {
        *self.schedule.lock()
    }

    fn set_polling_interval(&self, interval: Duration) -> Result<(), ConfigError> {
        self.schedule.lock().set_interval(interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_constant_value_without_noise() {
        let sim = SensorSimulator::new("sim-1", SensorType::Temperature, Duration::from_secs(1))
            .with_baseline(1.0);
        let r = sim.sample().await.unwrap();
        assert_eq!(r.sensor_id, "sim-1");
        assert_eq!(r.value, 1.0);
        assert_eq!(sim.sample_count(), 1);
    }

    #[tokio::test]
    async fn test_noise_stays_near_baseline() {
        let sim = SensorSimulator::new("hum", SensorType::Humidity, Duration::from_secs(1))
            .with_noise(0.5);
        for _ in 0..50 {
            let r = sim.sample().await.unwrap();
            assert!((r.value - 45.0).abs() < 1.0, "value {} drifted too far", r.value);
        }
    }

    #[tokio::test]
    async fn test_fail_after() {
        let sim = SensorSimulator::new("sim", SensorType::Temperature, Duration::from_secs(1))
            .fail_after(2);
        assert!(sim.sample().await.is_ok());
        assert!(sim.sample().await.is_ok());
        assert!(matches!(
            sim.sample().await,
            Err(MeasurementError::Simulated { sample: 3 })
        ));
        assert_eq!(sim.windows().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_recorded_in_window() {
        let sim = SensorSimulator::new("slow", SensorType::Temperature, Duration::from_secs(1))
            .with_delay(Duration::from_millis(250));
        sim.sample().await.unwrap();
        let w = sim.windows()[0];
        let took = w.finished - w.started;
        assert!(took >= Duration::from_millis(250) && took < Duration::from_millis(260));
    }

    #[test]
    fn test_set_interval_respects_declared_cost() {
        let schedule = SamplingSchedule::new(Duration::from_secs(2), Duration::from_secs(1)).unwrap();
        let sim = SensorSimulator::new("sim", SensorType::Temperature, Duration::from_secs(1))
            .with_schedule(schedule);
        assert!(sim.set_polling_interval(Duration::from_millis(500)).is_err());
        assert_eq!(sim.polling_interval(), Duration::from_secs(2));
    }
}
