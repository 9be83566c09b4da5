// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! Per-sensor sampling loop

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::db::Store;
use crate::sensors::Sensor;

/// Why a sampling loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoopExit {
    /// Stop was requested
    Stopped,
    /// `sample` failed; the sensor is not polled again this session
    MeasurementFailed(String),
    /// The measurement took longer than the polling interval
    WaitUnderflow { interval: Duration, elapsed: Duration },
    /// The sampling task panicked
    Panicked(String),
}

/// Outcome of one sensor's loop for a polling session
#[derive(Debug, Clone)]
pub struct LoopReport {
    pub sensor_id: String,
    /// Successful samples taken
    pub samples: u64,
    pub exit: LoopExit,
}

/// Sample `sensor` until `cancel` fires or the loop fail-stops.
///
/// Each iteration waits `interval - elapsed`, where `elapsed` is how long
/// `sample` took, so consecutive samples start one interval apart. Store
/// failures are logged and do not end the loop.
pub async fn run_sampling_loop(
    sensor: Arc<dyn Sensor>,
    store: Arc<dyn Store>,
    cancel: CancellationToken,
) -> LoopReport {
    let sensor_id = sensor.id().to_string();
    let mut samples = 0u64;

    debug!(sensor_id = %sensor_id, "Sampling loop started");

    let exit = loop {
        if cancel.is_cancelled() {
            break LoopExit::Stopped;
        }

        let started = Instant::now();
        let result = sensor.sample().await;
        let elapsed = started.elapsed();

        match result {
            Ok(reading) => {
                samples += 1;
                debug!(sensor_id = %sensor_id, value = reading.value, ?elapsed, "Sampled");
                if let Err(e) = store.append(reading).await {
                    error!(sensor_id = %sensor_id, error = %e, "Failed to store reading");
                }
            }
            Err(e) => {
                error!(sensor_id = %sensor_id, error = %e, "Measurement failed, stopping sensor");
                break LoopExit::MeasurementFailed(e.to_string());
            }
        }

        let interval = sensor.polling_interval();
        let Some(wait) = interval.checked_sub(elapsed) else {
            warn!(
                sensor_id = %sensor_id,
                ?interval,
                ?elapsed,
                "Measurement exceeded polling interval, stopping sensor"
            );
            break LoopExit::WaitUnderflow { interval, elapsed };
        };

        tokio::select! {
            _ = cancel.cancelled() => break LoopExit::Stopped,
            _ = tokio::time::sleep(wait) => {}
        }
    };

    info!(sensor_id = %sensor_id, samples, exit = ?exit, "Sampling loop finished");

    LoopReport {
        sensor_id,
        samples,
        exit,
    }
}
