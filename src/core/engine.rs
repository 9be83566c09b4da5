// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! Polling engine - sensor registry and start/stop lifecycle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use futures::future::join_all;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::sampler::{run_sampling_loop, LoopExit, LoopReport};
use crate::db::Store;
use crate::sensors::Sensor;

/// Rejected lifecycle request
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("sensor {sensor_id} has a zero polling interval")]
    InvalidInterval { sensor_id: String },
}

/// Loops spawned by one `start_polling` call
struct PollingSession {
    cancel: CancellationToken,
    loops: Vec<(String, JoinHandle<LoopReport>)>,
    started: Instant,
}

/// Runs one sampling loop per registered sensor and forwards every reading
/// to the store.
///
/// Sensors are compared by identity, so two distinct sensors sharing an id
/// are tracked independently. The registry is snapshotted when polling
/// starts: sensors added while active are picked up on the next start.
pub struct PollingEngine {
    sensors: RwLock<Vec<Arc<dyn Sensor>>>,
    store: Arc<dyn Store>,
    // Held across the join in `stop_polling` so start/stop never interleave
    session: Mutex<Option<PollingSession>>,
    active: AtomicBool,
}

impl PollingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            sensors: RwLock::new(Vec::new()),
            store,
            session: Mutex::new(None),
            active: AtomicBool::new(false),
        }
    }

    /// Register `sensor`. Adding an instance that is already registered
    /// moves it to the end instead of registering it twice.
    pub fn add_sensor(&self, sensor: Arc<dyn Sensor>) {
        let target = Arc::as_ptr(&sensor).cast::<()>();
        let mut sensors = self.sensors.write();

        let before = sensors.len();
        sensors.retain(|s| Arc::as_ptr(s).cast::<()>() != target);
        if sensors.len() != before {
            debug!(sensor_id = sensor.id(), "Sensor already registered, moved to end");
        }

        info!(
            sensor_id = sensor.id(),
            sensor_type = ?sensor.sensor_type(),
            interval = ?sensor.polling_interval(),
            "Added sensor"
        );
        sensors.push(sensor);
    }

    /// Remove `sensor` by identity. Returns whether it was registered;
    /// removing an unknown sensor only logs.
    pub fn remove_sensor<S: Sensor + ?Sized>(&self, sensor: &Arc<S>) -> bool {
        let target = Arc::as_ptr(sensor).cast::<()>();
        let mut sensors = self.sensors.write();

        match sensors.iter().position(|s| Arc::as_ptr(s).cast::<()>() == target) {
            Some(index) => {
                let removed = sensors.remove(index);
                info!(sensor_id = removed.id(), "Removed sensor");
                true
            }
            None => {
                warn!(sensor_id = sensor.id(), "Tried to remove a sensor that is not registered");
                false
            }
        }
    }

    /// Registered sensors in insertion order
    pub fn sensors(&self) -> Vec<Arc<dyn Sensor>> {
        self.sensors.read().clone()
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.read().len()
    }

    /// True from a successful `start_polling` until `stop_polling` has
    /// joined every loop
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Loops of the current session that have not exited yet
    pub async fn running_loops(&self) -> usize {
        let session = self.session.lock().await;
        session
            .as_ref()
            .map(|s| s.loops.iter().filter(|(_, handle)| !handle.is_finished()).count())
            .unwrap_or(0)
    }

    /// Spawn one sampling loop per registered sensor and return.
    ///
    /// Calling this while already active does nothing. Every sensor's
    /// interval is checked before anything is spawned; on error the engine
    /// stays inactive. Must run inside a Tokio runtime.
    pub async fn start_polling(&self) -> Result<(), EngineError> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            warn!("Polling already active, ignoring start request");
            return Ok(());
        }

        let sensors = self.sensors();
        if let Some(bad) = sensors.iter().find(|s| s.polling_interval().is_zero()) {
            error!(sensor_id = bad.id(), "Refusing to start with a zero polling interval");
            return Err(EngineError::InvalidInterval {
                sensor_id: bad.id().to_string(),
            });
        }

        let cancel = CancellationToken::new();
        let loops = sensors
            .into_iter()
            .map(|sensor| {
                let id = sensor.id().to_string();
                let handle = tokio::spawn(run_sampling_loop(
                    sensor,
                    Arc::clone(&self.store),
                    cancel.clone(),
                ));
                (id, handle)
            })
            .collect::<Vec<_>>();

        info!(loops = loops.len(), "Polling started");

        *session = Some(PollingSession {
            cancel,
            loops,
            started: Instant::now(),
        });
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Signal every loop to stop and wait until all of them have exited.
    ///
    /// Returns how each loop ended; empty when polling was not active.
    pub async fn stop_polling(&self) -> Vec<LoopReport> {
        let mut session = self.session.lock().await;
        let Some(current) = session.take() else {
            debug!("Stop requested while idle");
            return Vec::new();
        };

        info!(loops = current.loops.len(), "Stopping polling...");
        current.cancel.cancel();

        let reports = join_all(current.loops.into_iter().map(|(sensor_id, handle)| async move {
            match handle.await {
                Ok(report) => report,
                Err(e) => {
                    error!(sensor_id = %sensor_id, error = %e, "Sampling task did not finish cleanly");
                    LoopReport {
                        sensor_id,
                        samples: 0,
                        exit: LoopExit::Panicked(e.to_string()),
                    }
                }
            }
        }))
        .await;

        self.active.store(false, Ordering::SeqCst);
        info!(
            uptime_secs = current.started.elapsed().as_secs(),
            samples = reports.iter().map(|r| r.samples).sum::<u64>(),
            "Polling stopped"
        );
        reports
    }
}

impl Drop for PollingEngine {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.cancel.cancel();
        }
    }
}
