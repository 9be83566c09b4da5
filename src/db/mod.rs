// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! Storage backends for sensor readings

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, DatabaseStats};

use async_trait::async_trait;
use thiserror::Error;

use crate::sensors::SensorReading;

/// Storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Sink for readings produced by the sampling loops.
///
/// Called concurrently from every loop, so implementations synchronize
/// internally. Readings from one loop arrive in the order they were taken.
#[async_trait]
pub trait Store: Send + Sync {
    async fn append(&self, reading: SensorReading) -> Result<(), StoreError>;
}

/// Retrieval side of a list-backed store
pub trait ReadingQueue {
    /// All stored readings for `sensor_id`, oldest first
    fn readings_for(&self, sensor_id: &str) -> Result<Vec<SensorReading>, StoreError>;

    /// Remove and return the oldest reading
    fn pop(&self) -> Result<Option<SensorReading>, StoreError>;

    /// Number of queued readings
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
