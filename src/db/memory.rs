// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! In-process reading queue

use std::collections::VecDeque;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ReadingQueue, Store, StoreError};
use crate::sensors::SensorReading;

/// Volatile store backed by a `VecDeque`
#[derive(Default)]
pub struct MemoryStore {
    readings: Mutex<VecDeque<SensorReading>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything currently queued, oldest first
    pub fn snapshot(&self) -> Vec<SensorReading> {
        self.readings.lock().iter().cloned().collect()
    }

    pub fn count_for(&self, sensor_id: &str) -> usize {
        self.readings
            .lock()
            .iter()
            .filter(|r| r.sensor_id == sensor_id)
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn append(&self, reading: SensorReading) -> Result<(), StoreError> {
        self.readings.lock().push_back(reading);
        Ok(())
    }
}

impl ReadingQueue for MemoryStore {
    fn readings_for(&self, sensor_id: &str) -> Result<Vec<SensorReading>, StoreError> {
        Ok(self
            .readings
            .lock()
            .iter()
            .filter(|r| r.sensor_id == sensor_id)
            .cloned()
            .collect())
    }

    fn pop(&self) -> Result<Option<SensorReading>, StoreError> {
        Ok(self.readings.lock().pop_front())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.readings.lock().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_by_sensor_id() {
        let store = MemoryStore::new();
        let reading = SensorReading::new("sensor_id", 1_700_000_000.123456, 1.0);
        store.append(reading.clone()).await.unwrap();
        store.append(SensorReading::new("other", 1.0, 2.0)).await.unwrap();

        assert_eq!(store.readings_for("sensor_id").unwrap(), vec![reading]);
        assert_eq!(store.count_for("other"), 1);
    }

    #[tokio::test]
    async fn test_pop_is_fifo() {
        let store = MemoryStore::new();
        store.append(SensorReading::new("a", 1.0, 1.0)).await.unwrap();
        store.append(SensorReading::new("a", 2.0, 2.0)).await.unwrap();

        assert_eq!(store.pop().unwrap().unwrap().timestamp, 1.0);
        assert_eq!(store.pop().unwrap().unwrap().timestamp, 2.0);
        assert!(store.pop().unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }
}
