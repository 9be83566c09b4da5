// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! SQLite-backed durable reading queue

use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{ReadingQueue, Store, StoreError};
use crate::config::DatabaseConfig;
use crate::sensors::SensorReading;

/// List-backed queue persisted in a single SQLite table.
///
/// Rows keep insertion order through the autoincrement key; `pop` removes
/// from the head.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database file
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&config.path)?;

        conn.execute_batch(r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        "#)?;

        let store = Self::from_connection(conn)?;
        info!("Database opened at {:?}", config.path);
        Ok(store)
    }

    /// Non-persistent database, mainly for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sensor_id TEXT NOT NULL,
                timestamp REAL NOT NULL,
                value REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_readings_sensor ON readings(sensor_id);
        "#)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Every queued reading, oldest first
    pub fn all_readings(&self) -> Result<Vec<SensorReading>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT sensor_id, timestamp, value FROM readings ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(SensorReading {
                sensor_id: row.get(0)?,
                timestamp: row.get(1)?,
                value: row.get(2)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn stats(&self) -> Result<DatabaseStats, StoreError> {
        let conn = self.conn.lock();

        let reading_count: i64 = conn.query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        let sensor_count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT sensor_id) FROM readings",
            [],
            |row| row.get(0),
        )?;

        Ok(DatabaseStats {
            reading_count: reading_count as usize,
            sensor_count: sensor_count as usize,
        })
    }
}

#[async_trait]
impl Store for SqliteStore {
    /// The insert runs on the blocking pool; the caller's next sample waits
    /// for it, which keeps each sensor's rows in order.
    async fn append(&self, reading: SensorReading) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            conn.lock().execute(
                "INSERT INTO readings (sensor_id, timestamp, value) VALUES (?1, ?2, ?3)",
                params![reading.sensor_id, reading.timestamp, reading.value],
            )?;
            debug!(sensor_id = %reading.sensor_id, value = reading.value, "Stored reading");
            Ok::<_, StoreError>(())
        })
        .await?
    }
}

impl ReadingQueue for SqliteStore {
    fn readings_for(&self, sensor_id: &str) -> Result<Vec<SensorReading>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT sensor_id, timestamp, value FROM readings WHERE sensor_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![sensor_id], |row| {
            Ok(SensorReading {
                sensor_id: row.get(0)?,
                timestamp: row.get(1)?,
                value: row.get(2)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn pop(&self) -> Result<Option<SensorReading>, StoreError> {
        let conn = self.conn.lock();
        let reading = conn
            .query_row(
                "DELETE FROM readings WHERE id = (SELECT MIN(id) FROM readings)
                 RETURNING sensor_id, timestamp, value",
                [],
                |row| {
                    Ok(SensorReading {
                        sensor_id: row.get(0)?,
                        timestamp: row.get(1)?,
                        value: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(reading)
    }

    fn len(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub reading_count: usize,
    pub sensor_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_by_sensor_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let reading = SensorReading::new("sensor_id", 1_700_000_000.123456, 1.0);
        store.append(reading.clone()).await.unwrap();
        store.append(SensorReading::new("other", 5.0, -3.5)).await.unwrap();

        assert_eq!(store.readings_for("sensor_id").unwrap(), vec![reading]);
        assert!(store.readings_for("missing").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pop_removes_oldest() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.append(SensorReading::new("a", 1.0, 10.0)).await.unwrap();
        store.append(SensorReading::new("b", 2.0, 20.0)).await.unwrap();

        assert_eq!(store.pop().unwrap(), Some(SensorReading::new("a", 1.0, 10.0)));
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.pop().unwrap(), Some(SensorReading::new("b", 2.0, 20.0)));
        assert_eq!(store.pop().unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_keep_per_sensor_order() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let writers: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|id| {
                let store = store.clone();
                tokio::spawn(async move {
                    for i in 0..50 {
                        store.append(SensorReading::new(id, i as f64, 0.0)).await.unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        for id in ["a", "b", "c"] {
            let stamps: Vec<f64> = store.readings_for(id).unwrap().iter().map(|r| r.timestamp).collect();
            assert_eq!(stamps, (0..50).map(|i| i as f64).collect::<Vec<_>>());
        }
        assert_eq!(store.len().unwrap(), 150);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("nested").join("readings.db"),
        };

        {
            let store = SqliteStore::open(&config).unwrap();
            store.append(SensorReading::new("28-abc", 42.5, 19.75)).await.unwrap();
        }

        let store = SqliteStore::open(&config).unwrap();
        assert_eq!(
            store.all_readings().unwrap(),
            vec![SensorReading::new("28-abc", 42.5, 19.75)]
        );
        let stats = store.stats().unwrap();
        assert_eq!(stats.reading_count, 1);
        assert_eq!(stats.sensor_count, 1);
    }
}
