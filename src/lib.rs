// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! sensorpoll - periodic sensor polling into a durable reading queue
//!
//! The polling engine owns one sampling task per registered sensor. Each
//! task takes a reading, appends it to the store, then waits for the rest
//! of the sensor's polling interval. Stopping joins every task before
//! returning.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               PollingEngine                  │
//! │  registry ──start──► task per sensor ──┐     │
//! │     ▲                                  │     │
//! │  add/remove            stop = cancel + join  │
//! └────────────────────────────────────────┼─────┘
//!          ▲                               ▼
//!   ┌─────────────┐                 ┌────────────┐
//!   │   Sensors   │                 │   Store    │
//!   │ DS18B20/sim │                 │ SQLite/mem │
//!   └─────────────┘                 └────────────┘
//! ```

pub mod core;
pub mod sensors;
pub mod config;
pub mod db;

// Re-exports for convenience
pub use config::Config;
pub use core::{PollingEngine, EngineError, LoopExit, LoopReport};
pub use sensors::{Sensor, SensorReading, SensorType, SamplingSchedule};
pub use db::{Store, ReadingQueue, SqliteStore, MemoryStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
