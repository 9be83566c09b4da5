//! Sensor module - hardware interfaces and simulations

mod traits;
mod schedule;
mod ds18b20;
mod simulator;

pub use traits::{Sensor, SensorReading, SensorType, MeasurementError, timestamp_now};
pub use schedule::{SamplingSchedule, ConfigError};
pub use ds18b20::{Ds18b20Sensor, parse_w1_slave, CONVERSION_TIME, DEFAULT_DEVICE_DIR};
pub use simulator::{SensorSimulator, SampleWindow};
