// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! DS18B20 1-Wire temperature sensor read through the Linux w1 sysfs interface

use std::path::{Path, PathBuf};
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::schedule::{ConfigError, SamplingSchedule};
use super::{MeasurementError, Sensor, SensorReading, SensorType};

/// Where the w1-gpio/w1-therm kernel modules expose devices
pub const DEFAULT_DEVICE_DIR: &str = "/sys/bus/w1/devices";

/// 12-bit conversion time from the datasheet
pub const CONVERSION_TIME: Duration = Duration::from_millis(750);

/// DS18B20 digital thermometer
pub struct Ds18b20Sensor {
    id: String,
    slave_file: PathBuf,
    schedule: Mutex<SamplingSchedule>,
}

impl Ds18b20Sensor {
    /// Sensor `device_id` (e.g. `28-00000a1b2c3d`) under the default sysfs directory
    pub fn new(device_id: &str) -> Self {
        Self::with_device_dir(device_id, Path::new(DEFAULT_DEVICE_DIR))
    }

    pub fn with_device_dir(device_id: &str, device_dir: &Path) -> Self {
        let schedule = SamplingSchedule::new_unchecked(Duration::from_secs(1), CONVERSION_TIME);
        Self {
            id: device_id.to_string(),
            slave_file: device_dir.join(device_id).join("w1_slave"),
            schedule: Mutex::new(schedule),
        }
    }

    pub fn with_schedule(mut self, schedule: SamplingSchedule) -> Self {
        self.schedule = Mutex::new(schedule);
        self
    }

    pub fn slave_file(&self) -> &Path {
        &self.slave_file
    }
}

#[async_trait]
impl Sensor for Ds18b20Sensor {
    fn id(&self) -> &str { &self.id }
    fn sensor_type(&self) -> SensorType { SensorType::Temperature }

    async fn sample(&self) -> Result<SensorReading, MeasurementError> {
        let raw = tokio::fs::read_to_string(&self.slave_file).await?;
        let celsius = parse_w1_slave(&self.id, &raw)?;
        Ok(SensorReading::now(&self.id, celsius))
    }

    fn schedule(&self) -> SamplingSchedule {
        *self.schedule.lock()
    }

    fn set_polling_interval(&self, interval: Duration) -> Result<(), ConfigError> {
        self.schedule.lock().set_interval(interval)
    }
}

/// Parse the two-line `w1_slave` output into degrees Celsius.
///
/// ```text
/// 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
/// 72 01 4b 46 7f ff 0e 10 57 t=23125
/// ```
pub fn parse_w1_slave(sensor_id: &str, raw: &str) -> Result<f64, MeasurementError> {
    let mut lines = raw.lines();
    let crc_line = lines
        .next()
        .ok_or_else(|| MeasurementError::Malformed("empty w1_slave output".to_string()))?;
    if !crc_line.trim_end().ends_with("YES") {
        return Err(MeasurementError::CrcMismatch {
            sensor_id: sensor_id.to_string(),
        });
    }

    let data_line = lines
        .next()
        .ok_or_else(|| MeasurementError::Malformed("missing temperature line".to_string()))?;
    let (_, millis) = data_line
        .rsplit_once("t=")
        .ok_or_else(|| MeasurementError::Malformed(format!("no t= field in {data_line:?}")))?;
    let millis: i64 = millis
        .trim()
        .parse()
        .map_err(|_| MeasurementError::Malformed(format!("bad temperature {millis:?}")))?;

    Ok(millis as f64 / 1000.0)
}
