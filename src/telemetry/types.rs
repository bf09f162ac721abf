//! Record types handed to the storage collaborator.

use serde::Serialize;

/// One processed reading as seen by storage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageRecord {
    /// Sensor identity tag
    pub identity: String,

    /// Monotonic timestamp in microseconds
    pub timestamp_us: u64,

    /// Temperature in °C
    pub temperature: f64,

    /// Wind speed in sensor units
    pub wind_speed: f64,

    /// Wind direction in degrees
    pub wind_direction: f64,
}
