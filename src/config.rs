//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, WxIngestError};
use crate::frame::protocol::MAX_FRAME_LEN;
use crate::ingest::queue::MAX_QUEUE_SLOTS;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_enabled")]
    pub enabled: bool,

    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

/// Frame synchronizer configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub resync_on_start_marker: bool,
}

/// Ingestion queue configuration
#[derive(Debug, Deserialize, Clone)]
pub struct QueueConfig {
    #[serde(default = "default_queue_slots")]
    pub slots: usize,

    #[serde(default = "default_message_size")]
    pub message_size: usize,
}

/// Sensor identity configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    #[serde(default = "default_identity")]
    pub identity: String,
}

/// Frame simulator configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_simulator_interval_ms")]
    pub interval_ms: u64,

    #[serde(default)]
    pub seed: Option<u64>,
}

/// Storage adapter configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_storage_format")]
    pub format: String,
}

/// Application log configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files; empty logs to stdout
    #[serde(default)]
    pub file_dir: String,
}

// Default value functions
fn default_serial_enabled() -> bool { true }
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_read_buffer_size() -> usize { 64 }

fn default_queue_slots() -> usize { 10 }
fn default_message_size() -> usize { MAX_FRAME_LEN }

fn default_identity() -> String { "WX-01".to_string() }

fn default_simulator_interval_ms() -> u64 { 1000 }

fn default_storage_enabled() -> bool { true }
fn default_log_dir() -> String { "./data".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_storage_format() -> String { "jsonl".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            enabled: default_serial_enabled(),
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            slots: default_queue_slots(),
            message_size: default_message_size(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            identity: default_identity(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_simulator_interval_ms(),
            seed: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: default_storage_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_storage_format(),
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> WxIngestError {
    WxIngestError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wx_ingest::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if !self.serial.enabled && !self.simulator.enabled {
            return Err(invalid("at least one of serial or simulator must be enabled"));
        }

        if self.serial.enabled && self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if ![1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200].contains(&self.serial.baud_rate) {
            return Err(invalid(
                "baud_rate must be one of: 1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200",
            ));
        }

        if self.serial.read_buffer_size == 0 || self.serial.read_buffer_size > 4096 {
            return Err(invalid("read_buffer_size must be between 1 and 4096"));
        }

        if self.queue.slots == 0 || self.queue.slots > MAX_QUEUE_SLOTS {
            return Err(invalid(format!(
                "queue slots must be between 1 and {}",
                MAX_QUEUE_SLOTS
            )));
        }

        if self.queue.message_size != MAX_FRAME_LEN {
            return Err(invalid(format!(
                "queue message_size must be {} (frame slot size)",
                MAX_FRAME_LEN
            )));
        }

        if self.sensor.identity.is_empty() {
            return Err(invalid("sensor identity cannot be empty"));
        }

        if self.simulator.interval_ms == 0 || self.simulator.interval_ms > 60000 {
            return Err(invalid("simulator interval_ms must be between 1 and 60000"));
        }

        if self.storage.enabled && self.storage.log_dir.is_empty() {
            return Err(invalid("storage log_dir cannot be empty when enabled"));
        }

        if self.storage.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.storage.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.storage.format != "jsonl" {
            return Err(invalid("storage format must be 'jsonl' (only supported format)"));
        }

        Ok(())
    }
}
