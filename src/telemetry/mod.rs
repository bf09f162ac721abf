//! # Telemetry Module
//!
//! Storage collaborator boundary for processed weather readings.
//!
//! This module handles:
//! - The `StorageAdapter` trait that receives one record at a time
//! - The record type handed across that boundary
//! - A JSONL file sink with rotation (`logger`)
//! - A log-only sink for runs without storage

pub mod logger;
pub mod types;

use tracing::info;

use crate::error::Result;
pub use types::StorageRecord;

/// Single insertion entry point of the storage collaborator
///
/// Implementations are shared between the processing thread and the simulator
/// task, hence `Send + Sync`. Callers do not retry or batch.
#[cfg_attr(test, mockall::automock)]
pub trait StorageAdapter: Send + Sync {
    /// Store one record
    fn insert(&self, record: &StorageRecord) -> Result<()>;
}

/// Storage adapter that only logs records
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStorage;

impl StorageAdapter for TracingStorage {
    fn insert(&self, record: &StorageRecord) -> Result<()> {
        info!(
            identity = %record.identity,
            timestamp_us = record.timestamp_us,
            "Reading stored (temperature {:.2}, wind {:.1} @ {:.1})",
            record.temperature,
            record.wind_speed,
            record.wind_direction
        );
        Ok(())
    }
}
