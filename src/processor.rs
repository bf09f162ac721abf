//! # Frame Processor
//!
//! Turns a validated frame into engineering units and forwards it to storage.
//!
//! ## Conversions
//!
//! | Field | Raw unit | Engineering unit |
//! |-------|----------|------------------|
//! | Temperature | ADC counts | °C = ADC × 0.01 |
//! | Pressure | ADC counts | hPa = ADC × 0.1 |
//! | Wind direction | tenths of a degree | degrees = tenths × 0.1 |
//! | Wind speed | raw | raw |
//! | Voltage | mV | mV |
//!
//! Storage is fire-and-forget: an adapter error is logged and counted, never
//! retried and never returned to the caller.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::error::Result;
use crate::frame::fields::{parse_fields, ParsedFields, REQUIRED_DATA_FIELDS};
use crate::frame::protocol::RawFrame;
use crate::telemetry::{StorageAdapter, StorageRecord};

/// Temperature scale (°C per ADC count)
pub const TEMPERATURE_SCALE: f64 = 0.01;

/// Pressure scale (hPa per ADC count)
pub const PRESSURE_SCALE: f64 = 0.1;

/// Wind direction scale (degrees per tenth)
pub const WIND_DIRECTION_SCALE: f64 = 0.1;

/// Reading converted to engineering units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineeringReading {
    /// Temperature in °C
    pub temperature_c: f64,

    /// Barometric pressure in hPa
    pub pressure_hpa: f64,

    /// Wind direction in degrees
    pub wind_direction_deg: f64,

    /// Wind speed in sensor units
    pub wind_speed: f64,

    /// Supply voltage in mV
    pub voltage_mv: f64,
}

impl From<&ParsedFields> for EngineeringReading {
    fn from(fields: &ParsedFields) -> Self {
        Self {
            temperature_c: f64::from(fields.temperature_adc) * TEMPERATURE_SCALE,
            pressure_hpa: f64::from(fields.barometric_adc) * PRESSURE_SCALE,
            wind_direction_deg: f64::from(fields.wind_direction_tenths) * WIND_DIRECTION_SCALE,
            wind_speed: f64::from(fields.wind_speed),
            voltage_mv: f64::from(fields.voltage_mv),
        }
    }
}

/// Processing counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    /// Frames converted and handed to storage
    pub processed: u64,
    /// Frames rejected for missing fields
    pub parse_errors: u64,
    /// Storage inserts that failed
    pub storage_errors: u64,
}

/// Converts frames and forwards them to a storage adapter
pub struct FrameProcessor {
    storage: Arc<dyn StorageAdapter>,
    identity: String,
    epoch: Instant,
    stats: ProcessorStats,
}

impl std::fmt::Debug for FrameProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameProcessor")
            .field("identity", &self.identity)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl FrameProcessor {
    /// Create a processor tagging readings with `identity`
    ///
    /// Timestamps count microseconds from this call.
    pub fn new(storage: Arc<dyn StorageAdapter>, identity: impl Into<String>) -> Self {
        Self::with_epoch(storage, identity, Instant::now())
    }

    /// Create a processor with an explicit timestamp origin
    ///
    /// Processors sharing one epoch produce comparable timestamps.
    pub fn with_epoch(
        storage: Arc<dyn StorageAdapter>,
        identity: impl Into<String>,
        epoch: Instant,
    ) -> Self {
        Self {
            storage,
            identity: identity.into(),
            epoch,
            stats: ProcessorStats::default(),
        }
    }

    /// Counters since creation
    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }

    /// Convert a frame and forward it to storage
    ///
    /// # Returns
    ///
    /// * `Result<EngineeringReading>` - The converted reading
    ///
    /// # Errors
    ///
    /// Returns `FieldsMissing` if fewer than five data fields decode; nothing is
    /// forwarded in that case. Storage failures are not errors here.
    pub fn process(&mut self, frame: &RawFrame) -> Result<EngineeringReading> {
        let fields = match parse_fields(frame.as_bytes(), REQUIRED_DATA_FIELDS) {
            Ok(fields) => fields,
            Err(e) => {
                self.stats.parse_errors += 1;
                warn!("Dropping frame {}: {}", frame, e);
                return Err(e);
            }
        };

        let reading = EngineeringReading::from(&fields);
        let timestamp_us = u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX);

        info!(
            "{} T={:.2}C P={:.1}hPa Dir={:.1}deg Speed={:.0} V={:.0}mV",
            self.identity,
            reading.temperature_c,
            reading.pressure_hpa,
            reading.wind_direction_deg,
            reading.wind_speed,
            reading.voltage_mv
        );

        let record = StorageRecord {
            identity: self.identity.clone(),
            timestamp_us,
            temperature: reading.temperature_c,
            wind_speed: reading.wind_speed,
            wind_direction: reading.wind_direction_deg,
        };

        if let Err(e) = self.storage.insert(&record) {
            self.stats.storage_errors += 1;
            error!("Storage insert failed: {}", e);
        }

        self.stats.processed += 1;
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WxIngestError;
    use crate::telemetry::MockStorageAdapter;

    fn frame(text: &str) -> RawFrame {
        text.parse().unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_engineering_conversion() {
        let fields = ParsedFields {
            temperature_adc: 2000,
            barometric_adc: 10132,
            wind_direction_tenths: 1234,
            wind_speed: 40,
            voltage_mv: 115,
            reported_checksum: None,
        };

        let reading = EngineeringReading::from(&fields);
        assert!(approx(reading.temperature_c, 20.0));
        assert!(approx(reading.pressure_hpa, 1013.2));
        assert!(approx(reading.wind_direction_deg, 123.4));
        assert!(approx(reading.wind_speed, 40.0));
        assert!(approx(reading.voltage_mv, 115.0));
    }

    #[test]
    fn test_process_forwards_record() {
        let mut storage = MockStorageAdapter::new();
        storage
            .expect_insert()
            .withf(|record| {
                record.identity == "WX-01"
                    && (record.temperature - 20.0).abs() < 1e-9
                    && (record.wind_direction - 123.4).abs() < 1e-9
                    && (record.wind_speed - 40.0).abs() < 1e-9
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut processor = FrameProcessor::new(Arc::new(storage), "WX-01");
        let reading = processor
            .process(&frame("UUU$02000.10132.1234.00040.115.34D1*QQQ"))
            .unwrap();

        assert!(approx(reading.pressure_hpa, 1013.2));
        assert_eq!(processor.stats().processed, 1);
    }

    #[test]
    fn test_process_tolerates_missing_checksum_field() {
        let mut storage = MockStorageAdapter::new();
        storage.expect_insert().times(1).returning(|_| Ok(()));

        let mut processor = FrameProcessor::new(Arc::new(storage), "WX-01");
        assert!(processor
            .process(&frame("UUU$02000.10132.0000.00000.115*QQQ"))
            .is_ok());
    }

    #[test]
    fn test_process_parse_error_skips_storage() {
        let mut storage = MockStorageAdapter::new();
        storage.expect_insert().times(0);

        let mut processor = FrameProcessor::new(Arc::new(storage), "WX-01");
        let result = processor.process(&frame("UUU$02000.10132*QQQ"));

        assert!(matches!(
            result,
            Err(WxIngestError::FieldsMissing { parsed: 2, required: 5 })
        ));
        assert_eq!(processor.stats().parse_errors, 1);
        assert_eq!(processor.stats().processed, 0);
    }

    #[test]
    fn test_storage_failure_not_propagated() {
        let mut storage = MockStorageAdapter::new();
        storage
            .expect_insert()
            .times(1)
            .returning(|_| Err(WxIngestError::Storage("disk full".to_string())));

        let mut processor = FrameProcessor::new(Arc::new(storage), "WX-01");
        let result = processor.process(&frame("UUU$02000.10132.0000.00000.115.2FD7*QQQ"));

        assert!(result.is_ok());
        assert_eq!(processor.stats().storage_errors, 1);
        assert_eq!(processor.stats().processed, 1);
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let stamps = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = Arc::clone(&stamps);

        let mut storage = MockStorageAdapter::new();
        storage.expect_insert().times(3).returning(move |record| {
            seen.lock().unwrap().push(record.timestamp_us);
            Ok(())
        });

        let mut processor = FrameProcessor::new(Arc::new(storage), "WX-01");
        for _ in 0..3 {
            processor
                .process(&frame("UUU$02000.10132.0000.00000.115.2FD7*QQQ"))
                .unwrap();
        }

        let stamps = stamps.lock().unwrap();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }
}
