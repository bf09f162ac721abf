//! # Weather Sensor Ingestion Library
//!
//! Receive ASCII weather frames from a serial sensor, validate them and turn
//! them into engineering-unit readings.
//!
//! This library provides the frame codec and synchronizer, the bounded queue
//! between byte reception and processing, the frame processor, and a frame
//! simulator for running without hardware.

pub mod config;
pub mod error;
pub mod frame;
pub mod ingest;
pub mod processor;
pub mod serial;
pub mod simulator;
pub mod telemetry;
