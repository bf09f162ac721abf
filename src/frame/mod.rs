//! # Weather Frame Module
//!
//! Implementation of the ASCII weather telemetry frame protocol.
//!
//! This module handles:
//! - Frame constants and the fixed-capacity `RawFrame` type
//! - Fixed-width field decoding
//! - 16-bit additive checksum calculation and validation
//! - Byte-level frame synchronization

pub mod protocol;
pub mod fields;
pub mod checksum;
pub mod sync;

pub use checksum::{compute_checksum, validate, verify};
pub use fields::ParsedFields;
pub use protocol::RawFrame;
pub use sync::{FrameSynchronizer, SyncState};
