//! # Error Types
//!
//! Custom error types for WX Ingest using `thiserror`.

use thiserror::Error;

/// Main error type for WX Ingest
#[derive(Debug, Error)]
pub enum WxIngestError {
    /// Assembly buffer filled up before an end marker arrived
    #[error("Sync overflow: no end marker within {capacity} bytes, frame discarded")]
    SyncOverflow { capacity: usize },

    /// Fewer numeric fields decoded than the operation requires
    #[error("Frame parse error: {parsed} of {required} fields decoded")]
    FieldsMissing { parsed: usize, required: usize },

    /// All fields decoded but the reported checksum disagrees
    #[error("Checksum mismatch: computed 0x{computed:04X}, reported 0x{reported:04X}")]
    ChecksumMismatch { computed: u16, reported: u16 },

    /// Frame does not fit into a queue slot
    #[error("Frame too long: {len} bytes (max {max})")]
    FrameTooLong { len: usize, max: usize },

    /// Hand-off queue could not be created
    #[error("Queue creation failed: {0}")]
    QueueCreation(String),

    /// Storage collaborator rejected a record
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for WX Ingest
pub type Result<T> = std::result::Result<T, WxIngestError>;
