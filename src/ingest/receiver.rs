//! # Byte Receiver
//!
//! Producer side of the ingestion pipeline: every received byte goes through
//! the synchronizer, completed frames are checksum-validated and handed to the
//! ingestion queue without blocking.
//!
//! [`ByteReceiver::on_byte`] is the per-byte entry point and can be driven from
//! any context. [`ByteReceiver::run`] drives it from an async [`ByteSource`],
//! issuing the next read as soon as a chunk is consumed.

use tracing::{debug, info, warn};

use super::queue::{EnqueueOutcome, FrameSender};
use crate::error::{Result, WxIngestError};
use crate::frame::checksum;
use crate::frame::sync::FrameSynchronizer;
use crate::serial::ByteSource;

/// Default size of one serial read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64;

/// Producer-side counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Bytes fed to the synchronizer
    pub bytes: u64,
    /// Valid frames placed in the queue
    pub queued: u64,
    /// Valid frames dropped because the queue was full
    pub dropped: u64,
    /// Partial frames discarded on overflow
    pub overflows: u64,
    /// Frames with too few fields
    pub parse_errors: u64,
    /// Frames whose checksum did not match
    pub checksum_errors: u64,
}

/// Owns the synchronizer and the producer end of the queue
#[derive(Debug)]
pub struct ByteReceiver {
    sync: FrameSynchronizer,
    sender: FrameSender,
    stats: ReceiverStats,
}

impl ByteReceiver {
    /// Create a receiver feeding `sender`
    pub fn new(sync: FrameSynchronizer, sender: FrameSender) -> Self {
        Self {
            sync,
            sender,
            stats: ReceiverStats::default(),
        }
    }

    /// Counters since creation
    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    /// Synchronizer owned by this receiver
    pub fn synchronizer(&self) -> &FrameSynchronizer {
        &self.sync
    }

    /// Handle one received byte
    ///
    /// Never blocks. Per-frame errors are logged and counted here and never
    /// reach the caller.
    pub fn on_byte(&mut self, byte: u8) {
        self.stats.bytes += 1;

        let frame = match self.sync.on_byte(byte) {
            Ok(Some(frame)) => frame,
            Ok(None) => return,
            Err(e) => {
                self.stats.overflows += 1;
                warn!("{}", e);
                return;
            }
        };

        match checksum::verify(&frame) {
            Ok(_) => match self.sender.try_enqueue(frame) {
                EnqueueOutcome::Queued => self.stats.queued += 1,
                EnqueueOutcome::Dropped => {
                    self.stats.dropped += 1;
                    debug!("Queue full, dropped frame {}", frame);
                }
            },
            Err(e @ WxIngestError::ChecksumMismatch { .. }) => {
                self.stats.checksum_errors += 1;
                warn!("Rejected frame {}: {}", frame, e);
            }
            Err(e) => {
                self.stats.parse_errors += 1;
                warn!("Rejected frame {}: {}", frame, e);
            }
        }
    }

    /// Handle a run of received bytes in order
    pub fn on_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.on_byte(byte);
        }
    }

    /// Read from `source` until it is exhausted
    ///
    /// # Arguments
    ///
    /// * `source` - Byte source (serial port or mock)
    /// * `read_buffer_size` - Maximum bytes per read call
    ///
    /// # Returns
    ///
    /// * `Result<ReceiverStats>` - Counters when the source reports end of stream
    ///
    /// # Errors
    ///
    /// Returns `Io` if a read fails; the synchronizer state is kept so the
    /// caller may resume with a reopened source.
    pub async fn run<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
        read_buffer_size: usize,
    ) -> Result<ReceiverStats> {
        let mut buf = vec![0u8; read_buffer_size.max(1)];

        loop {
            let n = source.read_bytes(&mut buf).await?;
            if n == 0 {
                info!(
                    "Byte source closed after {} bytes ({} frames queued)",
                    self.stats.bytes, self.stats.queued
                );
                return Ok(self.stats);
            }
            self.on_bytes(&buf[..n]);
        }
    }
}
