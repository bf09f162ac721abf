//! # Frame Synchronizer
//!
//! Byte-at-a-time state machine that finds frame boundaries in a continuous
//! serial stream.
//!
//! ## States
//!
//! - **Searching**: a 4-byte lookback window slides over the stream until it
//!   holds the start marker `UUU$`.
//! - **Collecting**: bytes are appended to the assembly buffer until the last
//!   four are the end marker `*QQQ`, at which point the frame is emitted.
//!
//! The synchronizer is not reentrant. It is driven by exactly one byte-reception
//! context, which owns it; `on_byte` takes `&mut self` so the compiler enforces
//! that.
//!
//! ## Usage
//!
//! ```
//! use wx_ingest::frame::sync::FrameSynchronizer;
//!
//! let mut sync = FrameSynchronizer::new();
//! let mut frames = Vec::new();
//!
//! for &byte in b"noiseUUU$02000.10132.0000.00000.115.2FD7*QQQ" {
//!     if let Ok(Some(frame)) = sync.on_byte(byte) {
//!         frames.push(frame);
//!     }
//! }
//!
//! assert_eq!(frames.len(), 1);
//! ```

use tracing::{debug, trace, warn};

use super::protocol::*;
use crate::error::{Result, WxIngestError};

/// Synchronizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Looking for the start marker
    Searching,
    /// Assembling a frame after the start marker
    Collecting,
}

/// Running counters kept by the synchronizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Complete frames emitted
    pub frames: u64,
    /// Partial frames discarded for lack of an end marker
    pub overflows: u64,
    /// Partial frames discarded because a new start marker arrived
    pub resyncs: u64,
}

/// Frame synchronizer working state
#[derive(Clone)]
pub struct FrameSynchronizer {
    /// Ring of the last four bytes seen while searching
    window: [u8; MARKER_LEN],
    /// Next write position in `window`
    window_pos: usize,
    /// Assembly buffer (last slot reserved for the terminator)
    buffer: [u8; MAX_FRAME_LEN],
    /// Write cursor into `buffer`
    len: usize,
    /// Frame in progress
    collecting: bool,
    /// Restart collection when a start marker shows up mid-frame
    resync_on_start_marker: bool,
    stats: SyncStats,
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSynchronizer")
            .field("state", &self.state())
            .field("len", &self.len)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl FrameSynchronizer {
    /// Create a synchronizer in the `Searching` state
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: [0; MARKER_LEN],
            window_pos: 0,
            buffer: [0; MAX_FRAME_LEN],
            len: 0,
            collecting: false,
            resync_on_start_marker: false,
            stats: SyncStats::default(),
        }
    }

    /// Enable or disable restarting on a start marker seen mid-frame
    ///
    /// Disabled by default: a `UUU$` inside a frame is then just payload.
    #[must_use]
    pub fn with_resync(mut self, enabled: bool) -> Self {
        self.resync_on_start_marker = enabled;
        self
    }

    /// Current state
    pub fn state(&self) -> SyncState {
        if self.collecting {
            SyncState::Collecting
        } else {
            SyncState::Searching
        }
    }

    /// Counters since creation
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Feed one received byte
    ///
    /// # Returns
    ///
    /// * `Ok(Some(frame))` - The byte completed a frame
    /// * `Ok(None)` - More bytes are needed
    ///
    /// # Errors
    ///
    /// Returns `SyncOverflow` when the assembly buffer fills without an end
    /// marker. The partial frame is dropped and the synchronizer is already back
    /// in `Searching`, so the caller only needs to log it.
    pub fn on_byte(&mut self, byte: u8) -> Result<Option<RawFrame>> {
        if self.collecting {
            self.collect(byte)
        } else {
            self.search(byte);
            Ok(None)
        }
    }

    /// Drop any partial frame and return to `Searching`
    pub fn reset(&mut self) {
        self.window = [0; MARKER_LEN];
        self.window_pos = 0;
        self.len = 0;
        self.collecting = false;
    }

    fn search(&mut self, byte: u8) {
        self.window[self.window_pos] = byte;
        self.window_pos = (self.window_pos + 1) % MARKER_LEN;

        if self.window_matches(START_MARKER) {
            trace!("Start marker found");
            self.start_collecting();
        }
    }

    /// Compare the window, oldest byte first, against `marker`
    fn window_matches(&self, marker: &[u8; MARKER_LEN]) -> bool {
        (0..MARKER_LEN).all(|i| self.window[(self.window_pos + i) % MARKER_LEN] == marker[i])
    }

    fn start_collecting(&mut self) {
        self.buffer[..MARKER_LEN].copy_from_slice(START_MARKER);
        self.len = MARKER_LEN;
        self.collecting = true;
    }

    fn collect(&mut self, byte: u8) -> Result<Option<RawFrame>> {
        self.buffer[self.len] = byte;
        self.len += 1;

        let tail = &self.buffer[self.len - MARKER_LEN..self.len];
        let at_end = tail == END_MARKER;
        let at_start = tail == START_MARKER;

        if at_end {
            // Terminate like the firmware buffer does; RawFrame copies only `len` bytes
            self.buffer[self.len] = 0;
            let frame = RawFrame::from_bytes(&self.buffer[..self.len])?;
            self.stats.frames += 1;
            debug!("Frame complete ({} bytes)", frame.len());
            self.reset();
            return Ok(Some(frame));
        }

        if self.resync_on_start_marker && self.len > MARKER_LEN && at_start {
            debug!(
                "Start marker inside frame, discarding {} bytes",
                self.len - MARKER_LEN
            );
            self.stats.resyncs += 1;
            self.start_collecting();
            return Ok(None);
        }

        if self.len >= MAX_FRAME_PAYLOAD {
            warn!("No end marker within {} bytes, resetting", MAX_FRAME_PAYLOAD);
            self.stats.overflows += 1;
            self.reset();
            return Err(WxIngestError::SyncOverflow {
                capacity: MAX_FRAME_LEN,
            });
        }

        Ok(None)
    }
}
