//! # Ingestion Queue
//!
//! Bounded FIFO hand-off between the byte-reception context and the
//! processing thread.
//!
//! - The producer side never blocks: when every slot is taken the newest frame
//!   is dropped and counted.
//! - The consumer side waits until a frame is available, either asynchronously
//!   or by blocking a plain OS thread.
//!
//! Each slot holds one [`RawFrame`] by value, so the per-message size is fixed
//! at [`MAX_FRAME_LEN`] bytes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

use crate::error::{Result, WxIngestError};
use crate::frame::protocol::{RawFrame, MAX_FRAME_LEN};

/// Default number of queue slots
pub const DEFAULT_QUEUE_SLOTS: usize = 10;

/// Upper bound on queue slots
pub const MAX_QUEUE_SLOTS: usize = 256;

/// Outcome of a non-blocking enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Frame took a free slot
    Queued,
    /// No free slot (or no consumer); the frame was discarded
    Dropped,
}

/// Counters shared by both ends of the queue
#[derive(Debug, Default)]
struct QueueCounters {
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

/// Snapshot of queue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Frames accepted by the queue
    pub enqueued: u64,
    /// Frames dropped because the queue was full or closed
    pub dropped: u64,
}

impl QueueCounters {
    fn snapshot(&self) -> QueueStats {
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Create an ingestion queue
///
/// # Arguments
///
/// * `slots` - Number of frames the queue can hold (1 to [`MAX_QUEUE_SLOTS`])
/// * `message_size` - Size of one slot in bytes; must equal [`MAX_FRAME_LEN`]
///
/// # Returns
///
/// * `Result<(FrameSender, FrameReceiver)>` - Producer and consumer handles
///
/// # Errors
///
/// Returns `QueueCreation` if the slot count or message size is unusable.
/// This is a startup failure and callers should abort initialization.
///
/// # Examples
///
/// ```
/// use wx_ingest::ingest::queue::{ingestion_queue, EnqueueOutcome};
/// use wx_ingest::frame::protocol::{RawFrame, MAX_FRAME_LEN};
///
/// let (sender, mut receiver) = ingestion_queue(10, MAX_FRAME_LEN)?;
/// let frame: RawFrame = "UUU$02000.10132.0000.00000.115.2FD7*QQQ".parse()?;
///
/// assert_eq!(sender.try_enqueue(frame), EnqueueOutcome::Queued);
/// assert_eq!(receiver.try_receive(), Some(frame));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn ingestion_queue(slots: usize, message_size: usize) -> Result<(FrameSender, FrameReceiver)> {
    if slots == 0 || slots > MAX_QUEUE_SLOTS {
        return Err(WxIngestError::QueueCreation(format!(
            "slot count {} must be between 1 and {}",
            slots, MAX_QUEUE_SLOTS
        )));
    }

    if message_size != MAX_FRAME_LEN {
        return Err(WxIngestError::QueueCreation(format!(
            "message size {} does not match frame slot size {}",
            message_size, MAX_FRAME_LEN
        )));
    }

    let (tx, rx) = mpsc::channel(slots);
    let counters = Arc::new(QueueCounters::default());

    debug!("Ingestion queue created ({} slots x {} bytes)", slots, message_size);

    Ok((
        FrameSender {
            tx,
            counters: Arc::clone(&counters),
        },
        FrameReceiver { rx, counters },
    ))
}

/// Producer handle
///
/// Safe to call from a context that must not block.
#[derive(Debug)]
pub struct FrameSender {
    tx: mpsc::Sender<RawFrame>,
    counters: Arc<QueueCounters>,
}

impl FrameSender {
    /// Place a frame in the queue without blocking
    ///
    /// A full queue drops `frame`; earlier frames are never displaced.
    pub fn try_enqueue(&self, frame: RawFrame) -> EnqueueOutcome {
        match self.tx.try_send(frame) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                EnqueueOutcome::Queued
            }
            Err(TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                trace!("Ingestion queue full, frame dropped");
                EnqueueOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                trace!("Ingestion queue closed, frame dropped");
                EnqueueOutcome::Dropped
            }
        }
    }

    /// Counters since creation
    pub fn stats(&self) -> QueueStats {
        self.counters.snapshot()
    }
}

/// Consumer handle
#[derive(Debug)]
pub struct FrameReceiver {
    rx: mpsc::Receiver<RawFrame>,
    counters: Arc<QueueCounters>,
}

impl FrameReceiver {
    /// Wait for the next frame
    ///
    /// Returns `None` once the sender is dropped and the queue is drained.
    pub async fn receive(&mut self) -> Option<RawFrame> {
        self.rx.recv().await
    }

    /// Block the current thread until the next frame arrives
    ///
    /// Must be called from a plain OS thread, not from inside the async runtime.
    /// Returns `None` once the sender is dropped and the queue is drained.
    pub fn blocking_receive(&mut self) -> Option<RawFrame> {
        self.rx.blocking_recv()
    }

    /// Take a frame if one is waiting
    pub fn try_receive(&mut self) -> Option<RawFrame> {
        self.rx.try_recv().ok()
    }

    /// Counters since creation
    pub fn stats(&self) -> QueueStats {
        self.counters.snapshot()
    }
}
