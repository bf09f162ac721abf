//! # Processing Worker
//!
//! Consumer side of the ingestion pipeline: a dedicated OS thread that blocks on
//! the queue, processes one frame to completion, and loops.

use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use super::queue::FrameReceiver;
use crate::error::Result;
use crate::processor::{FrameProcessor, ProcessorStats};

/// Name given to the worker thread
pub const WORKER_THREAD_NAME: &str = "wx-worker";

/// Receive and process frames until the producer side is gone
///
/// Parse errors are already logged by the processor; the loop keeps going.
pub fn run_worker(mut receiver: FrameReceiver, mut processor: FrameProcessor) -> ProcessorStats {
    info!("Processing worker started");

    while let Some(frame) = receiver.blocking_receive() {
        if processor.process(&frame).is_err() {
            debug!("Frame skipped by processor");
        }
    }

    let stats = processor.stats();
    info!(
        "Processing worker stopped ({} processed, {} parse errors, {} storage errors)",
        stats.processed, stats.parse_errors, stats.storage_errors
    );
    stats
}

/// Spawn [`run_worker`] on its own thread
///
/// # Errors
///
/// Returns `Io` if the thread cannot be spawned
pub fn spawn_worker(
    receiver: FrameReceiver,
    processor: FrameProcessor,
) -> Result<JoinHandle<ProcessorStats>> {
    let handle = thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || run_worker(receiver, processor))?;
    Ok(handle)
}
