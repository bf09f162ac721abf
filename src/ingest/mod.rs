//! # Ingestion Module
//!
//! Hand-off from the byte-reception context to the processing thread.
//!
//! This module handles:
//! - The bounded, non-blocking-producer frame queue
//! - The byte receiver feeding the synchronizer and the queue
//! - The worker thread consuming the queue

pub mod queue;
pub mod receiver;
pub mod worker;

pub use queue::{ingestion_queue, EnqueueOutcome, FrameReceiver, FrameSender};
pub use receiver::ByteReceiver;
pub use worker::spawn_worker;
