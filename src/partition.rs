//! Background batch partitioning.
//!
//! Converts a large in-memory dataset into a sequence of fixed-size batches
//! on a dedicated worker thread, so the caller's thread never walks the full
//! array. Batches cross to the caller as channel messages in source order,
//! followed by exactly one terminal [`BatchMessage::Done`]. No mutable state
//! is shared with the caller; everything travels in message payloads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::debug;

use crate::error::{Result, VoterRollError};
use crate::record::VoterRecord;

/// Default number of records per batch.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// A message from the partitioner worker to its consumer.
#[derive(Debug)]
pub enum BatchMessage {
    /// An ordered batch of records ready to be written to the store.
    Store(Vec<VoterRecord>),

    /// Terminal notification: all batches have been emitted.
    Done {
        /// Number of batches emitted.
        batches: usize,
        /// Number of records emitted across all batches.
        records: usize,
    },
}

/// Configuration for batch partitioning.
#[derive(Debug, Clone)]
pub struct PartitionConfig {
    /// Number of records per batch.
    pub batch_size: usize,

    /// Channel capacity; bounds how many batches can be in flight before
    /// the worker blocks.
    pub channel_capacity: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        PartitionConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            channel_capacity: 4,
        }
    }
}

/// Handle to a running partitioner worker.
///
/// The worker stops on its own after the terminal message, when the handle
/// is dropped (its next send fails), or at the next batch boundary after
/// [`PartitionHandle::cancel`]. A cancelled run never emits
/// [`BatchMessage::Done`].
#[derive(Debug)]
pub struct PartitionHandle {
    receiver: Receiver<BatchMessage>,
    cancelled: Arc<AtomicBool>,
}

impl PartitionHandle {
    /// Receive the next message, or `None` once the worker has stopped and
    /// the channel is drained.
    pub fn recv(&self) -> Option<BatchMessage> {
        self.receiver.recv().ok()
    }

    /// Request cancellation. Already-emitted batches remain receivable;
    /// no further batches or terminal message will follow.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Splits a dataset into fixed-size batches off the calling thread.
#[derive(Debug)]
pub struct BatchPartitioner;

impl BatchPartitioner {
    /// Spawn a worker that partitions `records` per `config` and emits the
    /// batches over the returned handle.
    pub fn spawn(records: Vec<VoterRecord>, config: PartitionConfig) -> Result<PartitionHandle> {
        if config.batch_size == 0 {
            return Err(VoterRollError::invalid_argument("batch_size must be non-zero"));
        }

        let (sender, receiver) = bounded(config.channel_capacity.max(1));
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let batch_size = config.batch_size;

        thread::Builder::new()
            .name("voter-partitioner".to_string())
            .spawn(move || run_worker(records, batch_size, sender, flag))
            .map_err(|e| {
                VoterRollError::partition(format!("failed to spawn partitioner worker: {e}"))
            })?;

        Ok(PartitionHandle { receiver, cancelled })
    }
}

/// Worker loop: emit batches in source order, then the terminal message.
fn run_worker(
    records: Vec<VoterRecord>,
    batch_size: usize,
    sender: Sender<BatchMessage>,
    cancelled: Arc<AtomicBool>,
) {
    let mut iter = records.into_iter();
    let mut batches = 0usize;
    let mut emitted = 0usize;

    loop {
        if cancelled.load(Ordering::Acquire) {
            debug!(batches, emitted, "partitioner cancelled");
            return;
        }

        let batch: Vec<VoterRecord> = iter.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }

        batches += 1;
        emitted += batch.len();

        // A closed channel means the consumer is gone; stop quietly.
        if sender.send(BatchMessage::Store(batch)).is_err() {
            return;
        }
    }

    debug!(batches, records = emitted, "partitioning complete");
    let _ = sender.send(BatchMessage::Done {
        batches,
        records: emitted,
    });
}
