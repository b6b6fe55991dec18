//! Recalculation jobs and the queue they travel through.

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use stats_core::{AttributeId, ClassId};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::api::{Result, RuntimeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// Which characters a batch job recomputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchScope {
    AllCharacters,
    Class(ClassId),
}

/// Recompute one attribute across a set of characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: JobId,
    pub attribute: AttributeId,
    pub reason: String,
    /// Characters per committed chunk; never 0.
    pub batch_size: usize,
    pub scope: BatchScope,
}

/// Fire-and-forget sink for batch jobs.
pub trait RecalculationQueue: Send + Sync {
    fn enqueue(&self, job: BatchJob) -> Result<()>;
}

/// [`RecalculationQueue`] over a bounded tokio channel.
///
/// The worker stops once the queue is closed and every queued job is drained.
pub struct ChannelQueue {
    tx: Mutex<Option<mpsc::Sender<BatchJob>>>,
}

impl ChannelQueue {
    /// Creates the queue and the receiver handed to the worker.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<BatchJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Drops the sender; later `enqueue` calls fail with `QueueClosed`.
    pub fn close(&self) {
        let mut tx = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tx.take();
    }
}

impl RecalculationQueue for ChannelQueue {
    fn enqueue(&self, job: BatchJob) -> Result<()> {
        let tx = self.tx.lock().map_err(|_| RuntimeError::QueueClosed)?;
        let tx = tx.as_ref().ok_or(RuntimeError::QueueClosed)?;
        tx.try_send(job).map_err(|err| match err {
            TrySendError::Full(_) => RuntimeError::QueueFull,
            TrySendError::Closed(_) => RuntimeError::QueueClosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: u64) -> BatchJob {
        BatchJob {
            id: JobId(id),
            attribute: AttributeId(1),
            reason: "test".into(),
            batch_size: 10,
            scope: BatchScope::AllCharacters,
        }
    }

    #[test]
    fn full_and_closed_queues_are_reported() {
        let (queue, mut rx) = ChannelQueue::channel(1);
        queue.enqueue(job(1)).unwrap();
        assert!(matches!(queue.enqueue(job(2)), Err(RuntimeError::QueueFull)));

        assert_eq!(rx.try_recv().unwrap().id, JobId(1));

        queue.close();
        assert!(matches!(queue.enqueue(job(3)), Err(RuntimeError::QueueClosed)));
        assert!(rx.try_recv().is_err());
    }
}
