//! The queue seam and its in-process implementation.

use crate::envelope::Envelope;
use crate::error::QueueError;
use crate::job::Job;
use async_trait::async_trait;
use rootcause::prelude::Report;
use tokio::sync::mpsc;
use tracing::debug;

/// Accepts jobs for execution somewhere else.
///
/// A successful return means the queue owns the job. Implementations must
/// not wait for the job to run.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Hands a sealed job to the queue.
    async fn enqueue(&self, job: Envelope<Job>) -> Result<(), Report<QueueError>>;
}

/// Bounded in-process queue backed by a tokio channel.
///
/// Submission uses `try_send`, so a saturated worker surfaces as
/// [`QueueError::Full`] instead of stalling the request that submitted it.
#[derive(Debug, Clone)]
pub struct ChannelJobQueue {
    sender: mpsc::Sender<Envelope<Job>>,
    capacity: usize,
}

/// Worker side of a [`ChannelJobQueue`].
#[derive(Debug)]
pub struct JobReceiver {
    receiver: mpsc::Receiver<Envelope<Job>>,
}

impl ChannelJobQueue {
    /// Creates a queue holding at most `capacity` pending jobs.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender, capacity }, JobReceiver { receiver })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[async_trait]
impl JobQueue for ChannelJobQueue {
    async fn enqueue(&self, job: Envelope<Job>) -> Result<(), Report<QueueError>> {
        let job_id = job.id;
        let job_type = job.payload.job_type();

        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })?;

        debug!(%job_id, job_type, "job queued in-process");
        Ok(())
    }
}

impl JobReceiver {
    /// Waits for the next job; `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<Envelope<Job>> {
        self.receiver.recv().await
    }

    /// Takes a job if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Envelope<Job>> {
        self.receiver.try_recv().ok()
    }
}
