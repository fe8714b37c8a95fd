//! Deferred work hand-off for the guildgate login pipeline.
//!
//! The login flow never runs slow side effects inline. It wraps them in a
//! [`Job`], seals the job in a versioned [`Envelope`], and submits it to a
//! [`JobQueue`]. Submission is the end of the caller's responsibility:
//! execution, retries, and failure handling belong to whoever drains the
//! queue.
//!
//! Two queues are provided:
//! - [`ChannelJobQueue`]: bounded in-process channel, for hosts that run
//!   their own worker task
//! - [`NatsJobQueue`]: JetStream stream with work-queue retention

pub mod envelope;
pub mod error;
pub mod job;
pub mod nats;
pub mod queue;

pub use envelope::{CURRENT_VERSION, Envelope};
pub use error::QueueError;
pub use job::{AvatarImportJob, Job};
pub use nats::{NatsJobQueue, NatsQueueConfig};
pub use queue::{ChannelJobQueue, JobQueue, JobReceiver};
