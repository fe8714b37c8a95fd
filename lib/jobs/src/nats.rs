//! JetStream-backed job queue.
//!
//! Jobs are published to `auth.jobs.<job_type>` on a stream with
//! work-queue retention, so each job is delivered to exactly one worker and
//! removed once acknowledged. A publish is considered successful when the
//! server acknowledges it; the job's execution is never awaited.

use crate::envelope::Envelope;
use crate::error::QueueError;
use crate::job::Job;
use crate::queue::JobQueue;
use async_nats::jetstream;
use async_trait::async_trait;
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Subject prefix for queued jobs.
const JOBS_SUBJECT_PREFIX: &str = "auth.jobs";

/// Default stream name.
const JOBS_STREAM_NAME: &str = "AUTH_JOBS";

/// Connection settings for [`NatsJobQueue`].
#[derive(Debug, Clone)]
pub struct NatsQueueConfig {
    /// NATS server URL.
    pub url: String,
    /// Stream name (defaults to `AUTH_JOBS`).
    pub stream_name: Option<String>,
}

impl NatsQueueConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream_name: None,
        }
    }

    fn stream(&self) -> &str {
        self.stream_name.as_deref().unwrap_or(JOBS_STREAM_NAME)
    }
}

/// Publishes jobs to a NATS JetStream work queue.
pub struct NatsJobQueue {
    jetstream: Arc<jetstream::Context>,
}

impl NatsJobQueue {
    /// Connects to NATS and makes sure the job stream exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or stream setup fails.
    pub async fn connect(config: NatsQueueConfig) -> Result<Self, Report<QueueError>> {
        let client = async_nats::connect(&config.url)
            .await
            .map_err(|e| QueueError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        let jetstream = jetstream::new(client);

        let stream_config = jetstream::stream::Config {
            name: config.stream().to_string(),
            subjects: vec![format!("{JOBS_SUBJECT_PREFIX}.>")],
            storage: jetstream::stream::StorageType::File,
            retention: jetstream::stream::RetentionPolicy::WorkQueue,
            ..Default::default()
        };

        jetstream
            .get_or_create_stream(stream_config)
            .await
            .map_err(|e| QueueError::ConnectionFailed {
                reason: format!("failed to create job stream: {e}"),
            })?;

        Ok(Self {
            jetstream: Arc::new(jetstream),
        })
    }

    fn subject_for(job: &Job) -> String {
        format!("{JOBS_SUBJECT_PREFIX}.{}", job.job_type())
    }
}

#[async_trait]
impl JobQueue for NatsJobQueue {
    #[instrument(skip(self, job), fields(job_id = %job.id, job_type = job.payload.job_type()))]
    async fn enqueue(&self, job: Envelope<Job>) -> Result<(), Report<QueueError>> {
        let subject = Self::subject_for(&job.payload);
        let bytes = job.to_json_bytes().map_err(|e| QueueError::Serialization {
            reason: e.to_string(),
        })?;

        self.jetstream
            .publish(subject, bytes.into())
            .await
            .map_err(|e| QueueError::PublishFailed {
                reason: e.to_string(),
            })?
            .await
            .map_err(|e| QueueError::PublishFailed {
                reason: e.to_string(),
            })?;

        debug!("job published");
        Ok(())
    }
}
