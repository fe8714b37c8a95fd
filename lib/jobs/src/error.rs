//! Error types for job submission.
//!
//! Submission failures are reported as `rootcause::Report<QueueError>`.
//! Callers on the login path log them and move on; a job that could not be
//! queued is never allowed to fail the login that produced it.

use std::fmt;

/// Errors from handing a job to a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is at capacity.
    Full { capacity: usize },
    /// The consuming side has gone away.
    Closed,
    /// The job could not be encoded.
    Serialization { reason: String },
    /// Could not reach the message broker.
    ConnectionFailed { reason: String },
    /// The broker rejected or did not acknowledge the job.
    PublishFailed { reason: String },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => {
                write!(f, "job queue is full (capacity {capacity})")
            }
            Self::Closed => write!(f, "job queue is closed"),
            Self::Serialization { reason } => {
                write!(f, "failed to encode job: {reason}")
            }
            Self::ConnectionFailed { reason } => {
                write!(f, "job broker connection failed: {reason}")
            }
            Self::PublishFailed { reason } => {
                write!(f, "job publish failed: {reason}")
            }
        }
    }
}

impl std::error::Error for QueueError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_reports_capacity() {
        let err = QueueError::Full { capacity: 16 };
        assert!(err.to_string().contains("16"));
    }

    #[test]
    fn publish_failure_keeps_reason() {
        let err = QueueError::PublishFailed {
            reason: "no responders".to_string(),
        };
        assert!(err.to_string().contains("no responders"));
    }
}
