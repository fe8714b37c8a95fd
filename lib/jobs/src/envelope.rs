//! Versioned wrapper for queued jobs.
//!
//! Jobs outlive the process that submitted them, so every payload that
//! crosses the queue carries a format version, its own id, and the time it
//! was handed off. Consumers check the version before trusting the payload.

use chrono::{DateTime, Utc};
use guildgate_core::JobId;
use serde::{Deserialize, Serialize};

/// Envelope format version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// A job payload sealed for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Envelope format version.
    pub version: u32,
    /// Unique id for this submission.
    pub id: JobId,
    /// When the job was handed to the queue.
    pub enqueued_at: DateTime<Utc>,
    /// The wrapped payload.
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Seals a payload with the current version and a fresh id.
    #[must_use]
    pub fn new(payload: T) -> Self {
        Self {
            version: CURRENT_VERSION,
            id: JobId::new(),
            enqueued_at: Utc::now(),
            payload,
        }
    }

    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Returns true if a consumer built from this crate can read it as-is.
    #[must_use]
    pub fn is_current_version(&self) -> bool {
        self.version == CURRENT_VERSION
    }
}

impl<T: Serialize> Envelope<T> {
    /// Encodes the envelope as JSON for the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl<T: for<'de> Deserialize<'de>> Envelope<T> {
    /// Decodes an envelope received from the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid envelope.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
