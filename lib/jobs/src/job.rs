//! Job payloads understood by the background workers.

use guildgate_core::UserId;
use serde::{Deserialize, Serialize};

/// Downloads a remote image and installs it as an account's avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarImportJob {
    /// Remote image to fetch.
    pub url: String,
    /// Account that receives the avatar.
    pub user_id: UserId,
    /// Whether the imported image may replace a gravatar.
    pub override_gravatar: bool,
}

impl AvatarImportJob {
    /// Builds an import that leaves any gravatar in place.
    #[must_use]
    pub fn new(url: impl Into<String>, user_id: UserId) -> Self {
        Self {
            url: url.into(),
            user_id,
            override_gravatar: false,
        }
    }
}

/// A unit of deferred work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
    /// Import an avatar from a remote URL.
    DownloadAvatarFromUrl(AvatarImportJob),
}

impl Job {
    /// The job type name workers dispatch on.
    #[must_use]
    pub fn job_type(&self) -> &'static str {
        match self {
            Self::DownloadAvatarFromUrl(_) => "download_avatar_from_url",
        }
    }
}

impl From<AvatarImportJob> for Job {
    fn from(job: AvatarImportJob) -> Self {
        Self::DownloadAvatarFromUrl(job)
    }
}
