//! Account-side records the pipeline reads and produces.
//!
//! The host platform owns accounts and identity links; these types are the
//! views of them that cross the plugin boundary, plus the per-attempt
//! [`AuthResult`] carried from authentication to account creation.

use crate::identity::IdentityClaims;
use chrono::{DateTime, Utc};
use guildgate_core::{IdentityLinkId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who performs an account state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Actor {
    /// The platform itself, acting without moderator review.
    System,
    /// A specific account.
    User(UserId),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User(id) => write!(f, "{id}"),
        }
    }
}

/// A local account on the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    id: UserId,
    email: Option<String>,
    /// Whether a moderator (or the system) has approved the account.
    approved: bool,
    created_at: DateTime<Utc>,
}

impl LocalAccount {
    /// Creates a fresh, unapproved account.
    #[must_use]
    pub fn new(email: Option<String>) -> Self {
        Self {
            id: UserId::new(),
            email,
            approved: false,
            created_at: Utc::now(),
        }
    }

    /// Reconstitutes an account from host storage.
    #[must_use]
    pub fn with_all_fields(
        id: UserId,
        email: Option<String>,
        approved: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            approved,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.approved
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the account approved.
    pub fn approve(&mut self) {
        self.approved = true;
    }
}

/// Durable binding of a local account to a remote identity.
///
/// The host's storage guarantees at most one link per (user, provider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentityLink {
    pub id: IdentityLinkId,
    pub user_id: UserId,
    pub provider: String,
    /// The provider's id for the remote user.
    pub external_uid: String,
    pub created_at: DateTime<Utc>,
}

impl ExternalIdentityLink {
    #[must_use]
    pub fn new(
        user_id: UserId,
        provider: impl Into<String>,
        external_uid: impl Into<String>,
    ) -> Self {
        Self {
            id: IdentityLinkId::new(),
            user_id,
            provider: provider.into(),
            external_uid: external_uid.into(),
            created_at: Utc::now(),
        }
    }
}

/// What the generic OAuth2 link step produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOutcome {
    /// The matched local account; `None` when the host will create one.
    pub user: Option<LocalAccount>,
    /// The link that now binds `user` to the remote identity, if any.
    pub link: Option<ExternalIdentityLink>,
}

/// Data carried from authentication to account creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraData {
    pub avatar_url: Option<String>,
    /// Approve the account at creation time without review.
    pub auto_approve: bool,
}

/// Result of the post-authentication step for one login attempt.
///
/// Created fresh per attempt and consumed by
/// [`DiscordAuthenticator::after_account_creation`](crate::DiscordAuthenticator::after_account_creation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub claims: IdentityClaims,
    pub user: Option<LocalAccount>,
    pub link: Option<ExternalIdentityLink>,
    pub extra_data: ExtraData,
}

impl AuthResult {
    /// Builds the result from the base link outcome.
    #[must_use]
    pub fn from_outcome(claims: IdentityClaims, outcome: LinkOutcome) -> Self {
        Self {
            claims,
            user: outcome.user,
            link: outcome.link,
            extra_data: ExtraData::default(),
        }
    }

    /// Returns true if the host must create an account for this login.
    #[must_use]
    pub fn needs_account(&self) -> bool {
        self.user.is_none()
    }
}
