//! Collaborator traits implemented by the host platform.
//!
//! The authenticator owns no storage. Account lookup, approval, invites,
//! link persistence, and the generic OAuth2 link-or-create step are all
//! calls into the host through these traits.

use crate::account::{Actor, ExternalIdentityLink, LinkOutcome, LocalAccount};
use crate::error::HostError;
use crate::identity::IdentityClaims;
use async_trait::async_trait;
use guildgate_core::{IdentityLinkId, UserId};
use rootcause::prelude::Report;
use std::sync::Arc;

/// Read and approve local accounts.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Finds the account registered with `email`.
    async fn find_by_email(&self, email: &str) -> Result<Option<LocalAccount>, Report<HostError>>;

    /// Approves an account on behalf of `actor`.
    ///
    /// `require_reason` asks the host to demand a moderator note.
    async fn approve(
        &self,
        user_id: UserId,
        actor: Actor,
        require_reason: bool,
    ) -> Result<(), Report<HostError>>;

    /// Returns true if the account has a manually uploaded avatar.
    async fn has_custom_avatar(&self, user_id: UserId) -> Result<bool, Report<HostError>>;
}

/// Issue invitations that grant account-creation rights.
#[async_trait]
pub trait InviteIssuer: Send + Sync {
    async fn issue_invite(&self, email: &str, issuer: Actor) -> Result<(), Report<HostError>>;
}

/// Persisted external identity links.
#[async_trait]
pub trait IdentityLinkStore: Send + Sync {
    /// Finds the link for (user, provider).
    async fn find(
        &self,
        user_id: UserId,
        provider: &str,
    ) -> Result<Option<ExternalIdentityLink>, Report<HostError>>;

    async fn destroy(&self, link_id: IdentityLinkId) -> Result<(), Report<HostError>>;
}

/// The host's generic OAuth2 link-or-create step.
///
/// Matches the remote identity to an existing account (by link, then by
/// email) and records the link. When no account matches, the outcome has
/// no user and the host goes on to create one.
#[async_trait]
pub trait OAuth2Linker: Send + Sync {
    async fn link(
        &self,
        provider: &str,
        claims: &IdentityClaims,
    ) -> Result<LinkOutcome, Report<HostError>>;

    /// Records the link for an account created from this login.
    async fn link_new_account(
        &self,
        provider: &str,
        account: &LocalAccount,
        claims: &IdentityClaims,
    ) -> Result<ExternalIdentityLink, Report<HostError>>;
}

/// The set of host collaborators the authenticator is built from.
#[derive(Clone)]
pub struct HostServices {
    pub accounts: Arc<dyn AccountDirectory>,
    pub invites: Arc<dyn InviteIssuer>,
    pub links: Arc<dyn IdentityLinkStore>,
    pub oauth2: Arc<dyn OAuth2Linker>,
}
