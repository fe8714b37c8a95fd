//! Error types for the Discord login pipeline.
//!
//! Errors are reported through `rootcause::Report`:
//! - `MembershipError`: the guild membership query failed
//! - `HostError`: a host-platform collaborator failed
//! - `AuthError`: failures surfaced by the authenticator itself
//!
//! Most of these never reach the host. Membership, invite, approval, and
//! job submission failures are logged and absorbed so that a completed
//! OAuth2 handshake always yields a login.

use guildgate_core::UserId;
use std::fmt;

/// Errors from querying the provider for the user's guilds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// The request could not be sent or the connection dropped.
    ConnectionFailed { reason: String },
    /// The provider did not answer within the request timeout.
    Timeout,
    /// The provider answered with a non-success status.
    UnexpectedStatus { status: u16 },
    /// The response body was not a list of guilds.
    MalformedResponse { reason: String },
}

impl fmt::Display for MembershipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { reason } => {
                write!(f, "guild lookup connection failed: {reason}")
            }
            Self::Timeout => write!(f, "guild lookup timed out"),
            Self::UnexpectedStatus { status } => {
                write!(f, "guild lookup returned status {status}")
            }
            Self::MalformedResponse { reason } => {
                write!(f, "guild lookup returned a malformed body: {reason}")
            }
        }
    }
}

impl std::error::Error for MembershipError {}

/// Errors raised by host-platform collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host could not complete the operation.
    Unavailable { operation: String, details: String },
    /// The entity the operation targets does not exist.
    NotFound { entity: String },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { operation, details } => {
                write!(f, "host operation '{operation}' failed: {details}")
            }
            Self::NotFound { entity } => write!(f, "host entity not found: {entity}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Errors from authenticator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Revoke was requested but the account has no link for the provider.
    LinkNotFound { user_id: UserId, provider: String },
    /// Inviting a trusted guild member failed.
    InviteIssuance { reason: String },
    /// A deferred job could not be queued.
    JobEnqueue { reason: String },
    /// A host-platform call failed.
    Host { operation: String, details: String },
    /// The provider profile could not be read.
    InvalidProfile { reason: String },
    /// Provider settings are unusable.
    Configuration { reason: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkNotFound { user_id, provider } => {
                write!(f, "no {provider} link found for user {user_id}")
            }
            Self::InviteIssuance { reason } => {
                write!(f, "invite issuance failed: {reason}")
            }
            Self::JobEnqueue { reason } => {
                write!(f, "job enqueue failed: {reason}")
            }
            Self::Host { operation, details } => {
                write!(f, "host operation '{operation}' failed: {details}")
            }
            Self::InvalidProfile { reason } => {
                write!(f, "invalid provider profile: {reason}")
            }
            Self::Configuration { reason } => {
                write!(f, "provider configuration error: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthError {}
