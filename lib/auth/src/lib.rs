//! Discord login for guildgate with trusted-guild auto-approval.
//!
//! After the OAuth2 handshake, the authenticator checks whether the user
//! belongs to the operator's trusted Discord guild. Members are approved
//! without moderator review, and members with no account yet are invited so
//! closed-signup communities can admit them. Everyone else logs in normally.
//!
//! Pipeline, in order:
//! - [`MembershipVerifier`]: guild lookup, failing closed
//! - [`map_claims`]: provider profile to identity claims
//! - [`TrustDecisionEngine`]: approval and invite decision
//! - [`AccountLinker`]: invite, host link step, revoke
//! - [`SideEffectDispatcher`]: approval and deferred avatar import
//!
//! [`DiscordAuthenticator`] ties these together behind the host's provider
//! contract. Host storage is reached only through the traits in [`host`].

pub mod account;
pub mod authenticator;
pub mod config;
pub mod decision;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod identity;
pub mod linker;
pub mod membership;
pub mod registration;

#[cfg(test)]
mod testing;

pub use account::{Actor, AuthResult, ExternalIdentityLink, ExtraData, LinkOutcome, LocalAccount};
pub use authenticator::DiscordAuthenticator;
pub use config::{DiscordConfig, DiscordConfigBuilder, TrustedGroupId};
pub use decision::{TrustDecision, TrustDecisionEngine};
pub use dispatcher::SideEffectDispatcher;
pub use error::{AuthError, HostError, MembershipError};
pub use host::{AccountDirectory, HostServices, IdentityLinkStore, InviteIssuer, OAuth2Linker};
pub use identity::{DiscordProfile, IdentityClaims, map_claims};
pub use linker::{AccountLinker, PROVIDER_NAME};
pub use membership::{DiscordGuildClient, Guild, GuildSource, MembershipVerifier};
pub use registration::{ProviderOptions, ProviderRegistration, ProviderUi};
