//! Trusted-guild membership verification.
//!
//! The verifier asks Discord which guilds the logged-in user belongs to and
//! checks for the configured trusted guild. It fails closed: any error from
//! the provider means "not trusted" for this attempt, and the login carries
//! on without auto-approval.

use crate::config::TrustedGroupId;
use crate::error::MembershipError;
use async_trait::async_trait;
use oauth2::AccessToken;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Discord REST API base URL.
pub const DISCORD_API_BASE_URL: &str = "https://discord.com/api";

/// Upper bound on a single guild lookup.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the current user's guild list, relative to the API base.
const CURRENT_USER_GUILDS_PATH: &str = "/users/@me/guilds";

/// A guild entry from the provider's guild list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Source of the current user's guilds.
#[async_trait]
pub trait GuildSource: Send + Sync {
    /// Lists the guilds of the user the token was issued to.
    async fn current_user_guilds(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<Guild>, Report<MembershipError>>;
}

/// Guild lookup against the Discord REST API.
///
/// One request per call, bounded by the client timeout, no retries.
#[derive(Debug, Clone)]
pub struct DiscordGuildClient {
    http: reqwest::Client,
    base_url: String,
}

impl DiscordGuildClient {
    /// Creates a client for the public Discord API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, Report<MembershipError>> {
        Self::with_settings(DISCORD_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a client with a custom API base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_settings(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Report<MembershipError>> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| MembershipError::ConnectionFailed {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn guilds_url(&self) -> String {
        format!("{}{CURRENT_USER_GUILDS_PATH}", self.base_url)
    }
}

fn request_error(e: &reqwest::Error) -> MembershipError {
    if e.is_timeout() {
        MembershipError::Timeout
    } else {
        MembershipError::ConnectionFailed {
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl GuildSource for DiscordGuildClient {
    async fn current_user_guilds(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<Guild>, Report<MembershipError>> {
        let response = self
            .http
            .get(self.guilds_url())
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MembershipError::UnexpectedStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(|e| request_error(&e))?;
        let entries: Vec<serde_json::Value> =
            serde_json::from_slice(&body).map_err(|e| MembershipError::MalformedResponse {
                reason: e.to_string(),
            })?;

        let total = entries.len();
        let guilds: Vec<Guild> = entries.into_iter().filter_map(guild_entry).collect();
        if guilds.len() < total {
            debug!(skipped = total - guilds.len(), "ignored guild entries without a string id");
        }

        debug!(guild_count = guilds.len(), "fetched guild list");
        Ok(guilds)
    }
}

/// Reads one guild-list entry; entries without a string `id` yield `None`.
fn guild_entry(entry: serde_json::Value) -> Option<Guild> {
    let id = entry.get("id")?.as_str()?.to_string();
    let name = entry.get("name").and_then(|n| n.as_str()).map(str::to_string);
    Some(Guild { id, name })
}

/// Decides whether a login belongs to the trusted guild.
#[derive(Clone)]
pub struct MembershipVerifier {
    source: Arc<dyn GuildSource>,
}

impl MembershipVerifier {
    #[must_use]
    pub fn new(source: Arc<dyn GuildSource>) -> Self {
        Self { source }
    }

    /// Checks membership, surfacing provider failures.
    ///
    /// Returns `Ok(false)` without contacting the provider when no trusted
    /// guild is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the guild lookup fails.
    pub async fn check(
        &self,
        token: &AccessToken,
        trusted: &TrustedGroupId,
    ) -> Result<bool, Report<MembershipError>> {
        if !trusted.is_configured() {
            return Ok(false);
        }

        let guilds = self.source.current_user_guilds(token).await?;
        Ok(guilds.iter().any(|guild| trusted.matches(&guild.id)))
    }

    /// Returns true iff the token's owner is in the trusted guild.
    ///
    /// Lookup failures are logged and read as "not trusted".
    #[instrument(skip(self, token), fields(trusted_group = trusted.as_deref()))]
    pub async fn is_trusted_member(&self, token: &AccessToken, trusted: &TrustedGroupId) -> bool {
        match self.check(token, trusted).await {
            Ok(member) => {
                debug!(member, "membership checked");
                member
            }
            Err(e) => {
                warn!(error = %e, "guild membership lookup failed; treating login as untrusted");
                false
            }
        }
    }
}
