//! Discord provider configuration.
//!
//! The authenticator recognizes exactly four options. They are loaded once
//! (from the environment or any `config` source) and injected into
//! [`DiscordAuthenticator`](crate::DiscordAuthenticator) at construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable prefix for [`DiscordConfig::from_env`].
const ENV_PREFIX: &str = "DISCORD";

/// Configuration for Discord login.
///
/// `enabled` and `trusted_group_id` may be omitted; they default to
/// disabled and to no trusted guild respectively.
#[derive(Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Gates the whole provider.
    #[serde(default)]
    enabled: bool,
    /// OAuth2 application client ID.
    client_id: String,
    /// OAuth2 application client secret.
    client_secret: String,
    /// Guild whose members are auto-approved. Empty disables the check.
    #[serde(default)]
    trusted_group_id: String,
}

impl DiscordConfig {
    /// Creates an enabled configuration without a trusted guild.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            enabled: true,
            client_id,
            client_secret,
            trusted_group_id: String::new(),
        }
    }

    #[must_use]
    pub fn builder(client_id: String, client_secret: String) -> DiscordConfigBuilder {
        DiscordConfigBuilder::new(client_id, client_secret)
    }

    /// Loads configuration from `DISCORD_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from an arbitrary `config` source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or is missing
    /// `client_id` / `client_secret`.
    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the trusted guild as an explicit optional value.
    #[must_use]
    pub fn trusted_group(&self) -> TrustedGroupId {
        TrustedGroupId::new(&self.trusted_group_id)
    }

    /// Returns true if a trusted guild is configured.
    #[must_use]
    pub fn is_trust_configured(&self) -> bool {
        self.trusted_group().is_configured()
    }
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("enabled", &self.enabled)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("trusted_group_id", &self.trusted_group_id)
            .finish()
    }
}

/// Builder for [`DiscordConfig`].
#[derive(Debug)]
pub struct DiscordConfigBuilder {
    enabled: bool,
    client_id: String,
    client_secret: String,
    trusted_group_id: String,
}

impl DiscordConfigBuilder {
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            enabled: true,
            client_id,
            client_secret,
            trusted_group_id: String::new(),
        }
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the guild whose members are auto-approved.
    #[must_use]
    pub fn trusted_group_id(mut self, guild_id: impl Into<String>) -> Self {
        self.trusted_group_id = guild_id.into();
        self
    }

    #[must_use]
    pub fn build(self) -> DiscordConfig {
        DiscordConfig {
            enabled: self.enabled,
            client_id: self.client_id,
            client_secret: self.client_secret,
            trusted_group_id: self.trusted_group_id,
        }
    }
}

/// The operator-configured trusted guild, or its absence.
///
/// Blank configuration values collapse to "unset" here so the rest of the
/// pipeline never compares against an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrustedGroupId(Option<String>);

impl TrustedGroupId {
    /// Wraps a raw setting; blank means unset. Any other value is kept
    /// as configured and compared exactly.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(raw.to_string()))
        }
    }

    #[must_use]
    pub fn unset() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Returns true if `guild_id` is the trusted guild.
    ///
    /// Always false when no guild is configured.
    #[must_use]
    pub fn matches(&self, guild_id: &str) -> bool {
        self.0.as_deref() == Some(guild_id)
    }
}
