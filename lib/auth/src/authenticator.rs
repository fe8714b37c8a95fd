//! The Discord login provider as the host platform sees it.

use crate::account::{AuthResult, LocalAccount};
use crate::config::DiscordConfig;
use crate::dispatcher::SideEffectDispatcher;
use crate::error::AuthError;
use crate::host::HostServices;
use crate::identity::DiscordProfile;
use crate::linker::{AccountLinker, PROVIDER_NAME};
use crate::membership::{DiscordGuildClient, GuildSource, MembershipVerifier};
use crate::registration::ProviderRegistration;
use guildgate_jobs::JobQueue;
use oauth2::AccessToken;
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Discord identity provider with trusted-guild auto-approval.
///
/// The host calls [`after_authenticate`](Self::after_authenticate) once the
/// OAuth2 handshake completes, and
/// [`after_account_creation`](Self::after_account_creation) if that login
/// produced a new account.
#[derive(Clone)]
pub struct DiscordAuthenticator {
    config: DiscordConfig,
    linker: AccountLinker,
}

impl DiscordAuthenticator {
    /// Creates an authenticator from explicit collaborators.
    #[must_use]
    pub fn new(
        config: DiscordConfig,
        host: HostServices,
        guilds: Arc<dyn GuildSource>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        let dispatcher = SideEffectDispatcher::new(host.accounts.clone(), queue);
        let linker = AccountLinker::new(
            MembershipVerifier::new(guilds),
            dispatcher,
            host,
            config.trusted_group(),
        );
        Self { config, linker }
    }

    /// Creates an authenticator that queries the public Discord API.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the HTTP client cannot be built.
    pub fn with_discord_api(
        config: DiscordConfig,
        host: HostServices,
        queue: Arc<dyn JobQueue>,
    ) -> Result<Self, Report<AuthError>> {
        let guilds = DiscordGuildClient::new().map_err(|e| AuthError::Configuration {
            reason: e.to_string(),
        })?;
        Ok(Self::new(config, host, Arc::new(guilds), queue))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// Whether Discord login is switched on.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.enabled()
    }

    #[must_use]
    pub fn can_revoke(&self) -> bool {
        self.linker.can_revoke()
    }

    #[must_use]
    pub fn config(&self) -> &DiscordConfig {
        &self.config
    }

    /// Unlinks the account from Discord.
    ///
    /// The link is local state only, so `skip_remote` changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::LinkNotFound` if the account was never linked.
    #[instrument(skip(self, user))]
    pub async fn revoke(
        &self,
        user: &LocalAccount,
        skip_remote: bool,
    ) -> Result<bool, Report<AuthError>> {
        self.linker.revoke(user).await
    }

    /// Handles a completed handshake for the profile Discord returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the host's link step fails.
    pub async fn after_authenticate(
        &self,
        token: &AccessToken,
        profile: &DiscordProfile,
    ) -> Result<AuthResult, Report<AuthError>> {
        self.linker.after_authenticate(token, profile).await
    }

    /// Same as [`after_authenticate`](Self::after_authenticate), taking the
    /// raw `/users/@me` payload.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidProfile` if the payload is not a Discord
    /// user object.
    pub async fn after_authenticate_json(
        &self,
        token: &AccessToken,
        raw_profile: serde_json::Value,
    ) -> Result<AuthResult, Report<AuthError>> {
        let profile = DiscordProfile::from_json(raw_profile)?;
        self.after_authenticate(token, &profile).await
    }

    /// Handles the account the host created for `auth`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the host cannot record the link.
    pub async fn after_account_creation(
        &self,
        user: &LocalAccount,
        auth: &AuthResult,
    ) -> Result<(), Report<AuthError>> {
        self.linker.after_account_creation(user, auth).await
    }

    /// Credentials, scopes, and button presentation for the host's OAuth2
    /// middleware.
    #[must_use]
    pub fn register_middleware(&self) -> ProviderRegistration {
        debug!(provider = PROVIDER_NAME, "registering provider");
        ProviderRegistration::from_config(PROVIDER_NAME, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Actor, ExternalIdentityLink};
    use crate::testing::{FakeGuilds, FakeHost, FakeQueue, token};
    use serde_json::json;
    use std::time::Duration;

    fn config(trusted: &str) -> DiscordConfig {
        DiscordConfig::builder("1234567890".to_string(), "shh".to_string())
            .enabled(true)
            .trusted_group_id(trusted)
            .build()
    }

    fn raw_profile() -> serde_json::Value {
        json!({
            "id": "80351110224678912",
            "username": "nelly",
            "global_name": "Nelly",
            "email": "nelly@example.com",
            "verified": true,
            "avatar": "a_8342729096ea3675442027381ff50dfe"
        })
    }

    #[tokio::test]
    async fn trusted_member_signup_flow() {
        let host = FakeHost::new();
        let queue = FakeQueue::new();
        let auth = DiscordAuthenticator::new(
            config("G1"),
            host.services(),
            FakeGuilds::returning(&["G1"]),
            queue.clone(),
        );

        let result = auth
            .after_authenticate_json(&token(), raw_profile())
            .await
            .expect("login");
        assert_eq!(
            host.invites(),
            vec![("nelly@example.com".to_string(), Actor::System)]
        );
        assert!(result.extra_data.auto_approve);
        assert_eq!(
            result.extra_data.avatar_url.as_deref(),
            Some(
                "https://cdn.discordapp.com/avatars/80351110224678912/a_8342729096ea3675442027381ff50dfe.gif"
            )
        );

        let user = LocalAccount::new(Some("nelly@example.com".to_string()));
        auth.after_account_creation(&user, &result)
            .await
            .expect("creation");

        assert_eq!(host.approvals(), vec![(user.id(), Actor::System, false)]);
        assert_eq!(queue.jobs().len(), 1);

        assert!(auth.revoke(&user, false).await.expect("revoke"));
        assert!(host.links().is_empty());
    }

    #[tokio::test]
    async fn unset_trust_makes_no_guild_request() {
        let guilds = FakeGuilds::returning(&["G1"]);
        let host = FakeHost::new();
        let auth = DiscordAuthenticator::new(
            config(""),
            host.services(),
            guilds.clone(),
            FakeQueue::new(),
        );

        let result = auth
            .after_authenticate_json(&token(), raw_profile())
            .await
            .expect("login");

        assert_eq!(guilds.calls(), 0);
        assert!(!result.extra_data.auto_approve);
        assert!(host.invites().is_empty());
    }

    #[tokio::test]
    async fn unreachable_discord_does_not_block_login() {
        let host = FakeHost::new();
        let guilds = DiscordGuildClient::with_settings("http://127.0.0.1:1", Duration::from_secs(2))
            .expect("client");
        let auth = DiscordAuthenticator::new(
            config("G1"),
            host.services(),
            Arc::new(guilds),
            FakeQueue::new(),
        );

        let result = auth
            .after_authenticate_json(&token(), raw_profile())
            .await
            .expect("login completes");

        assert!(!result.extra_data.auto_approve);
        assert!(host.invites().is_empty());
    }

    #[tokio::test]
    async fn malformed_profile_is_rejected() {
        let auth = DiscordAuthenticator::new(
            config("G1"),
            FakeHost::new().services(),
            FakeGuilds::returning(&[]),
            FakeQueue::new(),
        );

        let err = auth
            .after_authenticate_json(&token(), json!(["not", "a", "user"]))
            .await
            .expect_err("invalid profile");
        assert!(matches!(
            err.current_context(),
            AuthError::InvalidProfile { .. }
        ));
    }

    #[tokio::test]
    async fn revoke_ignores_skip_remote() {
        let host = FakeHost::new();
        let auth = DiscordAuthenticator::new(
            config(""),
            host.services(),
            FakeGuilds::returning(&[]),
            FakeQueue::new(),
        );
        let user = LocalAccount::new(None);
        host.add_link(ExternalIdentityLink::new(user.id(), "discord", "42"));

        assert!(auth.revoke(&user, true).await.expect("revoke"));
        let err = auth.revoke(&user, true).await.expect_err("already revoked");
        assert!(matches!(
            err.current_context(),
            AuthError::LinkNotFound { .. }
        ));
    }

    #[test]
    fn plugin_contract_flags() {
        let auth = DiscordAuthenticator::new(
            config(""),
            FakeHost::new().services(),
            FakeGuilds::returning(&[]),
            FakeQueue::new(),
        );

        assert_eq!(auth.name(), "discord");
        assert!(auth.enabled());
        assert!(auth.can_revoke());
        assert_eq!(auth.register_middleware().scope_string(), "identify email guilds");
    }

    #[test]
    fn disabled_config_disables_provider() {
        let auth = DiscordAuthenticator::new(
            DiscordConfig::builder("id".to_string(), "secret".to_string())
                .enabled(false)
                .build(),
            FakeHost::new().services(),
            FakeGuilds::returning(&[]),
            FakeQueue::new(),
        );
        assert!(!auth.enabled());
    }
}
