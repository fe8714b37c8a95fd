//! What the host needs to mount the Discord OAuth2 provider.

use crate::config::DiscordConfig;
use crate::error::AuthError;
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenUrl};
use rootcause::prelude::Report;
use serde::Serialize;

/// Discord's authorization endpoint.
pub const DISCORD_AUTH_URL: &str = "https://discord.com/oauth2/authorize";

/// Discord's token endpoint.
pub const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

/// Scopes requested at login. `guilds` is needed for the trust check.
pub const DISCORD_SCOPES: [&str; 3] = ["identify", "email", "guilds"];

/// How the host treats accounts from this provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderOptions {
    /// Provider-asserted emails are trusted for matching accounts.
    pub trusted: bool,
    /// Accounts are created without a signup form.
    pub auto_create_account: bool,
}

/// Login button presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderUi {
    pub icon: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub button_color: String,
}

impl Default for ProviderUi {
    fn default() -> Self {
        Self {
            icon: "fab-discord".to_string(),
            frame_width: 920,
            frame_height: 800,
            button_color: "#7289da".to_string(),
        }
    }
}

/// Provider credentials, scopes, and presentation handed to the host.
#[derive(Debug, Clone)]
pub struct ProviderRegistration {
    name: String,
    client_id: ClientId,
    client_secret: ClientSecret,
    scopes: Vec<String>,
    options: ProviderOptions,
    ui: ProviderUi,
}

impl ProviderRegistration {
    /// Builds the registration from the current configuration.
    #[must_use]
    pub fn from_config(name: &str, config: &DiscordConfig) -> Self {
        Self {
            name: name.to_string(),
            client_id: ClientId::new(config.client_id().to_string()),
            client_secret: ClientSecret::new(config.client_secret().to_string()),
            scopes: DISCORD_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            options: ProviderOptions {
                trusted: true,
                auto_create_account: true,
            },
            ui: ProviderUi::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        self.client_id.as_str()
    }

    #[must_use]
    pub fn client_secret(&self) -> &str {
        self.client_secret.secret()
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Scopes as a single space-separated string.
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    #[must_use]
    pub fn options(&self) -> ProviderOptions {
        self.options
    }

    #[must_use]
    pub fn ui(&self) -> &ProviderUi {
        &self.ui
    }

    /// Builds the URL the user is sent to, plus the CSRF state to verify on
    /// callback.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if `redirect_uri` is not a valid URL.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
    ) -> Result<(String, CsrfToken), Report<AuthError>> {
        let auth_url = AuthUrl::new(DISCORD_AUTH_URL.to_string()).map_err(|e| {
            AuthError::Configuration {
                reason: format!("invalid auth URL: {e}"),
            }
        })?;
        let token_url = TokenUrl::new(DISCORD_TOKEN_URL.to_string()).map_err(|e| {
            AuthError::Configuration {
                reason: format!("invalid token URL: {e}"),
            }
        })?;
        let redirect_url = RedirectUrl::new(redirect_uri.to_string()).map_err(|e| {
            AuthError::Configuration {
                reason: format!("invalid redirect URL: {e}"),
            }
        })?;

        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }
        let (url, state) = request.url();

        Ok((url.to_string(), state))
    }
}
