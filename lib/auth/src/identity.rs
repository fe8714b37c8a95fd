//! Provider profile parsing and claim mapping.
//!
//! Discord returns the current user from `/users/@me`. Only `id` is
//! guaranteed; everything else depends on granted scopes and what the user
//! has set, so each field maps to an optional claim.

use crate::error::AuthError;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};

/// Base URL for user avatar images.
const AVATAR_CDN_URL: &str = "https://cdn.discordapp.com/avatars";

/// The Discord user object, as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordProfile {
    /// Stable user snowflake.
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Display name chosen by the user, if any.
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    /// Avatar hash; `a_`-prefixed hashes are animated.
    #[serde(default)]
    pub avatar: Option<String>,
}

impl DiscordProfile {
    /// Parses the raw provider payload.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` if the payload is not a user object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, Report<AuthError>> {
        // Derived struct impls also accept sequences, so check the shape first.
        if !value.is_object() {
            return Err(AuthError::InvalidProfile {
                reason: "expected a user object".to_string(),
            }
            .into());
        }

        Ok(serde_json::from_value(value).map_err(|e| AuthError::InvalidProfile {
            reason: e.to_string(),
        })?)
    }
}

/// Identity attributes asserted by the provider for one login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Stable external user id.
    pub external_uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl IdentityClaims {
    /// Creates claims carrying only the external id.
    #[must_use]
    pub fn new(external_uid: impl Into<String>) -> Self {
        Self {
            external_uid: external_uid.into(),
            email: None,
            email_verified: false,
            username: None,
            display_name: None,
            avatar_url: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    #[must_use]
    pub fn with_email_verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    #[must_use]
    pub fn with_avatar_url(mut self, url: Option<String>) -> Self {
        self.avatar_url = url;
        self
    }
}

/// Normalizes a provider profile into identity claims.
///
/// Pure: performs no I/O and never fails. Blank strings are treated as
/// absent.
#[must_use]
pub fn map_claims(profile: &DiscordProfile) -> IdentityClaims {
    let username = non_blank(profile.username.as_deref());
    let display_name = non_blank(profile.global_name.as_deref()).or_else(|| username.clone());

    IdentityClaims::new(profile.id.clone())
        .with_email(non_blank(profile.email.as_deref()))
        .with_email_verified(profile.verified.unwrap_or(false))
        .with_username(username)
        .with_display_name(display_name)
        .with_avatar_url(avatar_url(&profile.id, profile.avatar.as_deref()))
}

fn avatar_url(user_id: &str, hash: Option<&str>) -> Option<String> {
    let hash = non_blank(hash)?;
    let extension = if hash.starts_with("a_") { "gif" } else { "png" };
    Some(format!("{AVATAR_CDN_URL}/{user_id}/{hash}.{extension}"))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
