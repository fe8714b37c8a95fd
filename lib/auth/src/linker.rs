//! The login pipeline: membership, decision, invite, link, side effects.

use crate::account::{Actor, AuthResult, LocalAccount};
use crate::config::TrustedGroupId;
use crate::decision::TrustDecisionEngine;
use crate::dispatcher::SideEffectDispatcher;
use crate::error::{AuthError, HostError};
use crate::host::HostServices;
use crate::identity::{DiscordProfile, map_claims};
use crate::membership::MembershipVerifier;
use oauth2::AccessToken;
use rootcause::prelude::Report;
use tracing::{debug, instrument, warn};

/// Provider name used for identity links.
pub const PROVIDER_NAME: &str = "discord";

fn host_failure(operation: &str, e: &Report<HostError>) -> AuthError {
    AuthError::Host {
        operation: operation.to_string(),
        details: e.to_string(),
    }
}

/// Runs a Discord login through the trust pipeline and links the account.
#[derive(Clone)]
pub struct AccountLinker {
    verifier: MembershipVerifier,
    engine: TrustDecisionEngine,
    dispatcher: SideEffectDispatcher,
    host: HostServices,
    trusted_group: TrustedGroupId,
}

impl AccountLinker {
    #[must_use]
    pub fn new(
        verifier: MembershipVerifier,
        dispatcher: SideEffectDispatcher,
        host: HostServices,
        trusted_group: TrustedGroupId,
    ) -> Self {
        Self {
            verifier,
            engine: TrustDecisionEngine::new(host.accounts.clone()),
            dispatcher,
            host,
            trusted_group,
        }
    }

    /// Processes a completed OAuth2 handshake.
    ///
    /// Trusted guild members without an account are invited before the host
    /// links the identity, so the host sees the invite when it decides
    /// whether signup is allowed. Only the link step can fail the login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Host` if the host's link step fails.
    #[instrument(skip(self, token, profile), fields(external_uid = %profile.id))]
    pub async fn after_authenticate(
        &self,
        token: &AccessToken,
        profile: &DiscordProfile,
    ) -> Result<AuthResult, Report<AuthError>> {
        let membership = self
            .verifier
            .is_trusted_member(token, &self.trusted_group)
            .await;
        debug!(membership, "membership_checked");

        let claims = map_claims(profile);
        let decision = self.engine.decide(&claims, membership).await;
        debug!(
            auto_approve = decision.auto_approve,
            should_invite = decision.should_invite,
            "decided"
        );

        if decision.should_invite
            && let Some(email) = claims.email.as_deref()
        {
            self.invite(email).await;
        }

        let outcome = self
            .host
            .oauth2
            .link(PROVIDER_NAME, &claims)
            .await
            .map_err(|e| host_failure("link", &e))?;
        debug!(existing_user = outcome.user.is_some(), "linked");

        let mut result = AuthResult::from_outcome(claims, outcome);
        result.extra_data.avatar_url = result.claims.avatar_url.clone();
        result.extra_data.auto_approve = decision.auto_approve;

        if let (Some(user), Some(url)) = (&result.user, &result.extra_data.avatar_url) {
            self.dispatcher.import_avatar(user.id(), url).await;
        }

        Ok(result)
    }

    async fn invite(&self, email: &str) {
        match self.host.invites.issue_invite(email, Actor::System).await {
            Ok(()) => debug!("invited"),
            Err(e) => {
                let error = AuthError::InviteIssuance {
                    reason: e.to_string(),
                };
                warn!(%error, "trusted member was not invited");
            }
        }
    }

    /// Finishes a login that created `account`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Host` if the host cannot record the link.
    #[instrument(skip(self, account, auth), fields(user_id = %account.id()))]
    pub async fn after_account_creation(
        &self,
        account: &LocalAccount,
        auth: &AuthResult,
    ) -> Result<(), Report<AuthError>> {
        self.host
            .oauth2
            .link_new_account(PROVIDER_NAME, account, &auth.claims)
            .await
            .map_err(|e| host_failure("link_new_account", &e))?;
        debug!("linked");

        self.dispatcher
            .approve_if_eligible(account, auth.extra_data.auto_approve)
            .await;

        if let Some(url) = auth.extra_data.avatar_url.as_deref() {
            self.dispatcher.import_avatar(account.id(), url).await;
        }

        Ok(())
    }

    /// Removes the account's Discord link.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::LinkNotFound` if the account has no link, and
    /// `AuthError::Host` if the host lookup or delete fails.
    #[instrument(skip(self, account), fields(user_id = %account.id()))]
    pub async fn revoke(&self, account: &LocalAccount) -> Result<bool, Report<AuthError>> {
        let link = self
            .host
            .links
            .find(account.id(), PROVIDER_NAME)
            .await
            .map_err(|e| host_failure("find_link", &e))?
            .ok_or_else(|| AuthError::LinkNotFound {
                user_id: account.id(),
                provider: PROVIDER_NAME.to_string(),
            })?;

        self.host
            .links
            .destroy(link.id)
            .await
            .map_err(|e| host_failure("destroy_link", &e))?;

        debug!(link_id = %link.id, "revoked");
        Ok(true)
    }

    /// Discord links can always be revoked.
    #[must_use]
    pub fn can_revoke(&self) -> bool {
        true
    }
}
