//! Auto-approval and invite decisions.
//!
//! Guild members are auto-approved. A member who has no local account yet
//! is also sent an invite, which lets closed-signup communities admit
//! verified members. The decision has no side effects; the linker and the
//! dispatcher act on it.

use crate::host::AccountDirectory;
use crate::identity::IdentityClaims;
use std::sync::Arc;
use tracing::warn;

/// The outcome of evaluating one login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrustDecision {
    /// Approve the account without moderator review.
    pub auto_approve: bool,
    /// Issue an invite to the login's email.
    pub should_invite: bool,
}

impl TrustDecision {
    /// Combines guild membership with whether an account already exists.
    #[must_use]
    pub fn evaluate(membership: bool, account_exists: bool) -> Self {
        Self {
            auto_approve: membership,
            should_invite: membership && !account_exists,
        }
    }
}

/// Evaluates [`TrustDecision`]s, looking up existing accounts by email.
#[derive(Clone)]
pub struct TrustDecisionEngine {
    accounts: Arc<dyn AccountDirectory>,
}

impl TrustDecisionEngine {
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountDirectory>) -> Self {
        Self { accounts }
    }

    /// Decides approval and invitation for a login.
    ///
    /// Accounts are only looked up for guild members. A member without an
    /// email cannot be invited, and a failed lookup suppresses the invite
    /// rather than risk inviting an address that is already registered.
    pub async fn decide(&self, claims: &IdentityClaims, membership: bool) -> TrustDecision {
        if !membership {
            return TrustDecision::evaluate(false, false);
        }

        let Some(email) = claims.email.as_deref() else {
            return TrustDecision {
                auto_approve: true,
                should_invite: false,
            };
        };

        let account_exists = match self.accounts.find_by_email(email).await {
            Ok(account) => account.is_some(),
            Err(e) => {
                warn!(error = %e, "account lookup failed; skipping invite");
                true
            }
        };

        TrustDecision::evaluate(true, account_exists)
    }
}
