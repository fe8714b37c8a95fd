//! Post-login side effects: approval and avatar import.
//!
//! Both are best-effort. A failure is logged and never aborts the login or
//! the account creation that triggered it.

use crate::account::{Actor, LocalAccount};
use crate::error::AuthError;
use crate::host::AccountDirectory;
use guildgate_core::UserId;
use guildgate_jobs::{AvatarImportJob, Envelope, Job, JobQueue};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Applies the side effects of a trust decision.
#[derive(Clone)]
pub struct SideEffectDispatcher {
    accounts: Arc<dyn AccountDirectory>,
    queue: Arc<dyn JobQueue>,
}

impl SideEffectDispatcher {
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountDirectory>, queue: Arc<dyn JobQueue>) -> Self {
        Self { accounts, queue }
    }

    /// Queues an avatar download for `user_id` from `url`.
    ///
    /// Accounts with a manually uploaded avatar are left alone. The job never
    /// overrides a Gravatar.
    #[instrument(skip(self, url), fields(user_id = %user_id))]
    pub async fn import_avatar(&self, user_id: UserId, url: &str) {
        match self.accounts.has_custom_avatar(user_id).await {
            Ok(false) => {}
            Ok(true) => {
                debug!("custom avatar present; skipping import");
                return;
            }
            Err(e) => {
                warn!(error = %e, "avatar lookup failed; skipping import");
                return;
            }
        }

        let job = Envelope::new(Job::from(AvatarImportJob::new(url, user_id)));
        let job_id = job.id;
        match self.queue.enqueue(job).await {
            Ok(()) => debug!(%job_id, "avatar_queued"),
            Err(e) => {
                let error = AuthError::JobEnqueue {
                    reason: e.to_string(),
                };
                warn!(%error, "avatar import not queued");
            }
        }
    }

    /// Approves `account` as the system when the login was auto-approved.
    ///
    /// Already-approved accounts are not touched.
    #[instrument(skip(self, account), fields(user_id = %account.id()))]
    pub async fn approve_if_eligible(&self, account: &LocalAccount, auto_approve: bool) {
        if !auto_approve || account.is_approved() {
            return;
        }

        match self.accounts.approve(account.id(), Actor::System, false).await {
            Ok(()) => debug!("approved"),
            Err(e) => warn!(error = %e, "automatic approval failed"),
        }
    }
}
