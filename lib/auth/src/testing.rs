//! In-memory collaborators for unit tests.

use crate::account::{Actor, ExternalIdentityLink, LinkOutcome, LocalAccount};
use crate::error::{HostError, MembershipError};
use crate::host::{AccountDirectory, HostServices, IdentityLinkStore, InviteIssuer, OAuth2Linker};
use crate::identity::IdentityClaims;
use crate::membership::{Guild, GuildSource};
use async_trait::async_trait;
use guildgate_core::{IdentityLinkId, UserId};
use guildgate_jobs::{Envelope, Job, JobQueue, QueueError};
use oauth2::AccessToken;
use rootcause::prelude::Report;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn unavailable(operation: &str) -> Report<HostError> {
    HostError::Unavailable {
        operation: operation.to_string(),
        details: "injected failure".to_string(),
    }
    .into()
}

#[derive(Default)]
struct HostState {
    accounts: Vec<LocalAccount>,
    custom_avatars: HashSet<UserId>,
    links: Vec<ExternalIdentityLink>,
    invites: Vec<(String, Actor)>,
    approvals: Vec<(UserId, Actor, bool)>,
    destroyed: Vec<IdentityLinkId>,
    email_lookups: usize,
    fail_lookups: bool,
    fail_invites: bool,
    fail_approvals: bool,
    fail_avatar_checks: bool,
    fail_linking: bool,
}

/// Records every host call and answers from in-memory state.
#[derive(Default)]
pub(crate) struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn services(self: &Arc<Self>) -> HostServices {
        HostServices {
            accounts: self.clone(),
            invites: self.clone(),
            links: self.clone(),
            oauth2: self.clone(),
        }
    }

    pub(crate) fn add_account(&self, account: LocalAccount) {
        self.state.lock().unwrap().accounts.push(account);
    }

    pub(crate) fn add_link(&self, link: ExternalIdentityLink) {
        self.state.lock().unwrap().links.push(link);
    }

    pub(crate) fn set_custom_avatar(&self, user_id: UserId) {
        self.state.lock().unwrap().custom_avatars.insert(user_id);
    }

    pub(crate) fn fail_lookups(&self) {
        self.state.lock().unwrap().fail_lookups = true;
    }

    pub(crate) fn fail_invites(&self) {
        self.state.lock().unwrap().fail_invites = true;
    }

    pub(crate) fn fail_approvals(&self) {
        self.state.lock().unwrap().fail_approvals = true;
    }

    pub(crate) fn fail_avatar_checks(&self) {
        self.state.lock().unwrap().fail_avatar_checks = true;
    }

    pub(crate) fn fail_linking(&self) {
        self.state.lock().unwrap().fail_linking = true;
    }

    pub(crate) fn invites(&self) -> Vec<(String, Actor)> {
        self.state.lock().unwrap().invites.clone()
    }

    pub(crate) fn approvals(&self) -> Vec<(UserId, Actor, bool)> {
        self.state.lock().unwrap().approvals.clone()
    }

    pub(crate) fn links(&self) -> Vec<ExternalIdentityLink> {
        self.state.lock().unwrap().links.clone()
    }

    pub(crate) fn destroyed(&self) -> Vec<IdentityLinkId> {
        self.state.lock().unwrap().destroyed.clone()
    }

    pub(crate) fn email_lookups(&self) -> usize {
        self.state.lock().unwrap().email_lookups
    }
}

#[async_trait]
impl AccountDirectory for FakeHost {
    async fn find_by_email(&self, email: &str) -> Result<Option<LocalAccount>, Report<HostError>> {
        let mut state = self.state.lock().unwrap();
        state.email_lookups += 1;
        if state.fail_lookups {
            return Err(unavailable("find_by_email"));
        }
        Ok(state
            .accounts
            .iter()
            .find(|a| a.email() == Some(email))
            .cloned())
    }

    async fn approve(
        &self,
        user_id: UserId,
        actor: Actor,
        require_reason: bool,
    ) -> Result<(), Report<HostError>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_approvals {
            return Err(unavailable("approve"));
        }
        state.approvals.push((user_id, actor, require_reason));
        if let Some(account) = state.accounts.iter_mut().find(|a| a.id() == user_id) {
            account.approve();
        }
        Ok(())
    }

    async fn has_custom_avatar(&self, user_id: UserId) -> Result<bool, Report<HostError>> {
        let state = self.state.lock().unwrap();
        if state.fail_avatar_checks {
            return Err(unavailable("has_custom_avatar"));
        }
        Ok(state.custom_avatars.contains(&user_id))
    }
}

#[async_trait]
impl InviteIssuer for FakeHost {
    async fn issue_invite(&self, email: &str, issuer: Actor) -> Result<(), Report<HostError>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_invites {
            return Err(unavailable("issue_invite"));
        }
        state.invites.push((email.to_string(), issuer));
        Ok(())
    }
}

#[async_trait]
impl IdentityLinkStore for FakeHost {
    async fn find(
        &self,
        user_id: UserId,
        provider: &str,
    ) -> Result<Option<ExternalIdentityLink>, Report<HostError>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .links
            .iter()
            .find(|l| l.user_id == user_id && l.provider == provider)
            .cloned())
    }

    async fn destroy(&self, link_id: IdentityLinkId) -> Result<(), Report<HostError>> {
        let mut state = self.state.lock().unwrap();
        let before = state.links.len();
        state.links.retain(|l| l.id != link_id);
        if state.links.len() == before {
            return Err(HostError::NotFound {
                entity: link_id.to_string(),
            }
            .into());
        }
        state.destroyed.push(link_id);
        Ok(())
    }
}

#[async_trait]
impl OAuth2Linker for FakeHost {
    async fn link(
        &self,
        provider: &str,
        claims: &IdentityClaims,
    ) -> Result<LinkOutcome, Report<HostError>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_linking {
            return Err(unavailable("link"));
        }

        if let Some(link) = state
            .links
            .iter()
            .find(|l| l.provider == provider && l.external_uid == claims.external_uid)
            .cloned()
        {
            let user = state.accounts.iter().find(|a| a.id() == link.user_id).cloned();
            return Ok(LinkOutcome {
                user,
                link: Some(link),
            });
        }

        let matched = claims
            .email
            .as_deref()
            .and_then(|email| state.accounts.iter().find(|a| a.email() == Some(email)))
            .cloned();

        match matched {
            Some(user) => {
                let link = ExternalIdentityLink::new(user.id(), provider, &claims.external_uid);
                state.links.push(link.clone());
                Ok(LinkOutcome {
                    user: Some(user),
                    link: Some(link),
                })
            }
            None => Ok(LinkOutcome::default()),
        }
    }

    async fn link_new_account(
        &self,
        provider: &str,
        account: &LocalAccount,
        claims: &IdentityClaims,
    ) -> Result<ExternalIdentityLink, Report<HostError>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_linking {
            return Err(unavailable("link_new_account"));
        }
        let link = ExternalIdentityLink::new(account.id(), provider, &claims.external_uid);
        state.links.push(link.clone());
        if !state.accounts.iter().any(|a| a.id() == account.id()) {
            state.accounts.push(account.clone());
        }
        Ok(link)
    }
}

/// Records submitted jobs; can be switched to reject them.
#[derive(Default)]
pub(crate) struct FakeQueue {
    jobs: Mutex<Vec<Envelope<Job>>>,
    reject: Mutex<bool>,
}

impl FakeQueue {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reject_all(&self) {
        *self.reject.lock().unwrap() = true;
    }

    pub(crate) fn jobs(&self) -> Vec<Job> {
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.payload.clone())
            .collect()
    }
}

#[async_trait]
impl JobQueue for FakeQueue {
    async fn enqueue(&self, job: Envelope<Job>) -> Result<(), Report<QueueError>> {
        if *self.reject.lock().unwrap() {
            return Err(QueueError::Closed.into());
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

/// Serves a fixed guild list (or a fixed failure) and counts requests.
pub(crate) struct FakeGuilds {
    calls: AtomicUsize,
    response: Result<Vec<Guild>, MembershipError>,
}

impl FakeGuilds {
    pub(crate) fn returning(guild_ids: &[&str]) -> Arc<Self> {
        let guilds = guild_ids
            .iter()
            .map(|id| Guild {
                id: (*id).to_string(),
                name: None,
            })
            .collect();
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            response: Ok(guilds),
        })
    }

    pub(crate) fn failing(error: MembershipError) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            response: Err(error),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuildSource for FakeGuilds {
    async fn current_user_guilds(
        &self,
        _token: &AccessToken,
    ) -> Result<Vec<Guild>, Report<MembershipError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(guilds) => Ok(guilds.clone()),
            Err(e) => Err(e.clone().into()),
        }
    }
}

pub(crate) fn token() -> AccessToken {
    AccessToken::new("discord-access-token".to_string())
}
