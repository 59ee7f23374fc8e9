//! Vhost assignment, removal, and listing.
//!
//! [`VhostEngine`] is the only component that touches accounts, nickname
//! overrides, live sessions, and audit records together. Each assign or
//! clear runs in a fixed order: resolve the target, validate the host, write
//! the metadata, fan the change out to every session known at that moment,
//! and finally emit an audit record. The write, fan-out, and audit record
//! all happen under the account's lock, so audit records for one account
//! follow the order of its commits. A failed resolution or validation
//! returns before anything is written.
//!
//! Collaborators are injected. The directory and store are generic so
//! callers keep typed access to them through [`VhostEngine::directory`] and
//! [`VhostEngine::store`]. The remaining services default to a
//! [`PolicyValidator`], no live sessions, a [`StructuredAuditSink`], and the
//! [`SystemClock`], and are replaced with the `with_*` builder methods.

mod guard;
mod listing;

use std::sync::Arc;

use crate::audit::{AuditEvent, AuditSink, StructuredAuditSink};
use crate::clock::{Clock, SystemClock};
use crate::directory::{AccountName, IdentityDirectory};
use crate::error::VhostError;
use crate::metadata::{AccountVhost, Provenance, VhostStore};
use crate::pattern::HostPattern;
use crate::propagation::{
    DiscardSink, DisplayHost, HostUpdate, NoSessions, PropagationSink, SessionRegistry,
};
use crate::validator::{HostnameValidator, PolicyValidator, Rejection};

use self::guard::AccountGuards;
pub use self::listing::{MatchScope, VhostMatch, VhostMatches};

/// Outcome of a successful assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    account: AccountName,
    host: String,
    sessions_notified: usize,
}

impl Assignment {
    /// Returns the account that received the vhost.
    #[must_use]
    pub const fn account(&self) -> &AccountName {
        &self.account
    }

    /// Returns the host that was applied.
    #[must_use]
    pub const fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Returns how many sessions were sent an update.
    #[must_use]
    pub const fn sessions_notified(&self) -> usize {
        self.sessions_notified
    }
}

/// Outcome of a successful clearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clearance {
    account: AccountName,
    previous: Option<AccountVhost>,
    sessions_notified: usize,
}

impl Clearance {
    /// Returns the account whose vhost was cleared.
    #[must_use]
    pub const fn account(&self) -> &AccountName {
        &self.account
    }

    /// Returns the vhost that was removed, if there was one.
    #[must_use]
    pub const fn previous(&self) -> Option<&AccountVhost> {
        self.previous.as_ref()
    }

    /// Returns how many sessions were sent an update.
    #[must_use]
    pub const fn sessions_notified(&self) -> usize {
        self.sessions_notified
    }
}

/// Orchestrates vhost changes across metadata, sessions, and audit.
///
/// # Example
///
/// ```
/// use hostserv_vhost::{MemoryDirectory, MemoryVhostStore, VhostEngine};
///
/// let mut directory = MemoryDirectory::new();
/// directory.register_account("alice").expect("register alice");
///
/// let engine = VhostEngine::new(directory, MemoryVhostStore::new());
/// let assignment = engine
///     .assign_vhost("alice", "staff.example.net", "oper")
///     .expect("assignment succeeds");
/// assert_eq!(assignment.host(), "staff.example.net");
///
/// let listed: Vec<_> = engine.list_vhosts("*.example.net").collect();
/// assert_eq!(listed.len(), 1);
/// ```
pub struct VhostEngine<D, S> {
    directory: D,
    store: S,
    validator: Arc<dyn HostnameValidator>,
    sessions: Arc<dyn SessionRegistry>,
    sink: Arc<dyn PropagationSink>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    guards: AccountGuards,
}

impl<D, S> VhostEngine<D, S> {
    /// Creates an engine over a directory and store with default services.
    #[must_use]
    pub fn new(directory: D, store: S) -> Self {
        Self {
            directory,
            store,
            validator: Arc::new(PolicyValidator::default()),
            sessions: Arc::new(NoSessions),
            sink: Arc::new(DiscardSink),
            audit: Arc::new(StructuredAuditSink::new()),
            clock: Arc::new(SystemClock),
            guards: AccountGuards::default(),
        }
    }

    /// Replaces the hostname policy.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn HostnameValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Connects the engine to live sessions.
    #[must_use]
    pub fn with_sessions(
        mut self,
        sessions: Arc<dyn SessionRegistry>,
        sink: Arc<dyn PropagationSink>,
    ) -> Self {
        self.sessions = sessions;
        self.sink = sink;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the time source used to stamp assignments.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the identity directory.
    #[must_use]
    pub const fn directory(&self) -> &D {
        &self.directory
    }

    /// Returns a mutable reference to the identity directory.
    #[must_use]
    pub const fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    /// Returns the vhost store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the audit sink, for callers auditing their own actions.
    #[must_use]
    pub fn audit(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }
}

impl<D, S> VhostEngine<D, S>
where
    D: IdentityDirectory,
    S: VhostStore,
{
    /// Assigns `host` to the account `target` resolves to.
    ///
    /// The host, timestamp, and assigner are stored as one value, then every
    /// session of the account is told which host to display.
    ///
    /// # Errors
    ///
    /// Returns [`VhostError::NoSuchTarget`] when `target` does not resolve,
    /// or [`VhostError::InvalidHostname`] when the policy rejects `host`.
    /// Nothing is written in either case.
    pub fn assign_vhost(
        &self,
        target: &str,
        host: &str,
        assigner: &str,
    ) -> Result<Assignment, VhostError> {
        let account = self.resolve(target)?;
        self.check_host(host, assigner)?;

        let sessions_notified = self.guards.with_lock(&account.key(), || {
            let provenance = Provenance::recorded(self.clock.now(), assigner);
            self.store
                .store_account_vhost(&account, AccountVhost::new(host, provenance));
            let notified = self.propagate(&account, Some(host));
            self.audit.record(&AuditEvent::VhostAssigned {
                account: account.clone(),
                host: host.to_owned(),
                assigner: assigner.to_owned(),
            });
            notified
        });

        tracing::debug!(
            target: "hostserv::engine",
            event = "vhost_assigned",
            account = %account,
            sessions = sessions_notified,
            "vhost assigned"
        );

        Ok(Assignment {
            account,
            host: host.to_owned(),
            sessions_notified,
        })
    }

    /// Removes the account-level vhost of the account `target` resolves to.
    ///
    /// Clearing an account without a vhost succeeds without touching the
    /// store or any session. Nickname overrides are never removed, so a
    /// session using an overridden nickname keeps its override.
    ///
    /// # Errors
    ///
    /// Returns [`VhostError::NoSuchTarget`] when `target` does not resolve.
    pub fn clear_vhost(&self, target: &str, assigner: &str) -> Result<Clearance, VhostError> {
        let account = self.resolve(target)?;

        let (previous, sessions_notified) = self.guards.with_lock(&account.key(), || {
            let previous = self.store.remove_account_vhost(&account);
            let notified = if previous.is_some() {
                self.propagate(&account, None)
            } else {
                0
            };
            self.audit.record(&AuditEvent::VhostRemoved {
                account: account.clone(),
                assigner: assigner.to_owned(),
            });
            (previous, notified)
        });

        tracing::debug!(
            target: "hostserv::engine",
            event = "vhost_removed",
            account = %account,
            had_vhost = previous.is_some(),
            sessions = sessions_notified,
            "vhost removed"
        );

        Ok(Clearance {
            account,
            previous,
            sessions_notified,
        })
    }

    /// Lists every account vhost and nickname override matching `pattern`.
    ///
    /// The returned iterator is lazy and never fails. Calling again starts a
    /// fresh enumeration.
    pub fn list_vhosts(&self, pattern: &str) -> VhostMatches<'_, D, S> {
        VhostMatches::new(&self.directory, &self.store, HostPattern::new(pattern))
    }

    /// Returns the account `target` resolves to and its current vhost.
    ///
    /// # Errors
    ///
    /// Returns [`VhostError::NoSuchTarget`] when `target` does not resolve.
    pub fn account_vhost(
        &self,
        target: &str,
    ) -> Result<(AccountName, Option<AccountVhost>), VhostError> {
        let account = self.resolve(target)?;
        let vhost = self.store.account_vhost(&account);
        Ok((account, vhost))
    }

    /// Computes the host a session should display when it connects.
    #[must_use]
    pub fn display_host(&self, account: &AccountName, nickname: &str) -> DisplayHost {
        let account_vhost = self.store.account_vhost(account);
        DisplayHost::resolve(
            self.store.nickname_vhost(nickname),
            account_vhost.as_ref().map(AccountVhost::host),
        )
    }

    fn resolve(&self, target: &str) -> Result<AccountName, VhostError> {
        self.directory
            .resolve_account(target)
            .ok_or_else(|| VhostError::NoSuchTarget {
                target: target.to_owned(),
            })
    }

    fn check_host(&self, host: &str, assigner: &str) -> Result<(), VhostError> {
        let outcome = if host.is_empty() {
            Err(Rejection::Empty)
        } else {
            self.validator.validate(host, assigner)
        };
        outcome.map_err(|reason| VhostError::InvalidHostname {
            host: host.to_owned(),
            reason,
        })
    }

    fn propagate(&self, account: &AccountName, account_host: Option<&str>) -> usize {
        let sessions = self.sessions.sessions_for(account);
        for session in &sessions {
            let host = DisplayHost::resolve(
                self.store.nickname_vhost(session.nickname()),
                account_host,
            );
            self.sink
                .dispatch(HostUpdate::new(session.id(), account.clone(), host));
        }
        sessions.len()
    }
}
