//! Live propagation of displayed hosts to connected sessions.
//!
//! The engine asks a [`SessionRegistry`] for a snapshot of the sessions bound
//! to an account, works out each session's new [`DisplayHost`], and sends a
//! [`HostUpdate`] message through a [`PropagationSink`]. Delivery is fire and
//! forget: a session that vanished before its update arrives is skipped, and
//! the stored metadata remains the source of truth.
//!
//! [`SessionTable`] is an in-memory session manager that plays both roles of
//! registry and message consumer.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::mpsc::{Receiver, SendError, Sender};
use std::sync::{PoisonError, RwLock};

use crate::directory::AccountName;

/// Identifier of a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Host a session should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayHost {
    /// Show the given vhost.
    Cloak(String),
    /// Show the host derived from the connection.
    Natural,
}

impl DisplayHost {
    /// Applies the display precedence: nickname override, then account
    /// vhost, then the natural host.
    ///
    /// # Example
    ///
    /// ```
    /// use hostserv_vhost::DisplayHost;
    ///
    /// let host = DisplayHost::resolve(Some("b.example".into()), Some("a.example"));
    /// assert_eq!(host, DisplayHost::Cloak("b.example".into()));
    /// assert_eq!(DisplayHost::resolve(None, None), DisplayHost::Natural);
    /// ```
    #[must_use]
    pub fn resolve(nickname_override: Option<String>, account_vhost: Option<&str>) -> Self {
        match (nickname_override, account_vhost) {
            (Some(host), _) => Self::Cloak(host),
            (None, Some(host)) => Self::Cloak(host.to_owned()),
            (None, None) => Self::Natural,
        }
    }

    /// Returns the vhost when one applies.
    #[must_use]
    pub fn cloak(&self) -> Option<&str> {
        match self {
            Self::Cloak(host) => Some(host.as_str()),
            Self::Natural => None,
        }
    }
}

/// Snapshot entry describing one session of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    id: SessionId,
    nickname: String,
}

impl SessionHandle {
    /// Describes a session using `nickname`.
    #[must_use]
    pub fn new(id: SessionId, nickname: impl Into<String>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the nickname in use.
    #[must_use]
    pub const fn nickname(&self) -> &str {
        self.nickname.as_str()
    }
}

/// Message asking the session manager to change a displayed host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUpdate {
    session: SessionId,
    account: AccountName,
    host: DisplayHost,
}

impl HostUpdate {
    /// Builds an update for one session.
    #[must_use]
    pub const fn new(session: SessionId, account: AccountName, host: DisplayHost) -> Self {
        Self {
            session,
            account,
            host,
        }
    }

    /// Returns the target session.
    #[must_use]
    pub const fn session(&self) -> SessionId {
        self.session
    }

    /// Returns the account the session was bound to when the update was made.
    #[must_use]
    pub const fn account(&self) -> &AccountName {
        &self.account
    }

    /// Returns the host to display.
    #[must_use]
    pub const fn host(&self) -> &DisplayHost {
        &self.host
    }
}

/// Enumerates the live sessions of an account.
pub trait SessionRegistry: Send + Sync {
    /// Returns a point-in-time snapshot of the account's sessions.
    fn sessions_for(&self, account: &AccountName) -> Vec<SessionHandle>;
}

/// Delivers [`HostUpdate`] messages without waiting for a reply.
pub trait PropagationSink: Send + Sync {
    /// Hands one update to the session manager.
    fn dispatch(&self, update: HostUpdate);
}

/// Registry with no sessions, for engines running without live users.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSessions;

impl SessionRegistry for NoSessions {
    fn sessions_for(&self, _account: &AccountName) -> Vec<SessionHandle> {
        Vec::new()
    }
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl PropagationSink for DiscardSink {
    fn dispatch(&self, _update: HostUpdate) {}
}

/// Sink forwarding updates over an `mpsc` channel.
///
/// A closed channel is tolerated: the update is dropped and logged.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<HostUpdate>,
}

impl ChannelSink {
    /// Wraps the sending half of a channel.
    #[must_use]
    pub const fn new(sender: Sender<HostUpdate>) -> Self {
        Self { sender }
    }
}

impl PropagationSink for ChannelSink {
    fn dispatch(&self, update: HostUpdate) {
        if let Err(SendError(dropped)) = self.sender.send(update) {
            tracing::debug!(
                target: "hostserv::propagation",
                event = "update_dropped",
                session = %dropped.session(),
                account = %dropped.account(),
                "session manager is gone; dropping host update"
            );
        }
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    account: AccountName,
    nickname: String,
    natural_host: String,
    display: DisplayHost,
}

#[derive(Debug, Default)]
struct SessionState {
    next_id: u64,
    sessions: BTreeMap<SessionId, SessionEntry>,
}

/// Parameters describing a newly connected session.
#[derive(Debug, Clone)]
pub struct SessionConnect {
    account: AccountName,
    nickname: String,
    natural_host: String,
    display: DisplayHost,
}

impl SessionConnect {
    /// Describes a session for `account` using `nickname`, connecting from
    /// `natural_host` and initially displaying `display`.
    #[must_use]
    pub fn new(
        account: AccountName,
        nickname: impl Into<String>,
        natural_host: impl Into<String>,
        display: DisplayHost,
    ) -> Self {
        Self {
            account,
            nickname: nickname.into(),
            natural_host: natural_host.into(),
            display,
        }
    }
}

/// In-memory session manager.
///
/// Sessions enumerate in connection order. Updates for unknown sessions, or
/// for sessions that have since been rebound to another account, are ignored.
#[derive(Debug, Default)]
pub struct SessionTable {
    state: RwLock<SessionState>,
}

impl SessionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connected session and returns its identifier.
    pub fn connect(&self, session: SessionConnect) -> SessionId {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.next_id += 1;
        let id = SessionId::new(state.next_id);
        state.sessions.insert(
            id,
            SessionEntry {
                account: session.account,
                nickname: session.nickname,
                natural_host: session.natural_host,
                display: session.display,
            },
        );
        id
    }

    /// Removes a session. Returns `false` when it was already gone.
    pub fn disconnect(&self, id: SessionId) -> bool {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .sessions
            .remove(&id)
            .is_some()
    }

    /// Returns the host the session currently displays.
    #[must_use]
    pub fn displayed_host(&self, id: SessionId) -> Option<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.sessions.get(&id).map(|entry| {
            entry
                .display
                .cloak()
                .map_or_else(|| entry.natural_host.clone(), ToOwned::to_owned)
        })
    }

    /// Applies one update. Returns `false` when the update was skipped.
    pub fn apply(&self, update: &HostUpdate) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = state.sessions.get_mut(&update.session()) else {
            return false;
        };
        if entry.account.key() != update.account().key() {
            return false;
        }
        entry.display = update.host().clone();
        tracing::trace!(
            target: "hostserv::propagation",
            event = "host_changed",
            session = %update.session(),
            nickname = %entry.nickname,
            "displayed host changed"
        );
        true
    }

    /// Applies every update waiting on `receiver` and returns how many took
    /// effect.
    pub fn drain(&self, receiver: &Receiver<HostUpdate>) -> usize {
        receiver
            .try_iter()
            .filter(|update| self.apply(update))
            .count()
    }

    /// Returns the number of connected sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sessions
            .len()
    }

    /// Returns `true` when no sessions are connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionRegistry for SessionTable {
    fn sessions_for(&self, account: &AccountName) -> Vec<SessionHandle> {
        let key = account.key();
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .sessions
            .iter()
            .filter(|(_, entry)| entry.account.key() == key)
            .map(|(id, entry)| SessionHandle::new(*id, entry.nickname.clone()))
            .collect()
    }
}
