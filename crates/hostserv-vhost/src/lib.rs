//! Vhost assignment and audit engine for HostServ.
//!
//! The `hostserv-vhost` crate lets network operators give an account a
//! virtual host (a "vhost") that replaces the real host every one of the
//! account's sessions displays, remove it again, and list the vhosts in use.
//!
//! # Architecture
//!
//! [`VhostEngine`] coordinates a set of injected collaborators:
//!
//! - an [`IdentityDirectory`] resolving names to accounts and enumerating
//!   accounts with their nicknames,
//! - a [`VhostStore`] holding the typed [`AccountVhost`] of each account and
//!   read-only nickname overrides,
//! - a [`HostnameValidator`] enforcing the hostname policy,
//! - a [`SessionRegistry`] and [`PropagationSink`] that carry [`HostUpdate`]
//!   messages to live sessions,
//! - an [`AuditSink`] receiving one [`AuditEvent`] per successful change,
//! - a [`Clock`] stamping assignments.
//!
//! A session displays, in order of precedence, the override of its nickname,
//! the vhost of its account, or its natural host.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::mpsc;
//!
//! use hostserv_vhost::{
//!     AccountName, ChannelSink, MemoryDirectory, MemoryVhostStore, SessionConnect,
//!     SessionTable, VhostEngine,
//! };
//!
//! let mut directory = MemoryDirectory::new();
//! directory.register_account("alice").expect("register alice");
//!
//! let sessions = Arc::new(SessionTable::new());
//! let (sender, updates) = mpsc::channel();
//! let engine = VhostEngine::new(directory, MemoryVhostStore::new())
//!     .with_sessions(sessions.clone(), Arc::new(ChannelSink::new(sender)));
//!
//! let alice = AccountName::new("alice");
//! let session = sessions.connect(SessionConnect::new(
//!     alice.clone(),
//!     "alice",
//!     "host-1.isp.example",
//!     engine.display_host(&alice, "alice"),
//! ));
//!
//! engine
//!     .assign_vhost("alice", "staff.example.net", "oper")
//!     .expect("assignment succeeds");
//! sessions.drain(&updates);
//! assert_eq!(sessions.displayed_host(session).as_deref(), Some("staff.example.net"));
//! ```

pub mod audit;
pub mod clock;
pub mod directory;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod pattern;
pub mod propagation;
pub mod validator;

#[cfg(test)]
mod tests;

pub use self::audit::{AuditEvent, AuditSink, StructuredAuditSink};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::directory::{AccountName, DirectoryError, IdentityDirectory, MemoryDirectory};
pub use self::engine::{
    Assignment, Clearance, MatchScope, VhostEngine, VhostMatch, VhostMatches,
};
pub use self::error::VhostError;
pub use self::metadata::{AccountVhost, MemoryVhostStore, Provenance, VhostStore};
pub use self::pattern::{HostPattern, MATCH_ALL};
pub use self::propagation::{
    ChannelSink, DiscardSink, DisplayHost, HostUpdate, NoSessions, PropagationSink,
    SessionConnect, SessionHandle, SessionId, SessionRegistry, SessionTable,
};
pub use self::validator::{HostnameValidator, PolicyValidator, Rejection};
