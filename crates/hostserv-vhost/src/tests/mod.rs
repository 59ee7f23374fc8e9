//! Shared fixtures for engine unit and behaviour tests.

mod behaviour;

use std::sync::{Mutex, PoisonError};

use crate::audit::{AuditEvent, AuditSink};
use crate::directory::MemoryDirectory;

/// Audit sink that keeps every record in memory.
#[derive(Debug, Default)]
pub(crate) struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub(crate) fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Directory with `alice` (nicknames `alice`, `alice2`) and `bob`
/// (nickname `bob`).
pub(crate) fn populated_directory() -> MemoryDirectory {
    let mut directory = MemoryDirectory::new();
    directory.register_account("alice").expect("register alice");
    directory
        .register_nickname("alice", "alice")
        .expect("alice primary nick");
    directory
        .register_nickname("alice", "alice2")
        .expect("alice2");
    directory.register_account("bob").expect("register bob");
    directory
        .register_nickname("bob", "bob")
        .expect("bob primary nick");
    directory
}
