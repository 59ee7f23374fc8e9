//! Audit records for vhost administration.
//!
//! The engine describes what happened with an [`AuditEvent`] and hands it to
//! an [`AuditSink`]. Storage is the sink's business. The default
//! [`StructuredAuditSink`] emits each record as a `tracing` event on the
//! `hostserv::audit` target.

use std::sync::Arc;

use crate::directory::AccountName;

/// Administrative action worth auditing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    /// A vhost was assigned to an account.
    VhostAssigned {
        /// Account receiving the vhost.
        account: AccountName,
        /// Host that was assigned.
        host: String,
        /// Operator that performed the assignment.
        assigner: String,
    },
    /// An account's vhost was removed.
    VhostRemoved {
        /// Account losing its vhost.
        account: AccountName,
        /// Operator that performed the removal.
        assigner: String,
    },
    /// Active vhosts were listed.
    VhostsListed {
        /// Operator that requested the listing.
        actor: String,
        /// Pattern the listing was filtered by.
        pattern: String,
        /// Number of matches reported.
        matches: usize,
    },
}

impl AuditEvent {
    /// Returns the log category of the event.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::VhostAssigned { .. } => "VHOST:ASSIGN",
            Self::VhostRemoved { .. } => "VHOST:REMOVE",
            Self::VhostsListed { .. } => "LISTVHOST",
        }
    }

    /// Returns the operator responsible for the event.
    #[must_use]
    pub const fn actor(&self) -> &str {
        match self {
            Self::VhostAssigned { assigner, .. } | Self::VhostRemoved { assigner, .. } => {
                assigner.as_str()
            }
            Self::VhostsListed { actor, .. } => actor.as_str(),
        }
    }
}

/// Receives audit records.
pub trait AuditSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &AuditEvent);
}

impl<T> AuditSink for Arc<T>
where
    T: AuditSink + ?Sized,
{
    fn record(&self, event: &AuditEvent) {
        (**self).record(event);
    }
}

/// Sink that records events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredAuditSink;

impl StructuredAuditSink {
    /// Builds a new sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditSink for StructuredAuditSink {
    fn record(&self, event: &AuditEvent) {
        match event {
            AuditEvent::VhostAssigned {
                account,
                host,
                assigner,
            } => tracing::info!(
                target: "hostserv::audit",
                event = event.kind(),
                account = %account,
                host = %host,
                actor = %assigner,
                "vhost assigned"
            ),
            AuditEvent::VhostRemoved { account, assigner } => tracing::info!(
                target: "hostserv::audit",
                event = event.kind(),
                account = %account,
                actor = %assigner,
                "vhost removed"
            ),
            AuditEvent::VhostsListed {
                actor,
                pattern,
                matches,
            } => tracing::info!(
                target: "hostserv::audit",
                event = event.kind(),
                actor = %actor,
                pattern = %pattern,
                matches = *matches,
                "vhosts listed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn assigned() -> AuditEvent {
        AuditEvent::VhostAssigned {
            account: AccountName::new("alice"),
            host: "a.example".into(),
            assigner: "oper".into(),
        }
    }

    #[rstest]
    #[case::assign(assigned(), "VHOST:ASSIGN", "oper")]
    #[case::remove(
        AuditEvent::VhostRemoved { account: AccountName::new("alice"), assigner: "<service>".into() },
        "VHOST:REMOVE",
        "<service>"
    )]
    #[case::list(
        AuditEvent::VhostsListed { actor: "auspex".into(), pattern: "*".into(), matches: 3 },
        "LISTVHOST",
        "auspex"
    )]
    fn kind_and_actor(#[case] event: AuditEvent, #[case] kind: &str, #[case] actor: &str) {
        assert_eq!(event.kind(), kind);
        assert_eq!(event.actor(), actor);
    }

    #[test]
    fn structured_sink_accepts_every_event() {
        let sink = Arc::new(StructuredAuditSink::new());
        sink.record(&assigned());
        sink.record(&AuditEvent::VhostsListed {
            actor: "auspex".into(),
            pattern: "*".into(),
            matches: 0,
        });
    }
}
