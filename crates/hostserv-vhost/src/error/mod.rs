//! Domain errors raised by vhost operations.
//!
//! Both variants describe caller-input problems. Neither is transient, so
//! callers report them without retrying.

use thiserror::Error;

use crate::validator::Rejection;

/// Errors arising from vhost assignment and removal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VhostError {
    /// The target did not resolve to a registered account.
    #[error("{target} is not registered")]
    NoSuchTarget {
        /// Name that was looked up.
        target: String,
    },

    /// The hostname policy rejected the candidate vhost.
    #[error("invalid vhost '{host}': {reason}")]
    InvalidHostname {
        /// Candidate that was rejected.
        host: String,
        /// Policy violation reported by the validator.
        #[source]
        reason: Rejection,
    },
}

impl VhostError {
    /// Returns a stable, machine-readable name for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NoSuchTarget { .. } => "no_such_target",
            Self::InvalidHostname { .. } => "invalid_hostname",
        }
    }
}
