//! Hostname policy applied to candidate vhosts.
//!
//! The engine consults a [`HostnameValidator`] before writing anything. The
//! validator owns the wording of each rejection so operators see why a vhost
//! was refused. Values already stored are never re-validated, so tightening
//! the policy leaves earlier assignments in place.

use thiserror::Error;

/// Reasons a candidate vhost may be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// No host was supplied.
    #[error("vhost must not be empty")]
    Empty,

    /// The host exceeds the configured length limit.
    #[error("vhost is {length} characters long; the limit is {max}")]
    TooLong {
        /// Length of the candidate in characters.
        length: usize,
        /// Configured limit.
        max: usize,
    },

    /// The host contains a character that cannot appear in a hostname.
    #[error("vhost contains the invalid character {character:?}")]
    InvalidCharacter {
        /// First offending character.
        character: char,
    },

    /// The host starts with `:`, which would corrupt protocol framing.
    #[error("vhost must not begin with ':'")]
    LeadingColon,

    /// The host ends with `/`.
    #[error("vhost must not end with '/'")]
    TrailingSlash,

    /// The host has no `.`, `:`, or `/` and could pass for a nickname.
    #[error("vhost must contain a '.', ':' or '/'")]
    MissingSeparator,

    /// A network-specific policy refused the host.
    #[error("{message}")]
    Policy {
        /// Explanation shown to the operator.
        message: String,
    },
}

/// Accepts or rejects candidate vhosts according to network policy.
pub trait HostnameValidator: Send + Sync {
    /// Checks a candidate host requested by `operator`.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] describing the first policy violation.
    fn validate(&self, host: &str, operator: &str) -> Result<(), Rejection>;
}

/// Default hostname policy.
///
/// Accepts ASCII letters, digits, `.`, `-`, `:` and `/`, up to a configurable
/// length, and requires at least one separator.
///
/// # Example
///
/// ```
/// use hostserv_vhost::{HostnameValidator, PolicyValidator, Rejection};
///
/// let policy = PolicyValidator::new(63);
/// assert!(policy.validate("staff.example.net", "oper").is_ok());
/// assert_eq!(policy.validate("nodots", "oper"), Err(Rejection::MissingSeparator));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyValidator {
    max_length: usize,
}

impl PolicyValidator {
    /// Longest host accepted when no limit is configured.
    pub const DEFAULT_MAX_LENGTH: usize = 63;

    /// Builds a policy with the given length limit.
    #[must_use]
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Returns the configured length limit.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for PolicyValidator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LENGTH)
    }
}

const fn is_host_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '.' | '-' | ':' | '/')
}

impl HostnameValidator for PolicyValidator {
    fn validate(&self, host: &str, _operator: &str) -> Result<(), Rejection> {
        if host.is_empty() {
            return Err(Rejection::Empty);
        }

        let length = host.chars().count();
        if length > self.max_length {
            return Err(Rejection::TooLong {
                length,
                max: self.max_length,
            });
        }

        if let Some(character) = host.chars().find(|c| !is_host_character(*c)) {
            return Err(Rejection::InvalidCharacter { character });
        }

        if host.starts_with(':') {
            return Err(Rejection::LeadingColon);
        }

        if host.ends_with('/') {
            return Err(Rejection::TrailingSlash);
        }

        if !host.contains(['.', ':', '/']) {
            return Err(Rejection::MissingSeparator);
        }

        Ok(())
    }
}
