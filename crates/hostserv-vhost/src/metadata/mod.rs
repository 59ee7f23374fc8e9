//! Typed vhost metadata attached to accounts and nicknames.
//!
//! Each account carries at most one [`AccountVhost`], which bundles the host
//! with its [`Provenance`]. Because the host, the assignment time, and the
//! assigner live in one value, they are written, overwritten, and removed
//! together. Nickname overrides are a separate slot keyed by nickname.
//!
//! The [`VhostStore`] trait only lets the engine read nickname overrides;
//! writing them belongs to other subsystems, which reach them through
//! [`MemoryVhostStore::set_nickname_vhost`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use time::OffsetDateTime;

use crate::directory::{AccountName, fold_name};

/// Who assigned the current account vhost, and when.
///
/// Values written by the engine always record both fields. Values imported
/// from elsewhere may lack either.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Provenance {
    assigned_at: Option<OffsetDateTime>,
    assigner: Option<String>,
}

impl Provenance {
    /// Builds a fully recorded provenance.
    #[must_use]
    pub fn recorded(assigned_at: OffsetDateTime, assigner: impl Into<String>) -> Self {
        Self {
            assigned_at: Some(assigned_at),
            assigner: Some(assigner.into()),
        }
    }

    /// Builds a provenance from optional parts.
    #[must_use]
    pub const fn from_parts(assigned_at: Option<OffsetDateTime>, assigner: Option<String>) -> Self {
        Self {
            assigned_at,
            assigner,
        }
    }

    /// Returns when the vhost was assigned, if known.
    #[must_use]
    pub const fn assigned_at(&self) -> Option<OffsetDateTime> {
        self.assigned_at
    }

    /// Returns who assigned the vhost, if known.
    #[must_use]
    pub fn assigner(&self) -> Option<&str> {
        self.assigner.as_deref()
    }

    /// Returns `true` when either field is known.
    #[must_use]
    pub const fn is_recorded(&self) -> bool {
        self.assigned_at.is_some() || self.assigner.is_some()
    }
}

/// Active account-level vhost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountVhost {
    host: String,
    provenance: Provenance,
}

impl AccountVhost {
    /// Bundles a host with its provenance.
    #[must_use]
    pub fn new(host: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            host: host.into(),
            provenance,
        }
    }

    /// Returns the assigned host.
    #[must_use]
    pub const fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Returns the assignment provenance.
    #[must_use]
    pub const fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

/// Storage for account vhosts and nickname overrides.
///
/// Every call is a single atomic step against the backing store, and absent
/// values mean "unset".
pub trait VhostStore {
    /// Returns the account's vhost, if any.
    fn account_vhost(&self, account: &AccountName) -> Option<AccountVhost>;

    /// Replaces the account's vhost as one write.
    fn store_account_vhost(&self, account: &AccountName, vhost: AccountVhost);

    /// Removes the account's vhost and returns the previous value.
    fn remove_account_vhost(&self, account: &AccountName) -> Option<AccountVhost>;

    /// Returns the override attached to a nickname, if any.
    fn nickname_vhost(&self, nickname: &str) -> Option<String>;
}

impl<T> VhostStore for &T
where
    T: VhostStore + ?Sized,
{
    fn account_vhost(&self, account: &AccountName) -> Option<AccountVhost> {
        (**self).account_vhost(account)
    }

    fn store_account_vhost(&self, account: &AccountName, vhost: AccountVhost) {
        (**self).store_account_vhost(account, vhost);
    }

    fn remove_account_vhost(&self, account: &AccountName) -> Option<AccountVhost> {
        (**self).remove_account_vhost(account)
    }

    fn nickname_vhost(&self, nickname: &str) -> Option<String> {
        (**self).nickname_vhost(nickname)
    }
}

/// Thread-safe store held entirely in memory.
///
/// # Example
///
/// ```
/// use hostserv_vhost::{AccountName, AccountVhost, MemoryVhostStore, Provenance, VhostStore};
///
/// let store = MemoryVhostStore::new();
/// let alice = AccountName::new("alice");
/// store.store_account_vhost(&alice, AccountVhost::new("a.example", Provenance::default()));
/// assert_eq!(
///     store.account_vhost(&alice).map(|v| v.host().to_owned()),
///     Some("a.example".to_owned()),
/// );
/// ```
#[derive(Debug, Default)]
pub struct MemoryVhostStore {
    accounts: RwLock<HashMap<String, AccountVhost>>,
    nicknames: RwLock<HashMap<String, String>>,
}

impl MemoryVhostStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an override to a nickname, replacing any previous one.
    pub fn set_nickname_vhost(&self, nickname: &str, host: impl Into<String>) {
        self.nicknames
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fold_name(nickname), host.into());
    }

    /// Removes a nickname override and returns the previous value.
    pub fn remove_nickname_vhost(&self, nickname: &str) -> Option<String> {
        self.nicknames
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&fold_name(nickname))
    }

    /// Returns the number of accounts with an active vhost.
    #[must_use]
    pub fn account_vhost_count(&self) -> usize {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl VhostStore for MemoryVhostStore {
    fn account_vhost(&self, account: &AccountName) -> Option<AccountVhost> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&account.key())
            .cloned()
    }

    fn store_account_vhost(&self, account: &AccountName, vhost: AccountVhost) {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.key(), vhost);
    }

    fn remove_account_vhost(&self, account: &AccountName) -> Option<AccountVhost> {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&account.key())
    }

    fn nickname_vhost(&self, nickname: &str) -> Option<String> {
        self.nicknames
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&fold_name(nickname))
            .cloned()
    }
}

#[cfg(test)]
mod tests;
