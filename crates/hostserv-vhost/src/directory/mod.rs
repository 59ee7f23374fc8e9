//! Identity directory abstraction and its in-memory implementation.
//!
//! The engine never reaches for a process-wide account table. It is handed an
//! [`IdentityDirectory`] that resolves target names to accounts and
//! enumerates accounts and their nicknames in a stable order, which keeps the
//! engine testable against [`MemoryDirectory`].

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Folds a name for case-insensitive comparison.
///
/// Account names and nicknames compare without regard to ASCII case.
#[must_use]
pub fn fold_name(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Registered account name, kept with the spelling used at registration.
///
/// # Example
///
/// ```
/// use hostserv_vhost::AccountName;
///
/// let name = AccountName::new("Alice");
/// assert_eq!(name.as_str(), "Alice");
/// assert_eq!(name.key(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountName(String);

impl AccountName {
    /// Wraps a registered account name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as registered.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the folded form used as a lookup key.
    #[must_use]
    pub fn key(&self) -> String {
        fold_name(&self.0)
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of registered accounts and their nicknames.
pub trait IdentityDirectory {
    /// Resolves a target name to its owning account.
    ///
    /// Implementations accept the account name itself or any nickname
    /// registered to the account.
    fn resolve_account(&self, name: &str) -> Option<AccountName>;

    /// Enumerates every account in a stable order.
    fn accounts(&self) -> Box<dyn Iterator<Item = AccountName> + '_>;

    /// Enumerates the nicknames of an account in registration order.
    ///
    /// Unknown accounts yield an empty iterator.
    fn nicknames(&self, account: &AccountName) -> Box<dyn Iterator<Item = String> + '_>;
}

impl<T> IdentityDirectory for &T
where
    T: IdentityDirectory + ?Sized,
{
    fn resolve_account(&self, name: &str) -> Option<AccountName> {
        (**self).resolve_account(name)
    }

    fn accounts(&self) -> Box<dyn Iterator<Item = AccountName> + '_> {
        (**self).accounts()
    }

    fn nicknames(&self, account: &AccountName) -> Box<dyn Iterator<Item = String> + '_> {
        (**self).nicknames(account)
    }
}

/// Errors raised while populating a [`MemoryDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The name is already taken by an account or a nickname.
    #[error("'{name}' is already registered")]
    AlreadyRegistered {
        /// Conflicting name.
        name: String,
    },

    /// The account a nickname was registered against does not exist.
    #[error("account '{name}' does not exist")]
    UnknownAccount {
        /// Account that was looked up.
        name: String,
    },

    /// The supplied name was blank.
    #[error("names must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone)]
struct AccountRecord {
    name: AccountName,
    nicknames: Vec<String>,
}

/// Directory held entirely in memory.
///
/// Accounts enumerate in registration order. Account names and nicknames
/// share one case-insensitive namespace, as they do on the network.
///
/// # Example
///
/// ```
/// use hostserv_vhost::{IdentityDirectory, MemoryDirectory};
///
/// let mut directory = MemoryDirectory::new();
/// directory.register_account("alice").expect("register alice");
/// directory.register_nickname("alice", "alice2").expect("register nick");
///
/// let account = directory.resolve_account("ALICE2").expect("resolves");
/// assert_eq!(account.as_str(), "alice");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    accounts: Vec<AccountRecord>,
    owners: HashMap<String, usize>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EmptyName`] for a blank name and
    /// [`DirectoryError::AlreadyRegistered`] when the name is taken.
    pub fn register_account(&mut self, name: &str) -> Result<AccountName, DirectoryError> {
        let key = self.claim(name)?;
        let account = AccountName::new(name);
        self.owners.insert(key, self.accounts.len());
        self.accounts.push(AccountRecord {
            name: account.clone(),
            nicknames: Vec::new(),
        });
        Ok(account)
    }

    /// Registers a nickname under an existing account.
    ///
    /// A nickname spelled like its own account (for example the primary
    /// nickname of `alice` being `alice`) is accepted without claiming the
    /// name twice.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UnknownAccount`] when the account does not
    /// exist, or the errors of [`Self::register_account`] for the nickname.
    pub fn register_nickname(&mut self, account: &str, nickname: &str) -> Result<(), DirectoryError> {
        let index = self
            .account_index(account)
            .ok_or_else(|| DirectoryError::UnknownAccount {
                name: account.to_owned(),
            })?;
        let folded = fold_name(nickname);
        let Some(record) = self.accounts.get(index) else {
            return Err(DirectoryError::UnknownAccount {
                name: account.to_owned(),
            });
        };
        if record.nicknames.iter().any(|nick| fold_name(nick) == folded) {
            return Err(DirectoryError::AlreadyRegistered {
                name: nickname.to_owned(),
            });
        }
        if record.name.key() != folded {
            let key = self.claim(nickname)?;
            self.owners.insert(key, index);
        }
        if let Some(record) = self.accounts.get_mut(index) {
            record.nicknames.push(nickname.to_owned());
        }
        Ok(())
    }

    /// Returns the number of registered accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns `true` when no accounts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn claim(&self, name: &str) -> Result<String, DirectoryError> {
        if name.trim().is_empty() {
            return Err(DirectoryError::EmptyName);
        }
        let key = fold_name(name);
        if self.owners.contains_key(&key) {
            return Err(DirectoryError::AlreadyRegistered {
                name: name.to_owned(),
            });
        }
        Ok(key)
    }

    fn account_index(&self, account: &str) -> Option<usize> {
        let key = fold_name(account);
        self.owners
            .get(&key)
            .copied()
            .filter(|index| self.accounts.get(*index).is_some_and(|r| r.name.key() == key))
    }

    fn record(&self, account: &AccountName) -> Option<&AccountRecord> {
        self.account_index(account.as_str())
            .and_then(|index| self.accounts.get(index))
    }
}

impl IdentityDirectory for MemoryDirectory {
    fn resolve_account(&self, name: &str) -> Option<AccountName> {
        self.owners
            .get(&fold_name(name))
            .and_then(|index| self.accounts.get(*index))
            .map(|record| record.name.clone())
    }

    fn accounts(&self) -> Box<dyn Iterator<Item = AccountName> + '_> {
        Box::new(self.accounts.iter().map(|record| record.name.clone()))
    }

    fn nicknames(&self, account: &AccountName) -> Box<dyn Iterator<Item = String> + '_> {
        match self.record(account) {
            Some(record) => Box::new(record.nicknames.iter().cloned()),
            None => Box::new(std::iter::empty()),
        }
    }
}
