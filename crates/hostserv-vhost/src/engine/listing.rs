//! Lazy enumeration of active vhosts.

use crate::directory::{AccountName, IdentityDirectory};
use crate::metadata::{AccountVhost, Provenance, VhostStore};
use crate::pattern::HostPattern;

/// Level at which a listed vhost is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchScope {
    /// The vhost belongs to the whole account.
    Account,
    /// The vhost overrides the account's for one nickname.
    Nickname,
}

/// One active vhost reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VhostMatch {
    scope: MatchScope,
    display_name: String,
    host: String,
    provenance: Option<Provenance>,
}

impl VhostMatch {
    fn account(account: &AccountName, vhost: AccountVhost) -> Self {
        let provenance = vhost.provenance().is_recorded().then(|| vhost.provenance().clone());
        Self {
            scope: MatchScope::Account,
            display_name: account.as_str().to_owned(),
            host: vhost.host().to_owned(),
            provenance,
        }
    }

    const fn nickname(nickname: String, host: String) -> Self {
        Self {
            scope: MatchScope::Nickname,
            display_name: nickname,
            host,
            provenance: None,
        }
    }

    /// Returns whether the vhost is account- or nickname-level.
    #[must_use]
    pub const fn scope(&self) -> MatchScope {
        self.scope
    }

    /// Returns the account name or nickname the vhost is attached to.
    #[must_use]
    pub const fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the vhost.
    #[must_use]
    pub const fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Returns the assignment provenance, when recorded.
    #[must_use]
    pub const fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }
}

/// Iterator over the vhosts matching a pattern.
///
/// Walks accounts in directory order. Each account's own vhost comes first,
/// followed by its nicknames' overrides in registration order. Nothing is
/// read until the iterator is advanced, and each match reflects the store at
/// the moment it was produced.
pub struct VhostMatches<'a, D, S> {
    directory: &'a D,
    store: &'a S,
    pattern: HostPattern,
    accounts: Box<dyn Iterator<Item = AccountName> + 'a>,
    nicknames: Option<Box<dyn Iterator<Item = String> + 'a>>,
}

impl<'a, D, S> VhostMatches<'a, D, S>
where
    D: IdentityDirectory,
    S: VhostStore,
{
    pub(crate) fn new(directory: &'a D, store: &'a S, pattern: HostPattern) -> Self {
        Self {
            directory,
            store,
            pattern,
            accounts: directory.accounts(),
            nicknames: None,
        }
    }

    /// Returns the pattern being matched.
    #[must_use]
    pub const fn pattern(&self) -> &HostPattern {
        &self.pattern
    }

    fn next_nickname_match(&mut self) -> Option<VhostMatch> {
        let nicknames = self.nicknames.as_mut()?;
        for nickname in nicknames.by_ref() {
            if let Some(host) = self.store.nickname_vhost(&nickname)
                && self.pattern.is_match(&host)
            {
                return Some(VhostMatch::nickname(nickname, host));
            }
        }
        self.nicknames = None;
        None
    }
}

impl<D, S> Iterator for VhostMatches<'_, D, S>
where
    D: IdentityDirectory,
    S: VhostStore,
{
    type Item = VhostMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(found) = self.next_nickname_match() {
                return Some(found);
            }

            let account = self.accounts.next()?;
            self.nicknames = Some(self.directory.nicknames(&account));
            if let Some(vhost) = self.store.account_vhost(&account)
                && self.pattern.is_match(vhost.host())
            {
                return Some(VhostMatch::account(&account, vhost));
            }
        }
    }
}
