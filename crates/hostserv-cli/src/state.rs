//! JSON snapshot of the directory and its vhosts.
//!
//! The CLI is short-lived, so the accounts, their nicknames, their vhosts,
//! and the nickname overrides are read from a JSON document before each
//! command and written back after a successful change. A missing document is
//! an empty directory. Writes go through a temporary file that is persisted
//! over the target so readers never observe a partial document.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use hostserv_vhost::{
    AccountName, AccountVhost, DirectoryError, MemoryDirectory, MemoryVhostStore, Provenance,
    VhostStore,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Errors raised while reading or writing the snapshot.
#[derive(Debug, Error)]
pub enum StateError {
    /// The snapshot exists but could not be read.
    #[error("failed to read state from {path}: {source}")]
    Read {
        /// Snapshot location.
        path: String,
        /// Underlying IO failure.
        source: io::Error,
    },
    /// The snapshot is not valid JSON of the expected shape.
    #[error("failed to parse state in {path}: {source}")]
    Parse {
        /// Snapshot location.
        path: String,
        /// Underlying parse failure.
        source: serde_json::Error,
    },
    /// The snapshot describes a directory that cannot exist.
    #[error("inconsistent directory in state: {0}")]
    Directory(#[from] DirectoryError),
    /// A stored assignment time is out of range.
    #[error("invalid assignment time for account {account}: {source}")]
    Timestamp {
        /// Account carrying the bad timestamp.
        account: String,
        /// Underlying range failure.
        source: time::error::ComponentRange,
    },
    /// The snapshot could not be serialised.
    #[error("failed to serialise state: {0}")]
    Serialise(serde_json::Error),
    /// The snapshot could not be written.
    #[error("failed to write state to {path}: {source}")]
    Write {
        /// Snapshot location.
        path: String,
        /// Underlying IO failure.
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct VhostRecord {
    host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assigned_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assigner: Option<String>,
}

impl From<&AccountVhost> for VhostRecord {
    fn from(vhost: &AccountVhost) -> Self {
        Self {
            host: vhost.host().to_owned(),
            assigned_at: vhost
                .provenance()
                .assigned_at()
                .map(OffsetDateTime::unix_timestamp),
            assigner: vhost.provenance().assigner().map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct AccountRecord {
    name: String,
    #[serde(default)]
    nicknames: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vhost: Option<VhostRecord>,
}

/// Serialisable image of the directory and its vhosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    accounts: Vec<AccountRecord>,
    #[serde(default)]
    nickname_vhosts: BTreeMap<String, String>,
}

impl Snapshot {
    /// Reads the snapshot at `path`, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Read`] or [`StateError::Parse`] when the file
    /// exists but cannot be used.
    pub fn load(path: &Utf8Path) -> Result<Self, StateError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(
                    target: "hostserv::state",
                    path = %path,
                    "no state file; starting with an empty directory"
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: path.to_string(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| StateError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Rebuilds the in-memory directory and vhost store.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Directory`] for duplicate names and
    /// [`StateError::Timestamp`] for unrepresentable assignment times.
    pub fn restore(&self) -> Result<(MemoryDirectory, MemoryVhostStore), StateError> {
        let mut directory = MemoryDirectory::new();
        let store = MemoryVhostStore::new();

        for record in &self.accounts {
            let account = directory.register_account(&record.name)?;
            for nickname in &record.nicknames {
                directory.register_nickname(&record.name, nickname)?;
            }
            if let Some(vhost) = &record.vhost {
                let assigned_at = vhost
                    .assigned_at
                    .map(OffsetDateTime::from_unix_timestamp)
                    .transpose()
                    .map_err(|source| StateError::Timestamp {
                        account: record.name.clone(),
                        source,
                    })?;
                let provenance = Provenance::from_parts(assigned_at, vhost.assigner.clone());
                store.store_account_vhost(&account, AccountVhost::new(&vhost.host, provenance));
            }
        }
        for (nickname, host) in &self.nickname_vhosts {
            store.set_nickname_vhost(nickname, host.as_str());
        }

        Ok((directory, store))
    }

    /// Replaces every account's vhost with the value held by `store`.
    pub fn capture_vhosts(&mut self, store: &impl VhostStore) {
        for record in &mut self.accounts {
            record.vhost = store
                .account_vhost(&AccountName::new(record.name.as_str()))
                .as_ref()
                .map(VhostRecord::from);
        }
    }

    /// Writes the snapshot to `path` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Serialise`] or [`StateError::Write`].
    pub fn save(&self, path: &Utf8Path) -> Result<(), StateError> {
        let mut contents = serde_json::to_vec_pretty(self).map_err(StateError::Serialise)?;
        contents.push(b'\n');

        let write_error = |source: io::Error| StateError::Write {
            path: path.to_string(),
            source,
        };
        let directory = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(directory).map_err(write_error)?;
        file.write_all(&contents).map_err(write_error)?;
        file.as_file().sync_all().map_err(write_error)?;
        file.persist(path).map_err(|error| write_error(error.error))?;
        Ok(())
    }
}
