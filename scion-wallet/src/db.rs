//! The on-disk wallet database and the shared-handle registry.
//!
//! Wallet records live in one `sled` tree per record tag: certificate
//! entries and transaction entries are distinct key spaces, both keyed by
//! the 32-byte ledger id. Record values carry a one-byte format version in
//! front of the entry codec so future formats are detected instead of
//! misparsed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use scion_chain::{BitcoinDeserialize, BitcoinSerialize, SerializationError};

use crate::{
    entry::WalletEntry,
    error::{DbStatus, WalletError},
};

/// The record format version written in front of every wallet record.
pub const RECORD_FORMAT_VERSION: u8 = 1;

const CERT_ENTRIES_TREE: &[u8] = b"wallet_cert_entries";
const TX_ENTRIES_TREE: &[u8] = b"wallet_tx_entries";

/// The registry of open wallet database files.
///
/// Multiple logical [`WalletDb`] handles may attach to the same underlying
/// file: the registry tracks a use count per path and retains the file
/// object even after the count reaches zero. Only an explicit
/// [`close_db`](DbEnv::close_db) drops the retained object, which guards
/// against double-open and premature teardown.
#[derive(Default)]
pub struct DbEnv {
    inner: Mutex<EnvInner>,
}

#[derive(Default)]
struct EnvInner {
    dbs: HashMap<PathBuf, Option<sled::Db>>,
    use_counts: HashMap<PathBuf, usize>,
}

impl DbEnv {
    pub fn new() -> Arc<DbEnv> {
        Arc::new(DbEnv::default())
    }

    /// Open (or attach to) the wallet database at `path`.
    pub fn open(self: &Arc<Self>, path: &Path) -> Result<WalletDb, WalletError> {
        let mut inner = self.inner.lock().expect("db registry lock poisoned");
        let db = match inner.dbs.get(path) {
            Some(Some(db)) => db.clone(),
            _ => {
                let db = sled::Config::new().path(path).open()?;
                debug!(path = %path.display(), "opened wallet database");
                inner.dbs.insert(path.to_owned(), Some(db.clone()));
                db
            }
        };
        *inner.use_counts.entry(path.to_owned()).or_insert(0) += 1;

        let cert_entries = db.open_tree(CERT_ENTRIES_TREE)?;
        let tx_entries = db.open_tree(TX_ENTRIES_TREE)?;
        Ok(WalletDb {
            env: Arc::clone(self),
            path: path.to_owned(),
            db,
            cert_entries,
            tx_entries,
        })
    }

    /// The number of logical handles currently attached to `path`.
    pub fn use_count(&self, path: &Path) -> usize {
        let inner = self.inner.lock().expect("db registry lock poisoned");
        inner.use_counts.get(path).copied().unwrap_or(0)
    }

    /// Whether the registry still retains the file object for `path`.
    pub fn is_open(&self, path: &Path) -> bool {
        let inner = self.inner.lock().expect("db registry lock poisoned");
        matches!(inner.dbs.get(path), Some(Some(_)))
    }

    /// Whether the registry has ever opened `path`, even if the file object
    /// was since closed.
    pub fn is_registered(&self, path: &Path) -> bool {
        let inner = self.inner.lock().expect("db registry lock poisoned");
        inner.dbs.contains_key(path)
    }

    /// Drop the retained file object for `path`.
    ///
    /// The registry keeps the path registered so the use-count bookkeeping
    /// survives; callers must ensure no handle is still attached.
    pub fn close_db(&self, path: &Path) {
        let mut inner = self.inner.lock().expect("db registry lock poisoned");
        if let Some(slot) = inner.dbs.get_mut(path) {
            *slot = None;
        }
    }

    fn release(&self, path: &Path) {
        let mut inner = self.inner.lock().expect("db registry lock poisoned");
        if let Some(count) = inner.use_counts.get_mut(path) {
            *count = count.saturating_sub(1);
        }
    }
}

/// A logical handle on a wallet database file.
pub struct WalletDb {
    env: Arc<DbEnv>,
    path: PathBuf,
    db: sled::Db,
    cert_entries: sled::Tree,
    tx_entries: sled::Tree,
}

impl Drop for WalletDb {
    fn drop(&mut self) {
        self.env.release(&self.path);
    }
}

impl WalletDb {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(entry: &WalletEntry) -> Result<Vec<u8>, WalletError> {
        let mut value = vec![RECORD_FORMAT_VERSION];
        entry
            .bitcoin_serialize(&mut value)
            .map_err(SerializationError::Io)?;
        Ok(value)
    }

    fn decode(key: &[u8], value: &[u8]) -> Result<WalletEntry, WalletError> {
        match value.split_first() {
            Some((&version, record)) if version <= RECORD_FORMAT_VERSION => {
                let entry = WalletEntry::bitcoin_deserialize(record)?;
                if key != entry.id().0 {
                    return Err(WalletError::Serialization(SerializationError::Parse(
                        "wallet record key does not match the entry id",
                    )));
                }
                Ok(entry)
            }
            Some((&version, _)) => Err(WalletError::TooNew(version)),
            None => Err(WalletError::Serialization(SerializationError::Parse(
                "empty wallet record",
            ))),
        }
    }

    fn tree_for(&self, entry: &WalletEntry) -> &sled::Tree {
        if entry.payload.is_certificate() {
            &self.cert_entries
        } else {
            &self.tx_entries
        }
    }

    /// Durably write `entry` under its ledger id.
    pub fn write_entry(&self, entry: &WalletEntry) -> Result<(), WalletError> {
        let value = Self::encode(entry)?;
        let tree = self.tree_for(entry);
        tree.insert(&entry.id().0, value)?;
        tree.flush()?;
        Ok(())
    }

    /// Read every stored entry.
    ///
    /// A record that fails to parse is skipped and logged rather than
    /// aborting the whole load; the returned status reports the worst
    /// problem encountered.
    pub fn read_all(&self) -> Result<(Vec<WalletEntry>, DbStatus), WalletError> {
        let mut entries = Vec::new();
        let mut status = DbStatus::Ok;
        for tree in &[&self.cert_entries, &self.tx_entries] {
            for item in tree.iter() {
                let (key, value) = item?;
                match Self::decode(&key, &value) {
                    Ok(entry) => entries.push(entry),
                    Err(WalletError::TooNew(version)) => {
                        warn!(version, "skipping wallet record from a future format");
                        if status == DbStatus::Ok {
                            status = DbStatus::TooNew;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "skipping corrupt wallet record");
                        status = DbStatus::Corrupt;
                    }
                }
            }
        }
        Ok((entries, status))
    }

    /// Delete every stored entry, returning the disk to its empty state.
    pub fn clear(&self) -> Result<(), WalletError> {
        self.cert_entries.clear()?;
        self.tx_entries.clear()?;
        self.db.flush()?;
        Ok(())
    }

    /// Whether the database holds no wallet entries.
    pub fn is_empty(&self) -> bool {
        self.cert_entries.is_empty() && self.tx_entries.is_empty()
    }
}
