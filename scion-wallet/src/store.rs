//! The wallet store: the ledger-id → entry map and its sync signals.
//!
//! Lock order: a chain-view snapshot is taken by the caller first, then the
//! wallet map, then the database handle. Credit evaluation holds only the
//! wallet map and performs no I/O.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, trace, warn};

use scion_chain::{
    amount::{Amount, NonNegative},
    block::Block,
    certificate::Certificate,
    transaction::{self, Transaction},
    transparent,
};

use crate::{
    chain_view::ChainView,
    db::WalletDb,
    entry::{TxOrCert, WalletEntry},
    error::{DbStatus, WalletError},
    keystore::{KeyOwnership, KeyStore},
    maturity::{CreditPolicy, MaturityEvaluator, OutputMaturity},
};

/// The wallet's certificate and transaction store.
pub struct Wallet {
    inner: Mutex<Inner>,
    db: WalletDb,
    policy: CreditPolicy,
}

struct Inner {
    entries: HashMap<transaction::Hash, WalletEntry>,
    keys: KeyStore,
}

impl Wallet {
    pub fn new(db: WalletDb) -> Wallet {
        Wallet::with_policy(db, CreditPolicy::default())
    }

    pub fn with_policy(db: WalletDb, policy: CreditPolicy) -> Wallet {
        Wallet {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                keys: KeyStore::new(),
            }),
            db,
            policy,
        }
    }

    /// Register a spendable pay-to-pubkey-hash destination.
    pub fn add_pub_key_hash(&self, pub_key_hash: [u8; 20]) {
        self.lock_inner().keys.add_pub_key_hash(pub_key_hash);
    }

    /// Register a lock script with an explicit ownership class.
    pub fn add_script(&self, script: transparent::Script, ownership: KeyOwnership) {
        self.lock_inner().keys.add_script(script, ownership);
    }

    /// A snapshot of the entry stored under `id`.
    pub fn get(&self, id: transaction::Hash) -> Option<WalletEntry> {
        self.lock_inner().entries.get(&id).cloned()
    }

    pub fn contains(&self, id: transaction::Hash) -> bool {
        self.lock_inner().entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock_inner().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_inner().entries.is_empty()
    }

    /// Record `cert` as seen in `block` (or unconfirmed when `None`),
    /// with the maturity depth the consensus layer assigned to its backward
    /// transfers.
    ///
    /// Idempotent insert-or-update: a replayed signal refreshes the block
    /// anchor and maturity depth of the existing entry.
    pub fn sync_certificate(
        &self,
        cert: &Certificate,
        block: Option<&Block>,
        bwt_maturity_depth: i32,
    ) -> DbStatus {
        let id = cert.hash();
        let mut inner = self.lock_inner();
        let previous = inner.entries.get(&id).cloned();
        {
            let entry = inner
                .entries
                .entry(id)
                .or_insert_with(|| WalletEntry::new(TxOrCert::Cert(cert.clone())));
            match block {
                Some(block) => {
                    if !entry.anchor_to_block(block) {
                        warn!(%id, "certificate is not part of the block it was synced with");
                    }
                }
                None => entry.clear_anchor(),
            }
            entry.bwt_maturity_depth = bwt_maturity_depth;
            entry.invalidate_credit_cache();
        }
        trace!(%id, bwt_maturity_depth, "synced certificate");
        self.persist(&mut inner, id, previous)
    }

    /// Record `tx` as seen in `block` (or unconfirmed when `None`).
    pub fn sync_transaction(&self, tx: &Transaction, block: Option<&Block>) -> DbStatus {
        let id = tx.hash();
        let mut inner = self.lock_inner();
        let previous = inner.entries.get(&id).cloned();
        {
            let entry = inner
                .entries
                .entry(id)
                .or_insert_with(|| WalletEntry::new(TxOrCert::Tx(tx.clone())));
            match block {
                Some(block) => {
                    if !entry.anchor_to_block(block) {
                        warn!(%id, "transaction is not part of the block it was synced with");
                    }
                }
                None => entry.clear_anchor(),
            }
            entry.invalidate_credit_cache();
        }
        trace!(%id, "synced transaction");
        self.persist(&mut inner, id, previous)
    }

    /// Mark the stored certificate's backward transfers as voided.
    ///
    /// The cease flag is sticky: once set it survives reorgs and later
    /// re-confirmations, and no signal clears it. A signal for an unknown id
    /// is a no-op.
    pub fn sync_voided_certificate(&self, id: transaction::Hash, bwt_stripped: bool) -> DbStatus {
        let mut inner = self.lock_inner();
        let previous = match inner.entries.get(&id) {
            Some(entry) => {
                if !entry.payload.is_certificate() {
                    warn!(%id, "voided-certificate signal for a non-certificate entry");
                    return DbStatus::NoncriticalError;
                }
                entry.clone()
            }
            None => {
                trace!(%id, "voided-certificate signal for an unknown entry");
                return DbStatus::Ok;
            }
        };
        {
            let entry = inner
                .entries
                .get_mut(&id)
                .expect("entry presence was just checked");
            entry.are_bwt_ceased = entry.are_bwt_ceased || bwt_stripped;
            entry.invalidate_credit_cache();
        }
        trace!(%id, bwt_stripped, "synced voided certificate");
        self.persist(&mut inner, id, Some(previous))
    }

    /// Replace the in-memory map with the persisted entries.
    ///
    /// Unreadable records are skipped (and reported through the status) so a
    /// single damaged record cannot take the whole wallet down. Credit
    /// caches start empty.
    pub fn load_wallet(&self) -> DbStatus {
        let mut inner = self.lock_inner();
        match self.db.read_all() {
            Ok((entries, status)) => {
                inner.entries.clear();
                for entry in entries {
                    inner.entries.insert(entry.id(), entry);
                }
                debug!(count = inner.entries.len(), "loaded wallet entries");
                status
            }
            Err(error) => {
                warn!(%error, "wallet load failed");
                DbStatus::LoadFail
            }
        }
    }

    /// Delete every stored entry, in memory and on disk.
    pub fn zap_wallet(&self) -> DbStatus {
        let mut inner = self.lock_inner();
        match self.db.clear() {
            Ok(()) => {
                inner.entries.clear();
                debug!("zapped wallet entries");
                DbStatus::Ok
            }
            Err(error) => {
                warn!(%error, "wallet zap failed");
                DbStatus::LoadFail
            }
        }
    }

    /// The maturity classification of one output of the entry stored under
    /// `id`, against the supplied chain-view snapshot.
    pub fn output_maturity<V: ChainView>(
        &self,
        view: &V,
        id: transaction::Hash,
        pos: usize,
    ) -> Result<OutputMaturity, WalletError> {
        let inner = self.lock_inner();
        let entry = inner.entries.get(&id).ok_or(WalletError::NotFound(id))?;
        let evaluator = MaturityEvaluator::with_policy(view, &inner.keys, self.policy);
        Ok(evaluator.output_maturity(entry, pos))
    }

    /// The mature credit of the entry stored under `id`.
    pub fn credit<V: ChainView>(
        &self,
        view: &V,
        id: transaction::Hash,
        filter: KeyOwnership,
    ) -> Result<Amount<NonNegative>, WalletError> {
        let mut inner = self.lock_inner();
        let Inner { entries, keys } = &mut *inner;
        let entry = entries.get_mut(&id).ok_or(WalletError::NotFound(id))?;
        let evaluator = MaturityEvaluator::with_policy(view, keys, self.policy);
        Ok(evaluator.credit(entry, filter)?)
    }

    /// The immature credit of the entry stored under `id`.
    pub fn immature_credit<V: ChainView>(
        &self,
        view: &V,
        id: transaction::Hash,
        filter: KeyOwnership,
    ) -> Result<Amount<NonNegative>, WalletError> {
        let mut inner = self.lock_inner();
        let Inner { entries, keys } = &mut *inner;
        let entry = entries.get_mut(&id).ok_or(WalletError::NotFound(id))?;
        let evaluator = MaturityEvaluator::with_policy(view, keys, self.policy);
        Ok(evaluator.immature_credit(entry, filter)?)
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("wallet lock poisoned")
    }

    /// Write the entry under `id` to disk; on failure, roll the in-memory
    /// map back to `previous` so memory matches disk.
    fn persist(
        &self,
        inner: &mut Inner,
        id: transaction::Hash,
        previous: Option<WalletEntry>,
    ) -> DbStatus {
        let entry = inner
            .entries
            .get(&id)
            .expect("entry was inserted by the caller");
        match self.db.write_entry(entry) {
            Ok(()) => DbStatus::Ok,
            Err(error) => {
                warn!(%id, %error, "failed to persist wallet entry, rolling back");
                match previous {
                    Some(previous) => {
                        inner.entries.insert(id, previous);
                    }
                    None => {
                        inner.entries.remove(&id);
                    }
                }
                DbStatus::LoadFail
            }
        }
    }
}
