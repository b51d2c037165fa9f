//! The per-output maturity and credit evaluator.
//!
//! Classification is a pure function of the entry snapshot and a
//! [`ChainView`] snapshot: moving the tip backwards reverses every status
//! (no hysteresis), and nothing here performs I/O or takes the database
//! lock. Credit totals are memoized on the entry behind a validity token
//! derived from `(tip, anchor, ceased, filter)`.

use scion_chain::{
    amount::{self, Amount, NonNegative},
    parameters::COINBASE_MATURITY,
};

use crate::{
    chain_view::ChainView,
    entry::{CacheToken, TxOrCert, WalletEntry},
    keystore::{KeyOwnership, KeyStore},
};

/// The spendability classification of a single output.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMaturity {
    /// Spendable now.
    Mature,
    /// Will become spendable after more confirmations.
    Immature,
    /// Not spendable in the entry's current state (conflicted, orphaned, or
    /// voided).
    NotApplicable,
}

/// Policy knobs for credit evaluation.
#[derive(Copy, Clone, Debug)]
pub struct CreditPolicy {
    /// Whether a certificate's change outputs count as mature while the
    /// certificate sits in the mempool, as transaction outputs do. The
    /// original node is ambiguous on this point, so it is explicit here.
    pub mempool_change_is_mature: bool,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        CreditPolicy {
            mempool_change_is_mature: true,
        }
    }
}

/// Classifies outputs and aggregates credit for wallet entries against one
/// chain-view snapshot.
pub struct MaturityEvaluator<'a, V: ChainView> {
    view: &'a V,
    keys: &'a KeyStore,
    policy: CreditPolicy,
}

impl<'a, V: ChainView> MaturityEvaluator<'a, V> {
    pub fn new(view: &'a V, keys: &'a KeyStore) -> Self {
        Self::with_policy(view, keys, CreditPolicy::default())
    }

    pub fn with_policy(view: &'a V, keys: &'a KeyStore, policy: CreditPolicy) -> Self {
        MaturityEvaluator { view, keys, policy }
    }

    /// The depth of `entry` in the active chain: 1 for an entry in the tip
    /// block, 0 for a mempool entry, -1 for a conflicted or orphaned entry.
    pub fn depth(&self, entry: &WalletEntry) -> i64 {
        if entry.anchor_block.is_null() {
            if self.view.mempool_contains(entry.id()) {
                0
            } else {
                -1
            }
        } else {
            match (self.view.height_of(entry.anchor_block), self.view.tip_height()) {
                (Some(height), Some(tip)) => i64::from(tip.0) - i64::from(height.0) + 1,
                _ => -1,
            }
        }
    }

    /// Confirmations still missing before an output with `maturity_depth`
    /// becomes spendable: zero once `depth` has passed the window.
    fn blocks_to_maturity(maturity_depth: i64, depth: i64) -> i64 {
        std::cmp::max(0, maturity_depth + 1 - depth)
    }

    /// Classify the output of `entry` at position `pos`.
    pub fn output_maturity(&self, entry: &WalletEntry, pos: usize) -> OutputMaturity {
        if pos >= entry.payload.outputs().len() {
            return OutputMaturity::NotApplicable;
        }
        let depth = self.depth(entry);
        if depth < 0 {
            return OutputMaturity::NotApplicable;
        }
        match &entry.payload {
            TxOrCert::Tx(tx) if tx.is_coinbase() => {
                if depth > 0 && Self::blocks_to_maturity(i64::from(COINBASE_MATURITY), depth) == 0 {
                    OutputMaturity::Mature
                } else {
                    OutputMaturity::Immature
                }
            }
            TxOrCert::Tx(_) => OutputMaturity::Mature,
            TxOrCert::Cert(cert) => {
                if !cert.is_backward_transfer(pos) {
                    if depth > 0 || self.policy.mempool_change_is_mature {
                        OutputMaturity::Mature
                    } else {
                        OutputMaturity::NotApplicable
                    }
                } else if entry.are_bwt_ceased {
                    // Voided: the sidechain ceased, the transfer never matures.
                    OutputMaturity::NotApplicable
                } else if depth > 0
                    && Self::blocks_to_maturity(i64::from(entry.bwt_maturity_depth), depth) == 0
                {
                    OutputMaturity::Mature
                } else {
                    OutputMaturity::Immature
                }
            }
        }
    }

    fn cache_token(&self, entry: &WalletEntry, filter: KeyOwnership) -> CacheToken {
        CacheToken {
            tip: self.view.tip_height(),
            anchor: entry.anchor_block,
            ceased: entry.are_bwt_ceased,
            filter,
        }
    }

    /// The total value of `entry`'s mature outputs owned under `filter`.
    pub fn credit(
        &self,
        entry: &mut WalletEntry,
        filter: KeyOwnership,
    ) -> Result<Amount<NonNegative>, amount::Error> {
        let token = self.cache_token(entry, filter);
        if let Some((cached, value)) = entry.credit_cache.credit {
            if cached == token {
                return Ok(value);
            }
        }

        let mut total = Amount::zero();
        for (pos, output) in entry.payload.outputs().iter().enumerate() {
            if !self.keys.ownership(&output.lock_script).intersects(filter) {
                continue;
            }
            if self.output_maturity(entry, pos) == OutputMaturity::Mature {
                total = (total + output.value.constrain()?)?;
            }
        }

        entry.credit_cache.credit = Some((token, total));
        Ok(total)
    }

    /// The value owned under `filter` that is on its way to maturity:
    /// every output of an immature coinbase, the immature (and not voided)
    /// backward transfers of a confirmed certificate, nothing for plain
    /// transactions.
    pub fn immature_credit(
        &self,
        entry: &mut WalletEntry,
        filter: KeyOwnership,
    ) -> Result<Amount<NonNegative>, amount::Error> {
        let token = self.cache_token(entry, filter);
        if let Some((cached, value)) = entry.credit_cache.immature {
            if cached == token {
                return Ok(value);
            }
        }

        let depth = self.depth(entry);
        let mut total = Amount::zero();
        match &entry.payload {
            TxOrCert::Tx(tx) if tx.is_coinbase() => {
                if depth > 0 && Self::blocks_to_maturity(i64::from(COINBASE_MATURITY), depth) > 0 {
                    for output in entry.payload.outputs() {
                        if !self.keys.ownership(&output.lock_script).intersects(filter) {
                            continue;
                        }
                        total = (total + output.value.constrain()?)?;
                    }
                }
            }
            TxOrCert::Tx(_) => {}
            TxOrCert::Cert(_) => {
                // Mempool backward transfers do not count toward immature
                // credit; only confirmed, not-yet-mature ones do.
                if depth > 0 && !entry.are_bwt_ceased {
                    for (pos, output) in entry.payload.outputs().iter().enumerate() {
                        if !self.keys.ownership(&output.lock_script).intersects(filter) {
                            continue;
                        }
                        if self.output_maturity(entry, pos) == OutputMaturity::Immature {
                            total = (total + output.value.constrain()?)?;
                        }
                    }
                }
            }
        }

        entry.credit_cache.immature = Some((token, total));
        Ok(total)
    }
}
