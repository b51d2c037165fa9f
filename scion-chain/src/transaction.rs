//! Transactions and transaction-related structures.

use crate::cached::Cached;
use crate::transparent;
use crate::BitcoinSerialize;
use bitcoin_serde_derive::{BtcDeserialize, BtcSerialize};
use serde::{Deserialize, Serialize};

mod hash;
mod serialize;

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;
#[cfg(test)]
mod tests;

pub use hash::Hash;

use crate::{BitcoinDeserialize, SerializationError};

/// The version number carried by ordinary transparent transactions.
pub const TRANSPARENT_TX_VERSION: i32 = 1;

/// A transaction lock time: interpreted as a block height below the
/// threshold `500_000_000`, as a Unix timestamp above it.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, BtcSerialize, BtcDeserialize,
)]
pub struct LockTime(pub u32);

impl LockTime {
    /// A lock time that imposes no constraint.
    pub fn unlocked() -> LockTime {
        LockTime(0)
    }
}

/// A transparent transaction.
///
/// A transaction is an encoded data structure that facilitates the transfer of
/// value between two public key addresses. Everything is designed to ensure
/// that transactions can be created, propagated on the network, validated, and
/// finally added to the global ledger of transactions (the blockchain).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BtcSerialize)]
pub struct Transaction {
    /// The transaction version.
    pub version: i32,
    /// The transaction inputs.
    pub inputs: Vec<transparent::Input>,
    /// The transaction outputs.
    pub outputs: Vec<transparent::Output>,
    /// The transaction lock time.
    pub lock_time: LockTime,
    hash: Cached<Hash>,
}

impl Transaction {
    pub fn new(
        version: i32,
        inputs: Vec<transparent::Input>,
        outputs: Vec<transparent::Output>,
        lock_time: LockTime,
    ) -> Transaction {
        Transaction {
            version,
            inputs,
            outputs,
            lock_time,
            hash: Cached::new(),
        }
    }

    /// Get the hash of this transaction.
    pub fn hash(&self) -> Hash {
        // If we have a cached version, just return that
        if let Some(hash) = self.hash.value() {
            return hash;
        }
        // Otherwise, serialize the tx to calculate and return the hash
        Hash::from(self)
    }

    pub fn contains_coinbase_input(&self) -> bool {
        self.inputs
            .iter()
            .any(|input| matches!(input, transparent::Input::Coinbase { .. }))
    }

    /// Returns `true` if this transaction is a coinbase transaction.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && matches!(
                self.inputs.get(0),
                Some(transparent::Input::Coinbase { .. })
            )
    }
}
