//! Blocks and block-related structures (heights, headers, etc.)
#![allow(clippy::unit_arg)]

mod hash;
mod header;
mod height;
mod serialize;

pub mod merkle;

use std::{fmt, sync::Arc};

use crate::{certificate::Certificate, transaction, transaction::Transaction, BitcoinSerialize};
use bitcoin_serde_derive::BtcSerialize;
use serde::{Deserialize, Serialize};

pub use hash::Hash;
pub use header::Header;
pub use height::Height;

/// A block, containing a header, a list of transactions, and a list of
/// sidechain certificates.
///
/// Certificates settle sidechain epochs on the mainchain and are carried in
/// their own section of the block, after the transactions.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize)]
pub struct Block {
    /// The block header, containing block metadata.
    pub header: Header,
    /// The block transactions.
    pub transactions: Vec<Arc<Transaction>>,
    /// The backward-transfer certificates settled by this block.
    pub certificates: Vec<Certificate>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("hash", &self.hash())
            .field("transactions", &self.transactions.len())
            .field("certificates", &self.certificates.len())
            .finish()
    }
}

impl Block {
    /// Compute the hash of this block.
    pub fn hash(&self) -> Hash {
        Hash::from(self)
    }

    /// The ids of every item carried by this block: transactions first, then
    /// certificates. This is the leaf order of the block's Merkle tree.
    pub fn item_ids(&self) -> Vec<transaction::Hash> {
        self.transactions
            .iter()
            .map(|tx| tx.hash())
            .chain(self.certificates.iter().map(|cert| cert.hash()))
            .collect()
    }

    /// The position of `id` in this block's Merkle leaf order, if present.
    pub fn position_of(&self, id: transaction::Hash) -> Option<usize> {
        self.item_ids().iter().position(|item| *item == id)
    }

    /// The Merkle root over the block's transactions and certificates.
    pub fn merkle_root(&self) -> merkle::Root {
        merkle::root(&self.item_ids())
    }
}

impl<'a> From<&'a Block> for Hash {
    fn from(block: &'a Block) -> Hash {
        (&block.header).into()
    }
}
