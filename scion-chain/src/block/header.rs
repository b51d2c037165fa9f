use crate::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use bitcoin_serde_derive::{BtcDeserialize, BtcSerialize};
use serde::{Deserialize, Serialize};

use super::{merkle, Hash};

/// A block header, containing metadata about a block.
///
/// Blocks are chained together via the backwards reference (previous header
/// hash) present in the block header. Each block points backwards to its
/// parent, all the way back to the genesis block.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize,
)]
pub struct Header {
    /// The block's version field.
    pub version: i32,

    /// The hash of the previous block, used to create a chain of blocks back to
    /// the genesis block.
    ///
    /// This ensures no previous block can be changed without also changing this
    /// block's header.
    pub previous_block_hash: Hash,

    /// The root of the block's item Merkle tree, binding the header to the
    /// transactions and certificates in the block.
    pub merkle_root: merkle::Root,

    /// The block timestamp as a Unix epoch time (UTC), according to the miner.
    pub time: u32,

    /// An encoded version of the target threshold this block's header hash
    /// must be less than or equal to, in the nBits format used by Bitcoin.
    pub difficulty_threshold: u32,

    /// An arbitrary field that miners change to modify the header hash in
    /// order to produce a hash less than or equal to the target threshold.
    pub nonce: u32,
}

impl Header {
    /// Returns length of a serialized header in bytes
    pub const fn len() -> usize {
        80
    }

    /// Compute the hash of this header.
    pub fn hash(&self) -> Hash {
        self.into()
    }
}
