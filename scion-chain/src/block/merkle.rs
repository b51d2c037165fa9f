//! The block item Merkle tree.
//!
//! Leaves are the ids of the block's transactions followed by the ids of its
//! certificates. Interior nodes are the SHA256d hash of the concatenation of
//! their children; a level with an odd number of nodes duplicates its last
//! node, as in Bitcoin.

use std::{fmt, io};

use crate::serialization::{sha256d, BitcoinDeserialize, BitcoinSerialize, SerializationError};
use crate::transaction;
use bitcoin_serde_derive::{BtcDeserialize, BtcSerialize};
use serde::{Deserialize, Serialize};

/// The root of a block's item Merkle tree.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, BtcSerialize, BtcDeserialize,
)]
pub struct Root(pub [u8; 32]);

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("merkle::Root")
            .field(&hex::encode(&self.0))
            .finish()
    }
}

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    use io::Write;

    let mut writer = sha256d::Writer::default();
    writer
        .write_all(left)
        .and_then(|()| writer.write_all(right))
        .expect("sha256d::Writer is infallible");
    writer.finish()
}

/// Compute the Merkle root over `leaves`.
///
/// An empty leaf list yields the all-zeros root, matching the convention for
/// blocks with no items.
pub fn root(leaves: &[transaction::Hash]) -> Root {
    if leaves.is_empty() {
        return Root([0; 32]);
    }
    let mut level: Vec<[u8; 32]> = leaves.iter().map(|leaf| leaf.0).collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for pair in level.chunks(2) {
            let right = pair.get(1).unwrap_or(&pair[0]);
            next.push(hash_pair(&pair[0], right));
        }
        level = next;
    }
    Root(level[0])
}

/// Extract the Merkle branch authenticating the leaf at `index`.
///
/// Returns `None` when `index` is outside `leaves`.
pub fn branch(leaves: &[transaction::Hash], index: usize) -> Option<Vec<transaction::Hash>> {
    if index >= leaves.len() {
        return None;
    }
    let mut branch = Vec::new();
    let mut level: Vec<[u8; 32]> = leaves.iter().map(|leaf| leaf.0).collect();
    let mut position = index;
    while level.len() > 1 {
        let sibling = std::cmp::min(position ^ 1, level.len() - 1);
        branch.push(transaction::Hash(level[sibling]));
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for pair in level.chunks(2) {
            let right = pair.get(1).unwrap_or(&pair[0]);
            next.push(hash_pair(&pair[0], right));
        }
        level = next;
        position /= 2;
    }
    Some(branch)
}

/// Fold a leaf up through `branch` (as produced by [`branch`]) and return the
/// implied root.
pub fn branch_root(leaf: transaction::Hash, branch: &[transaction::Hash], index: usize) -> Root {
    let mut hash = leaf.0;
    let mut position = index;
    for sibling in branch {
        if position & 1 == 1 {
            hash = hash_pair(&sibling.0, &hash);
        } else {
            hash = hash_pair(&hash, &sibling.0);
        }
        position /= 2;
    }
    Root(hash)
}
