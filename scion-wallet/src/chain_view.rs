//! Read-only views of the active chain and mempool.
//!
//! The maturity evaluator is parameterized over [`ChainView`] and treats the
//! view as a snapshot valid for the duration of one call: depth is always
//! recomputed from the supplied view, never stored.

use std::collections::HashSet;

use scion_chain::{
    block::{self, Block, Height},
    transaction,
};

/// A read-only snapshot of the active chain and the mempool.
pub trait ChainView {
    /// The height of the current tip, or `None` for an empty chain.
    fn tip_height(&self) -> Option<Height>;

    /// The height of `hash` in the active chain, if it is part of it.
    fn height_of(&self, hash: block::Hash) -> Option<Height>;

    /// Whether `hash` is part of the active chain.
    fn contains(&self, hash: block::Hash) -> bool {
        self.height_of(hash).is_some()
    }

    /// Whether the transaction or certificate `id` is currently in the
    /// mempool.
    fn mempool_contains(&self, id: transaction::Hash) -> bool;
}

/// A deterministic in-memory [`ChainView`].
///
/// Heights count from zero at the front of the block list. Extending the tip
/// past the known blocks synthesizes filler hashes, so a test can put the
/// chain at an arbitrary height, connect a real block, and then grow or
/// rewind the tip around it.
#[derive(Clone, Debug, Default)]
pub struct MemoryChainView {
    blocks: Vec<block::Hash>,
    mempool: HashSet<transaction::Hash>,
}

impl MemoryChainView {
    pub fn new() -> MemoryChainView {
        MemoryChainView::default()
    }

    /// Grow or rewind the chain so the tip sits exactly at `height`.
    ///
    /// Growth appends synthetic filler blocks; rewinding disconnects blocks
    /// from the tip down, including previously connected real blocks.
    pub fn set_tip_height(&mut self, height: u32) {
        let target_len = height as usize + 1;
        self.blocks.truncate(target_len);
        while self.blocks.len() < target_len {
            self.blocks
                .push(Self::synthetic_hash(self.blocks.len() as u32));
        }
    }

    /// Connect `block` at the next height and return that height.
    pub fn connect_block(&mut self, block: &Block) -> Height {
        self.blocks.push(block.hash());
        Height(self.blocks.len() as u32 - 1)
    }

    pub fn add_to_mempool(&mut self, id: transaction::Hash) {
        self.mempool.insert(id);
    }

    pub fn remove_from_mempool(&mut self, id: transaction::Hash) {
        self.mempool.remove(&id);
    }

    fn synthetic_hash(height: u32) -> block::Hash {
        let mut bytes = [0x5a; 32];
        bytes[..4].copy_from_slice(&height.to_le_bytes());
        block::Hash(bytes)
    }
}

impl ChainView for MemoryChainView {
    fn tip_height(&self) -> Option<Height> {
        self.blocks
            .len()
            .checked_sub(1)
            .map(|height| Height(height as u32))
    }

    fn height_of(&self, hash: block::Hash) -> Option<Height> {
        self.blocks
            .iter()
            .position(|block| *block == hash)
            .map(|height| Height(height as u32))
    }

    fn mempool_contains(&self, id: transaction::Hash) -> bool {
        self.mempool.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tip_tracks_extension_and_rewind() {
        let mut view = MemoryChainView::new();
        assert_eq!(view.tip_height(), None);

        view.set_tip_height(100);
        assert_eq!(view.tip_height(), Some(Height(100)));

        view.set_tip_height(42);
        assert_eq!(view.tip_height(), Some(Height(42)));

        view.set_tip_height(100);
        assert_eq!(view.tip_height(), Some(Height(100)));
    }

    #[test]
    fn connected_block_survives_extension_but_not_rewind_below_it() {
        let mut view = MemoryChainView::new();
        view.set_tip_height(100);

        let block_hash = block::Hash([0xbb; 32]);
        view.blocks.push(block_hash);
        assert_eq!(view.height_of(block_hash), Some(Height(101)));

        view.set_tip_height(150);
        assert_eq!(view.height_of(block_hash), Some(Height(101)));

        view.set_tip_height(101);
        assert_eq!(view.height_of(block_hash), Some(Height(101)));

        view.set_tip_height(100);
        assert_eq!(view.height_of(block_hash), None);
    }
}
