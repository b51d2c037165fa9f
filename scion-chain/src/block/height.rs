use serde::{Deserialize, Serialize};

/// The height of a block is the length of the chain back to the genesis block.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Height(pub u32);

impl Height {
    /// The block height of the genesis block.
    pub const MIN: Height = Height(0);

    /// The largest representable block height.
    pub const MAX: Height = Height(u32::max_value());
}
