//! Transparent-related (Bitcoin-inherited) functionality.
#![allow(clippy::unit_arg)]

mod script;
mod serialize;

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;

pub use script::Script;

use crate::{
    amount::{Amount, NegativeAllowed},
    compactint::CompactInt,
    transaction, BitcoinDeserialize, BitcoinSerialize, SerializationError,
};
use bitcoin_serde_derive::{BtcDeserialize, BtcSerialize};

use std::convert::TryFrom;

/// Arbitrary data inserted by miners into a coinbase transaction.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CoinbaseData(
    /// Invariant: this vec must be less than 100 bytes.
    pub(crate) Vec<u8>,
);

impl CoinbaseData {
    pub fn new(data: Vec<u8>) -> CoinbaseData {
        CoinbaseData(data)
    }

    pub fn serialized_size(&self) -> usize {
        CompactInt::size(self.0.len()) + self.0.len()
    }
}

impl AsRef<[u8]> for CoinbaseData {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for CoinbaseData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let escaped = String::from_utf8(
            self.0
                .iter()
                .cloned()
                .flat_map(std::ascii::escape_default)
                .collect(),
        )
        .expect("ascii::escape_default produces utf8");
        f.debug_tuple("CoinbaseData").field(&escaped).finish()
    }
}

/// OutPoint
///
/// A particular transaction output reference.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash, BtcSerialize, BtcDeserialize,
)]
pub struct OutPoint {
    /// References the transaction that contains the output being spent.
    pub hash: transaction::Hash,

    /// Identifies which output from that transaction is referenced; the
    /// first output is 0, etc.
    pub index: u32,
}

impl OutPoint {
    #[inline]
    pub const fn len() -> usize {
        36
    }

    /// The all-zeros outpoint used by coinbase inputs.
    pub fn null() -> OutPoint {
        OutPoint {
            hash: transaction::Hash([0; 32]),
            index: std::u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash.0 == [0; 32] && self.index == std::u32::MAX
    }
}

/// A transparent input to a transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Input {
    /// A reference to an output of a previous transaction.
    PrevOut {
        /// The previous output transaction reference.
        outpoint: OutPoint,
        /// The script that authorizes spending `outpoint`.
        unlock_script: Script,
        /// The sequence number for the output.
        sequence: u32,
    },
    /// New coins created by the block reward.
    Coinbase {
        /// Free data inserted by miners.
        data: CoinbaseData,
        /// The sequence number for the output.
        sequence: u32,
    },
}

impl Input {
    /// Returns the serialized length (in bytes) of this input.
    pub fn serialized_size(&self) -> usize {
        match *self {
            Input::PrevOut {
                ref unlock_script, ..
            } => OutPoint::len() + unlock_script.serialized_size() + 4,
            Input::Coinbase { ref data, .. } => OutPoint::len() + data.serialized_size() + 4,
        }
    }
}

/// A transparent output from a transaction or certificate.
///
/// The most fundamental building block of a transaction is a transaction
/// output -- the funds you own in your "wallet" are in fact a subset of
/// unspent outputs of the global output set.
#[derive(
    Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash, BtcDeserialize, BtcSerialize,
)]
pub struct Output {
    /// Transaction value.
    // On the wire this is an i64; `-1` marks a default-constructed null output.
    pub value: Amount<NegativeAllowed>,

    /// The lock script defines the conditions under which this output can be spent.
    pub lock_script: Script,
}

impl Output {
    /// The null output: value `-1` and an empty lock script.
    pub fn null() -> Output {
        Output {
            value: Amount::try_from(-1).expect("-1 is a valid NegativeAllowed amount"),
            lock_script: Script(Vec::new()),
        }
    }

    pub fn is_null(&self) -> bool {
        i64::from(self.value) == -1
    }

    /// Returns the serialized length (in bytes) of this Output
    pub fn serialized_size(&self) -> usize {
        8 + self.lock_script.serialized_size()
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::null()
    }
}
