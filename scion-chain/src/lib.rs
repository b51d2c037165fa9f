//! Consensus data model for a sidechain-enabled, Bitcoin-derived chain:
//! amounts, canonical serialization, transparent outputs, transactions,
//! backward-transfer certificates, and blocks.

#![allow(clippy::unit_arg)]

#[macro_use]
extern crate serde;

mod cached;
mod compactint;

pub mod amount;
pub mod block;
pub mod certificate;
pub mod parameters;
pub mod serialization;
pub mod transaction;
pub mod transparent;

pub use cached::Cached;
pub use compactint::CompactInt;
pub use serialization::{
    BitcoinDeserialize, BitcoinDeserializeInto, BitcoinSerialize, SerializationError,
};
