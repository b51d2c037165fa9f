//! Contains impls of `BitcoinDeserialize` for the transaction types, so that
//! the hand-written half of the serialization logic is in one place.

use std::{io, sync::Arc};

use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};

/// The maximum size of a transaction in bytes.
pub const MAX_TX_SIZE: u64 = 1_000_000;

use super::*;
use crate::transparent;

/// Deserializes a transaction, calculating and caching its id.
impl BitcoinDeserialize for Transaction {
    fn bitcoin_deserialize<R: std::io::Read>(src: R) -> Result<Self, SerializationError> {
        // Put a sanity limit on the size of a transaction to protect against DOS attacks
        let mut src = src.take(MAX_TX_SIZE);
        let version = i32::bitcoin_deserialize(&mut src)?;
        let inputs = <Vec<transparent::Input>>::bitcoin_deserialize(&mut src)?;
        let outputs = <Vec<transparent::Output>>::bitcoin_deserialize(&mut src)?;
        let lock_time = LockTime::bitcoin_deserialize(&mut src)?;
        let mut tx = Transaction {
            version,
            inputs,
            outputs,
            lock_time,
            hash: Cached::new(),
        };
        // Calculate and cache the id.
        let own_hash = tx.hash();
        tx.hash = Cached::from(own_hash);
        Ok(tx)
    }
}

impl<T> BitcoinDeserialize for Arc<T>
where
    T: BitcoinDeserialize,
{
    fn bitcoin_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(Arc::new(T::bitcoin_deserialize(reader)?))
    }
}

impl<T> BitcoinSerialize for Arc<T>
where
    T: BitcoinSerialize,
{
    fn bitcoin_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        T::bitcoin_serialize(self, writer)
    }
}
