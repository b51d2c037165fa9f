use std::{io::Read, sync::Arc};

use super::Block;
use crate::{
    certificate::Certificate, transaction::Transaction, BitcoinDeserialize, SerializationError,
};

/// The maximum size of a block, in bytes.
pub const MAX_BLOCK_BYTES: u64 = 4_000_000;

impl BitcoinDeserialize for Block {
    fn bitcoin_deserialize<R: Read>(reader: R) -> Result<Self, SerializationError> {
        // If the limit is reached, deserialization fails with UnexpectedEof
        let mut src = reader.take(MAX_BLOCK_BYTES);
        let header = super::Header::bitcoin_deserialize(&mut src)?;
        let transactions = <Vec<Arc<Transaction>>>::bitcoin_deserialize(&mut src)?;
        let certificates = <Vec<Certificate>>::bitcoin_deserialize(&mut src)?;
        Ok(Block {
            header,
            transactions,
            certificates,
        })
    }
}
