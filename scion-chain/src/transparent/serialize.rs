//! Consensus serialization for transparent inputs.
//!
//! Outputs and outpoints use the derived field-order codecs; inputs need a
//! hand-written impl because the coinbase form is signalled in-band by the
//! all-zeros outpoint rather than by a variant tag.

use std::io;

use super::{CoinbaseData, Input, OutPoint, Script};
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};

impl BitcoinSerialize for Input {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        match self {
            Input::PrevOut {
                outpoint,
                unlock_script,
                sequence,
            } => {
                outpoint.bitcoin_serialize(&mut writer)?;
                unlock_script.bitcoin_serialize(&mut writer)?;
                sequence.bitcoin_serialize(&mut writer)?;
            }
            Input::Coinbase { data, sequence } => {
                OutPoint::null().bitcoin_serialize(&mut writer)?;
                data.0.bitcoin_serialize(&mut writer)?;
                sequence.bitcoin_serialize(&mut writer)?;
            }
        }
        Ok(())
    }
}

impl BitcoinDeserialize for Input {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let outpoint = OutPoint::bitcoin_deserialize(&mut reader)?;
        if outpoint.is_null() {
            let data = Vec::<u8>::bitcoin_deserialize(&mut reader)?;
            if data.len() > 100 {
                return Err(SerializationError::Parse("coinbase data is too long"));
            }
            let sequence = u32::bitcoin_deserialize(&mut reader)?;
            Ok(Input::Coinbase {
                data: CoinbaseData(data),
                sequence,
            })
        } else {
            let unlock_script = Script::bitcoin_deserialize(&mut reader)?;
            let sequence = u32::bitcoin_deserialize(&mut reader)?;
            Ok(Input::PrevOut {
                outpoint,
                unlock_script,
                sequence,
            })
        }
    }
}
