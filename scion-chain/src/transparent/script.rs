#![allow(clippy::unit_arg)]
use crate::{
    compactint::CompactInt,
    serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError},
};
use std::{
    fmt,
    io::{self, Read},
};

const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;

/// An encoding of a Bitcoin script.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct Script(pub Vec<u8>);

impl Script {
    /// The canonical pay-to-pubkey-hash lock script over `pub_key_hash`:
    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn new_pay_to_pub_key_hash(pub_key_hash: [u8; 20]) -> Script {
        let mut bytes = Vec::with_capacity(25);
        bytes.extend(&[OP_DUP, OP_HASH160, 0x14]);
        bytes.extend(&pub_key_hash);
        bytes.extend(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(bytes)
    }

    /// If this script is the canonical pay-to-pubkey-hash form, returns the
    /// destination pubkey hash.
    pub fn pub_key_hash(&self) -> Option<[u8; 20]> {
        let bytes = &self.0;
        if bytes.len() == 25
            && bytes[0] == OP_DUP
            && bytes[1] == OP_HASH160
            && bytes[2] == 0x14
            && bytes[23] == OP_EQUALVERIFY
            && bytes[24] == OP_CHECKSIG
        {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&bytes[3..23]);
            Some(hash)
        } else {
            None
        }
    }

    pub fn is_pay_to_pub_key_hash(&self) -> bool {
        self.pub_key_hash().is_some()
    }

    pub fn serialized_size(&self) -> usize {
        CompactInt::size(self.0.len()) + self.0.len()
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Script")
            .field(&hex::encode(&self.0))
            .finish()
    }
}

impl BitcoinSerialize for Script {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        CompactInt::from(self.0.len()).bitcoin_serialize(&mut writer)?;
        writer.write_all(&self.0[..])?;
        Ok(())
    }
}

impl BitcoinDeserialize for Script {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = CompactInt::bitcoin_deserialize(&mut reader)?.value();
        let mut bytes = Vec::new();
        reader.take(len).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != len {
            return Err(SerializationError::Parse("script bytes were truncated"));
        }
        Ok(Script(bytes))
    }
}

#[cfg(test)]
mod proptests {
    use std::io::Cursor;

    use proptest::prelude::*;

    use super::*;
    use crate::serialization::{BitcoinDeserialize, BitcoinSerialize};

    proptest! {
        #[test]
        fn script_roundtrip(script in any::<Script>()) {
            let mut bytes = Cursor::new(Vec::new());
            script.bitcoin_serialize(&mut bytes)?;

            bytes.set_position(0);
            let other_script = Script::bitcoin_deserialize(&mut bytes)?;

            prop_assert_eq![script, other_script];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p2pkh_script_roundtrips_the_hash() {
        let hash = [7u8; 20];
        let script = Script::new_pay_to_pub_key_hash(hash);
        assert_eq!(script.0.len(), 25);
        assert_eq!(script.pub_key_hash(), Some(hash));
        assert!(script.is_pay_to_pub_key_hash());
    }

    #[test]
    fn non_p2pkh_script_has_no_pub_key_hash() {
        assert_eq!(Script(vec![]).pub_key_hash(), None);
        assert_eq!(Script(vec![OP_DUP; 25]).pub_key_hash(), None);
    }
}
