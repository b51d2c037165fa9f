use crate::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use byteorder::{LittleEndian, WriteBytesExt};

/// The Bitcoin variable-length integer, used to prefix sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactInt(u64);

impl CompactInt {
    pub fn from(value: usize) -> CompactInt {
        CompactInt(value as u64)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the number of bytes the encoding of `value` occupies.
    pub fn size(value: usize) -> usize {
        if value < 253 {
            1
        } else if value <= std::u16::MAX as usize {
            3
        } else if value <= std::u32::MAX as usize {
            5
        } else {
            9
        }
    }
}

impl BitcoinSerialize for CompactInt {
    fn bitcoin_serialize<W>(&self, mut target: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        if self.value() < 253 {
            target.write_all(&[self.value() as u8])
        } else if self.value() <= std::u16::MAX as u64 {
            target.write_all(&[253])?;
            target.write_u16::<LittleEndian>(self.value() as u16)
        } else if self.value() <= std::u32::MAX as u64 {
            target.write_all(&[254])?;
            target.write_u32::<LittleEndian>(self.value() as u32)
        } else {
            target.write_all(&[255])?;
            target.write_u64::<LittleEndian>(self.value())
        }
    }
}

impl BitcoinDeserialize for CompactInt {
    fn bitcoin_deserialize<R: std::io::Read>(
        mut target: R,
    ) -> Result<CompactInt, SerializationError> {
        let first = u8::bitcoin_deserialize(&mut target)?;
        if first < 253 {
            Ok(CompactInt(first as u64))
        } else if first == 253 {
            Ok(CompactInt(u16::bitcoin_deserialize(&mut target)? as u64))
        } else if first == 254 {
            Ok(CompactInt(u32::bitcoin_deserialize(&mut target)? as u64))
        } else {
            Ok(CompactInt(u64::bitcoin_deserialize(&mut target)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: usize) -> CompactInt {
        let encoded = CompactInt::from(value)
            .bitcoin_serialize_to_vec()
            .expect("compact int serializes");
        assert_eq!(encoded.len(), CompactInt::size(value));
        CompactInt::bitcoin_deserialize(&encoded[..]).expect("compact int deserializes")
    }

    #[test]
    fn compactint_boundaries_roundtrip() {
        for &value in &[
            0usize,
            1,
            252,
            253,
            0xffff,
            0x1_0000,
            0xffff_ffff,
            0x1_0000_0000,
        ] {
            assert_eq!(roundtrip(value).value(), value as u64);
        }
    }
}
