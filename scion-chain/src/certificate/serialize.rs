//! Consensus serialization for certificates.
//!
//! The in-memory output list is split at `first_bwt_pos` and the two halves
//! are emitted in different shapes: change outputs as full
//! `(value, lock_script)` pairs, backward transfers compressed to
//! `(value, pubkey-hash)`. Deserialization reverses the split, materializing
//! each backward transfer as a P2PKH output and recording the boundary as the
//! length of the change list.

use std::convert::TryFrom;
use std::io;

use super::{BackwardTransfer, Certificate, MutableCertificate, ScProof, SidechainId};
use crate::{
    block,
    compactint::CompactInt,
    serialization::{sha256d, BitcoinDeserialize, BitcoinSerialize, SerializationError},
    transaction, transparent,
};

/// The maximum size of a serialized certificate, in bytes.
pub const MAX_CERT_SIZE: u64 = 1_000_000;

#[allow(clippy::too_many_arguments)]
fn serialize_fields<W: io::Write>(
    version: i32,
    sidechain_id: SidechainId,
    epoch_number: i32,
    quality: i64,
    end_epoch_block_hash: block::Hash,
    proof: &ScProof,
    inputs: &[transparent::Input],
    outputs: &[transparent::Output],
    first_bwt_pos: usize,
    mut writer: W,
) -> Result<(), io::Error> {
    version.bitcoin_serialize(&mut writer)?;
    sidechain_id.bitcoin_serialize(&mut writer)?;
    epoch_number.bitcoin_serialize(&mut writer)?;
    quality.bitcoin_serialize(&mut writer)?;
    end_epoch_block_hash.bitcoin_serialize(&mut writer)?;
    proof.bitcoin_serialize(&mut writer)?;

    CompactInt::from(inputs.len()).bitcoin_serialize(&mut writer)?;
    for input in inputs {
        input.bitcoin_serialize(&mut writer)?;
    }

    // The output list must not be mutated here: split it, emitting each half
    // in its wire shape.
    CompactInt::from(first_bwt_pos).bitcoin_serialize(&mut writer)?;
    for output in &outputs[..first_bwt_pos] {
        output.bitcoin_serialize(&mut writer)?;
    }

    CompactInt::from(outputs.len() - first_bwt_pos).bitcoin_serialize(&mut writer)?;
    for output in &outputs[first_bwt_pos..] {
        let compressed = BackwardTransfer::try_from(output).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "backward-transfer output is not pay-to-pubkey-hash",
            )
        })?;
        compressed.bitcoin_serialize(&mut writer)?;
    }
    Ok(())
}

struct Fields {
    version: i32,
    sidechain_id: SidechainId,
    epoch_number: i32,
    quality: i64,
    end_epoch_block_hash: block::Hash,
    proof: ScProof,
    inputs: Vec<transparent::Input>,
    outputs: Vec<transparent::Output>,
    first_bwt_pos: usize,
}

fn deserialize_fields<R: io::Read>(reader: R) -> Result<Fields, SerializationError> {
    let mut reader = reader.take(MAX_CERT_SIZE);
    let version = i32::bitcoin_deserialize(&mut reader)?;
    let sidechain_id = SidechainId::bitcoin_deserialize(&mut reader)?;
    let epoch_number = i32::bitcoin_deserialize(&mut reader)?;
    let quality = i64::bitcoin_deserialize(&mut reader)?;
    let end_epoch_block_hash = block::Hash::bitcoin_deserialize(&mut reader)?;
    let proof = ScProof::bitcoin_deserialize(&mut reader)?;
    let inputs = <Vec<transparent::Input>>::bitcoin_deserialize(&mut reader)?;

    let mut outputs = <Vec<transparent::Output>>::bitcoin_deserialize(&mut reader)?;
    let first_bwt_pos = outputs.len();
    let backward = <Vec<BackwardTransfer>>::bitcoin_deserialize(&mut reader)?;
    outputs.extend(backward.into_iter().map(transparent::Output::from));

    Ok(Fields {
        version,
        sidechain_id,
        epoch_number,
        quality,
        end_epoch_block_hash,
        proof,
        inputs,
        outputs,
        first_bwt_pos,
    })
}

impl BitcoinSerialize for Certificate {
    fn bitcoin_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        serialize_fields(
            self.version,
            self.sidechain_id,
            self.epoch_number,
            self.quality,
            self.end_epoch_block_hash,
            &self.proof,
            &self.inputs,
            &self.outputs,
            self.first_bwt_pos,
            writer,
        )
    }
}

/// Deserializes a certificate, recomputing and caching its identity hash.
impl BitcoinDeserialize for Certificate {
    fn bitcoin_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError> {
        let fields = deserialize_fields(reader)?;
        let mut cert = Certificate {
            version: fields.version,
            sidechain_id: fields.sidechain_id,
            epoch_number: fields.epoch_number,
            quality: fields.quality,
            end_epoch_block_hash: fields.end_epoch_block_hash,
            proof: fields.proof,
            inputs: fields.inputs,
            outputs: fields.outputs,
            first_bwt_pos: fields.first_bwt_pos,
            hash: transaction::Hash([0; 32]),
        };
        cert.hash = transaction::Hash::from(&cert);
        Ok(cert)
    }
}

impl BitcoinSerialize for MutableCertificate {
    fn bitcoin_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        serialize_fields(
            self.version,
            self.sidechain_id,
            self.epoch_number,
            self.quality,
            self.end_epoch_block_hash,
            &self.proof,
            &self.inputs,
            self.outputs(),
            self.first_bwt_pos(),
            writer,
        )
    }
}

impl BitcoinDeserialize for MutableCertificate {
    fn bitcoin_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError> {
        let fields = deserialize_fields(reader)?;
        Ok(MutableCertificate::from_parts(
            fields.version,
            fields.sidechain_id,
            fields.epoch_number,
            fields.quality,
            fields.end_epoch_block_hash,
            fields.proof,
            fields.inputs,
            fields.outputs,
            fields.first_bwt_pos,
        ))
    }
}

impl<'a> From<&'a Certificate> for transaction::Hash {
    fn from(cert: &'a Certificate) -> Self {
        let mut hash_writer = sha256d::Writer::default();
        cert.bitcoin_serialize(&mut hash_writer)
            .expect("sha256d::Writer is infallible");
        Self(hash_writer.finish())
    }
}
