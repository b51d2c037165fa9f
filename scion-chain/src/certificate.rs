//! Sidechain backward-transfer certificates.
//!
//! A certificate attests the end state of a sidechain epoch and settles a
//! batch of backward transfers on the mainchain. Its output list is split by
//! an index boundary: positions below `first_bwt_pos` are ordinary change
//! outputs, positions at or above it are backward transfers, which serialize
//! in a compressed `(value, pubkey-hash)` shape and materialize in memory as
//! pay-to-pubkey-hash outputs.

#![allow(clippy::unit_arg)]

mod mutable;
mod serialize;

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;

pub use mutable::MutableCertificate;

use std::convert::TryFrom;
use std::fmt;

use crate::{
    amount::{self, Amount, NegativeAllowed, NonNegative},
    block, transaction, transparent, BitcoinDeserialize, BitcoinSerialize, SerializationError,
};
use bitcoin_serde_derive::{BtcDeserialize, BtcSerialize};
use serde::{Deserialize, Serialize};

/// The version sentinel that identifies a certificate on the wire
/// (`0xfffffffb` as a little-endian i32).
pub const SC_CERT_VERSION: i32 = -5;

/// Sentinel for a certificate with no epoch.
pub const EPOCH_NULL: i32 = -1;
/// Sentinel for a certificate whose epoch has not been initialized yet.
pub const EPOCH_NOT_INITIALIZED: i32 = -2;
/// Sentinel for a certificate with no quality.
pub const QUALITY_NULL: i64 = -1;

/// The identifier of a sidechain.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, BtcSerialize, BtcDeserialize,
)]
pub struct SidechainId(pub [u8; 32]);

impl SidechainId {
    pub fn null() -> SidechainId {
        SidechainId([0; 32])
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0; 32]
    }
}

impl fmt::Debug for SidechainId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("SidechainId")
            .field(&hex::encode(&self.0))
            .finish()
    }
}

/// An opaque proof of the sidechain's end-of-epoch state.
///
/// The wallet never interprets these bytes; verification belongs to the
/// consensus layer.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
pub struct ScProof(pub Vec<u8>);

impl ScProof {
    pub fn null() -> ScProof {
        ScProof(Vec::new())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ScProof {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ScProof").field(&hex::encode(&self.0)).finish()
    }
}

/// The wire shape of a backward transfer: a value and the 20-byte pubkey hash
/// it pays to.
///
/// In memory, backward transfers are carried as ordinary [`transparent::Output`]s
/// whose lock script is the canonical pay-to-pubkey-hash predicate over this
/// hash; the compressed shape exists only at the serialization boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
pub struct BackwardTransfer {
    /// The amount minted on the mainchain, `-1` for the null form.
    pub value: Amount<NegativeAllowed>,
    /// The pay-to-pubkey-hash destination.
    pub pub_key_hash: [u8; 20],
}

impl BackwardTransfer {
    /// The null backward transfer: value `-1`, all-zeros destination.
    pub fn null() -> BackwardTransfer {
        BackwardTransfer {
            value: Amount::try_from(-1).expect("-1 is a valid NegativeAllowed amount"),
            pub_key_hash: [0; 20],
        }
    }

    pub fn is_null(&self) -> bool {
        i64::from(self.value) == -1
    }
}

impl From<BackwardTransfer> for transparent::Output {
    /// Materialize the backward transfer as a P2PKH output.
    fn from(bt: BackwardTransfer) -> transparent::Output {
        transparent::Output {
            value: bt.value,
            lock_script: transparent::Script::new_pay_to_pub_key_hash(bt.pub_key_hash),
        }
    }
}

impl TryFrom<&transparent::Output> for BackwardTransfer {
    type Error = CertificateError;

    /// Compress a materialized backward-transfer output back to wire shape.
    ///
    /// Fails when the output's lock script is not the canonical P2PKH form.
    fn try_from(output: &transparent::Output) -> Result<BackwardTransfer, CertificateError> {
        let pub_key_hash = output
            .lock_script
            .pub_key_hash()
            .ok_or(CertificateError::ShapeMismatch)?;
        Ok(BackwardTransfer {
            value: output.value,
            pub_key_hash,
        })
    }
}

/// Errors raised by certificate construction and mutation.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
pub enum CertificateError {
    /// An output placed in the backward-transfer region was not in
    /// pay-to-pubkey-hash form, or a regular output would have crossed the
    /// boundary.
    #[error("output shape does not match its position relative to the backward-transfer boundary")]
    ShapeMismatch,
    /// An output position was outside the output list.
    #[error("output position {0} is out of bounds")]
    PositionOutOfBounds(usize),
}

/// An immutable sidechain certificate.
///
/// The identity hash is computed once at construction and never changes;
/// edits go through [`MutableCertificate`], which freezes back into a
/// `Certificate` (recomputing the hash) when done.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Certificate {
    version: i32,
    sidechain_id: SidechainId,
    epoch_number: i32,
    quality: i64,
    end_epoch_block_hash: block::Hash,
    proof: ScProof,
    inputs: Vec<transparent::Input>,
    /// All outputs, change first; positions `>= first_bwt_pos` are
    /// materialized backward transfers.
    outputs: Vec<transparent::Output>,
    first_bwt_pos: usize,
    /// Memoized SHA256d of the canonical serialization.
    hash: transaction::Hash,
}

impl Certificate {
    /// The certificate that qualifies as `is_null()`.
    pub fn null() -> Certificate {
        MutableCertificate::new().into()
    }

    /// The certificate's ledger identity.
    pub fn hash(&self) -> transaction::Hash {
        self.hash
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn sidechain_id(&self) -> SidechainId {
        self.sidechain_id
    }

    pub fn epoch_number(&self) -> i32 {
        self.epoch_number
    }

    pub fn quality(&self) -> i64 {
        self.quality
    }

    pub fn end_epoch_block_hash(&self) -> block::Hash {
        self.end_epoch_block_hash
    }

    pub fn proof(&self) -> &ScProof {
        &self.proof
    }

    pub fn inputs(&self) -> &[transparent::Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[transparent::Output] {
        &self.outputs
    }

    /// The index boundary: outputs below it are change, at or above it are
    /// backward transfers.
    pub fn first_bwt_pos(&self) -> usize {
        self.first_bwt_pos
    }

    /// Is the output at `pos` a backward transfer?
    pub fn is_backward_transfer(&self, pos: usize) -> bool {
        pos >= self.first_bwt_pos
    }

    /// The change portion of the output list.
    pub fn change_outputs(&self) -> &[transparent::Output] {
        &self.outputs[..self.first_bwt_pos]
    }

    /// The backward-transfer portion of the output list, in materialized form.
    pub fn backward_transfer_outputs(&self) -> &[transparent::Output] {
        &self.outputs[self.first_bwt_pos..]
    }

    /// The total value minted into the mainchain by this certificate.
    pub fn value_of_backward_transfers(&self) -> Result<Amount<NonNegative>, amount::Error> {
        sum_values(self.backward_transfer_outputs())
    }

    /// The total value returned to the sidechain operator as change.
    pub fn value_of_change(&self) -> Result<Amount<NonNegative>, amount::Error> {
        sum_values(self.change_outputs())
    }

    /// The fee paid by this certificate, given the total value of its inputs.
    ///
    /// Backward transfers are minted into the mainchain rather than funded by
    /// inputs, so they do not enter the fee computation.
    pub fn fee_amount(
        &self,
        total_input: Amount<NonNegative>,
    ) -> Result<Amount<NonNegative>, amount::Error> {
        total_input - self.value_of_change()?
    }

    /// Validate every output value and the output total against the monetary
    /// range.
    pub fn check_amounts(&self) -> Result<(), amount::Error> {
        sum_values(&self.outputs).map(|_| ())
    }

    /// True for the default-constructed empty certificate.
    pub fn is_null(&self) -> bool {
        self.sidechain_id.is_null()
            && self.epoch_number == EPOCH_NULL
            && self.quality == QUALITY_NULL
            && self.end_epoch_block_hash.is_null()
            && self.proof.is_null()
            && self.inputs.is_empty()
            && self.outputs.is_empty()
    }
}

impl Default for Certificate {
    fn default() -> Self {
        Certificate::null()
    }
}

/// Certificates compare by identity hash, like the other ledger items.
impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Certificate {}

impl std::hash::Hash for Certificate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.hash, state);
    }
}

/// Sum output values, rejecting negatives and range overflow.
fn sum_values(outputs: &[transparent::Output]) -> Result<Amount<NonNegative>, amount::Error> {
    outputs
        .iter()
        .try_fold(Amount::<NonNegative>::zero(), |total, output| {
            total + output.value.constrain::<NonNegative>()?
        })
}
