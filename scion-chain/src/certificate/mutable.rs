//! The edit-in-place certificate shape used during construction.

use std::convert::TryFrom;

use super::{
    BackwardTransfer, Certificate, CertificateError, ScProof, SidechainId, EPOCH_NULL,
    QUALITY_NULL, SC_CERT_VERSION,
};
use crate::{
    block,
    serialization::{sha256d, BitcoinSerialize},
    transaction, transparent,
};

/// A mutable certificate.
///
/// Unlike [`Certificate`], this shape carries no memoized hash: [`hash`] is
/// computed on the fly, and the output list can be edited through methods
/// that maintain the backward-transfer boundary invariant. Freezing into a
/// [`Certificate`] fixes the boundary and computes the identity hash.
///
/// [`hash`]: MutableCertificate::hash
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MutableCertificate {
    pub version: i32,
    pub sidechain_id: SidechainId,
    pub epoch_number: i32,
    pub quality: i64,
    pub end_epoch_block_hash: block::Hash,
    pub proof: ScProof,
    pub inputs: Vec<transparent::Input>,
    outputs: Vec<transparent::Output>,
    first_bwt_pos: usize,
}

impl MutableCertificate {
    /// A certificate that freezes into `Certificate::null()`.
    pub fn new() -> MutableCertificate {
        MutableCertificate {
            version: SC_CERT_VERSION,
            sidechain_id: SidechainId::null(),
            epoch_number: EPOCH_NULL,
            quality: QUALITY_NULL,
            end_epoch_block_hash: block::Hash::null(),
            proof: ScProof::null(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            first_bwt_pos: 0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn from_parts(
        version: i32,
        sidechain_id: SidechainId,
        epoch_number: i32,
        quality: i64,
        end_epoch_block_hash: block::Hash,
        proof: ScProof,
        inputs: Vec<transparent::Input>,
        outputs: Vec<transparent::Output>,
        first_bwt_pos: usize,
    ) -> MutableCertificate {
        MutableCertificate {
            version,
            sidechain_id,
            epoch_number,
            quality,
            end_epoch_block_hash,
            proof,
            inputs,
            outputs,
            first_bwt_pos,
        }
    }

    pub fn outputs(&self) -> &[transparent::Output] {
        &self.outputs
    }

    pub fn first_bwt_pos(&self) -> usize {
        self.first_bwt_pos
    }

    /// Append a change output at the end of the change region.
    pub fn push_change(&mut self, output: transparent::Output) {
        self.outputs.insert(self.first_bwt_pos, output);
        self.first_bwt_pos += 1;
    }

    /// Append a backward-transfer output.
    ///
    /// The output must already be in the canonical pay-to-pubkey-hash form;
    /// anything else is a shape mismatch.
    pub fn push_backward(
        &mut self,
        output: transparent::Output,
    ) -> Result<(), CertificateError> {
        BackwardTransfer::try_from(&output)?;
        self.outputs.push(output);
        Ok(())
    }

    /// Append a backward transfer in wire shape, materializing it.
    pub fn push_backward_transfer(&mut self, transfer: BackwardTransfer) {
        self.outputs.push(transfer.into());
    }

    /// Insert an output at `pos`.
    ///
    /// Positions up to and including the boundary insert into the change
    /// region (moving the boundary up); positions past it insert into the
    /// backward-transfer region and must be in pay-to-pubkey-hash form.
    pub fn insert_at(
        &mut self,
        pos: usize,
        output: transparent::Output,
    ) -> Result<(), CertificateError> {
        if pos > self.outputs.len() {
            return Err(CertificateError::PositionOutOfBounds(pos));
        }
        if pos <= self.first_bwt_pos {
            self.outputs.insert(pos, output);
            self.first_bwt_pos += 1;
        } else {
            BackwardTransfer::try_from(&output)?;
            self.outputs.insert(pos, output);
        }
        Ok(())
    }

    /// Remove the output at `pos`.
    pub fn erase_at(&mut self, pos: usize) -> Result<(), CertificateError> {
        if pos >= self.outputs.len() {
            return Err(CertificateError::PositionOutOfBounds(pos));
        }
        self.outputs.remove(pos);
        if pos < self.first_bwt_pos {
            self.first_bwt_pos -= 1;
        }
        Ok(())
    }

    /// Grow or shrink the change region to `new_size` outputs, filling with
    /// null outputs.
    pub fn resize_change(&mut self, new_size: usize) {
        while self.first_bwt_pos > new_size {
            self.outputs.remove(self.first_bwt_pos - 1);
            self.first_bwt_pos -= 1;
        }
        while self.first_bwt_pos < new_size {
            self.outputs
                .insert(self.first_bwt_pos, transparent::Output::null());
            self.first_bwt_pos += 1;
        }
    }

    /// Grow or shrink the backward-transfer region to `new_size` outputs,
    /// filling with materialized null transfers.
    pub fn resize_backward(&mut self, new_size: usize) {
        let target = self.first_bwt_pos + new_size;
        while self.outputs.len() > target {
            self.outputs.pop();
        }
        while self.outputs.len() < target {
            self.outputs.push(BackwardTransfer::null().into());
        }
    }

    /// Compute the hash of this certificate. This is computed on the fly, as
    /// opposed to `Certificate::hash()`, which uses a cached result.
    pub fn hash(&self) -> transaction::Hash {
        let mut hash_writer = sha256d::Writer::default();
        self.bitcoin_serialize(&mut hash_writer)
            .expect("sha256d::Writer is infallible");
        transaction::Hash(hash_writer.finish())
    }
}

impl Default for MutableCertificate {
    fn default() -> Self {
        MutableCertificate::new()
    }
}

impl From<&Certificate> for MutableCertificate {
    fn from(cert: &Certificate) -> Self {
        MutableCertificate {
            version: cert.version,
            sidechain_id: cert.sidechain_id,
            epoch_number: cert.epoch_number,
            quality: cert.quality,
            end_epoch_block_hash: cert.end_epoch_block_hash,
            proof: cert.proof.clone(),
            inputs: cert.inputs.clone(),
            outputs: cert.outputs.clone(),
            first_bwt_pos: cert.first_bwt_pos,
        }
    }
}

/// Freezing a mutable certificate fixes the output split and computes the
/// identity hash.
impl From<MutableCertificate> for Certificate {
    fn from(mutable: MutableCertificate) -> Self {
        let mut cert = Certificate {
            version: mutable.version,
            sidechain_id: mutable.sidechain_id,
            epoch_number: mutable.epoch_number,
            quality: mutable.quality,
            end_epoch_block_hash: mutable.end_epoch_block_hash,
            proof: mutable.proof,
            inputs: mutable.inputs,
            outputs: mutable.outputs,
            first_bwt_pos: mutable.first_bwt_pos,
            hash: transaction::Hash([0; 32]),
        };
        cert.hash = transaction::Hash::from(&cert);
        cert
    }
}
