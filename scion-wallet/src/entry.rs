//! Wallet entries: a tracked transaction or certificate plus the chain
//! context needed to decide output maturity.

use std::io::{self, Read};

use scion_chain::{
    amount::{Amount, NonNegative},
    block::{self, merkle, Block, Height},
    certificate::{Certificate, SC_CERT_VERSION},
    transaction::{self, Transaction},
    transparent, BitcoinDeserialize, BitcoinSerialize, SerializationError,
};

use bitcoin_serde_derive::{BtcDeserialize, BtcSerialize};

use crate::keystore::KeyOwnership;

/// A ledger item tracked by the wallet: an ordinary transaction or a
/// sidechain certificate.
///
/// The two kinds share the leading `version` field on the wire, and the
/// certificate version sentinel is disjoint from every transaction version,
/// so records can be dispatched while reading.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TxOrCert {
    Tx(Transaction),
    Cert(Certificate),
}

impl TxOrCert {
    /// The ledger identity of the contained item.
    pub fn hash(&self) -> transaction::Hash {
        match self {
            TxOrCert::Tx(tx) => tx.hash(),
            TxOrCert::Cert(cert) => cert.hash(),
        }
    }

    pub fn outputs(&self) -> &[transparent::Output] {
        match self {
            TxOrCert::Tx(tx) => &tx.outputs,
            TxOrCert::Cert(cert) => cert.outputs(),
        }
    }

    pub fn is_coinbase(&self) -> bool {
        match self {
            TxOrCert::Tx(tx) => tx.is_coinbase(),
            TxOrCert::Cert(_) => false,
        }
    }

    pub fn is_certificate(&self) -> bool {
        matches!(self, TxOrCert::Cert(_))
    }

    pub fn as_certificate(&self) -> Option<&Certificate> {
        match self {
            TxOrCert::Cert(cert) => Some(cert),
            TxOrCert::Tx(_) => None,
        }
    }
}

impl BitcoinSerialize for TxOrCert {
    fn bitcoin_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
        match self {
            TxOrCert::Tx(tx) => tx.bitcoin_serialize(writer),
            TxOrCert::Cert(cert) => cert.bitcoin_serialize(writer),
        }
    }
}

impl BitcoinDeserialize for TxOrCert {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        // Peek the version, then hand the full stream (version included) to
        // the matching codec.
        let version = i32::bitcoin_deserialize(&mut reader)?;
        let reader = io::Cursor::new(version.to_le_bytes()).chain(reader);
        if version == SC_CERT_VERSION {
            Ok(TxOrCert::Cert(Certificate::bitcoin_deserialize(reader)?))
        } else {
            Ok(TxOrCert::Tx(Transaction::bitcoin_deserialize(reader)?))
        }
    }
}

/// The Merkle branch authenticating an entry inside its containing block.
#[derive(Clone, Debug, Eq, PartialEq, BtcSerialize, BtcDeserialize)]
pub struct MerkleBranch {
    /// Sibling hashes from the leaf up to the root.
    pub hashes: Vec<transaction::Hash>,
    /// The leaf position in the block's Merkle leaf order, `-1` when unset.
    pub index: i32,
}

impl MerkleBranch {
    pub fn null() -> MerkleBranch {
        MerkleBranch {
            hashes: Vec::new(),
            index: -1,
        }
    }

    pub fn is_null(&self) -> bool {
        self.index < 0
    }

    /// The root implied by folding `leaf` up through this branch.
    pub fn root_for(&self, leaf: transaction::Hash) -> Option<merkle::Root> {
        if self.index < 0 {
            return None;
        }
        Some(merkle::branch_root(leaf, &self.hashes, self.index as usize))
    }
}

/// The validity token guarding the memoized credit values.
///
/// Any reorg signal that moves the tip, re-anchors the entry, or flips the
/// cease flag produces a different token and forces recomputation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct CacheToken {
    pub tip: Option<Height>,
    pub anchor: block::Hash,
    pub ceased: bool,
    pub filter: KeyOwnership,
}

/// Memoized credit values. Never persisted: reloading a wallet recomputes
/// credit from scratch.
#[derive(Clone, Debug, Default)]
pub(crate) struct CreditCache {
    pub credit: Option<(CacheToken, Amount<NonNegative>)>,
    pub immature: Option<(CacheToken, Amount<NonNegative>)>,
}

/// A wallet entry: the payload plus block anchoring, certificate maturity
/// context, and wallet bookkeeping.
///
/// The payload is never mutated after construction; sync signals only touch
/// the surrounding context.
#[derive(Clone, Debug)]
pub struct WalletEntry {
    pub payload: TxOrCert,

    /// The hash of the containing block; the null hash for entries that are
    /// unconfirmed or conflicted.
    pub anchor_block: block::Hash,

    /// The Merkle branch tying the payload to `anchor_block`.
    pub merkle_branch: MerkleBranch,

    /// Memoized result of the last successful branch verification.
    pub merkle_verified: bool,

    /// The payload's position in the containing block's item list, `-1` when
    /// not in a block.
    pub index_in_block: i32,

    /// Confirmations this entry's backward transfers need before maturing.
    /// Supplied by the consensus layer at sync time; meaningless for plain
    /// transactions.
    pub bwt_maturity_depth: i32,

    /// Whether the sidechain ceased and voided this certificate's backward
    /// transfers. Sticky: never cleared by later signals.
    pub are_bwt_ceased: bool,

    /// Unix time at which the wallet first saw the payload.
    pub time_received: i64,

    /// Whether the payload spends from this wallet.
    pub from_me: bool,

    pub(crate) credit_cache: CreditCache,
}

impl WalletEntry {
    /// A fresh, unanchored entry.
    pub fn new(payload: TxOrCert) -> WalletEntry {
        WalletEntry {
            payload,
            anchor_block: block::Hash::null(),
            merkle_branch: MerkleBranch::null(),
            merkle_verified: false,
            index_in_block: -1,
            bwt_maturity_depth: 0,
            are_bwt_ceased: false,
            time_received: 0,
            from_me: false,
            credit_cache: CreditCache::default(),
        }
    }

    /// The ledger id this entry is stored under.
    pub fn id(&self) -> transaction::Hash {
        self.payload.hash()
    }

    /// Anchor this entry to `block`, recording its position and Merkle
    /// branch. Returns `false` (leaving the entry untouched) when the
    /// payload is not part of the block.
    pub fn anchor_to_block(&mut self, block: &Block) -> bool {
        let position = match block.position_of(self.id()) {
            Some(position) => position,
            None => return false,
        };
        let branch = merkle::branch(&block.item_ids(), position)
            .expect("position comes from the same item list");
        self.anchor_block = block.hash();
        self.index_in_block = position as i32;
        self.merkle_branch = MerkleBranch {
            hashes: branch,
            index: position as i32,
        };
        self.merkle_verified = false;
        true
    }

    /// Detach this entry from any block.
    pub fn clear_anchor(&mut self) {
        self.anchor_block = block::Hash::null();
        self.index_in_block = -1;
        self.merkle_branch = MerkleBranch::null();
        self.merkle_verified = false;
    }

    /// Verify the stored Merkle branch against `root`, memoizing success.
    pub fn verify_merkle_branch(&mut self, root: merkle::Root) -> bool {
        if self.merkle_verified {
            return true;
        }
        let verified = self.merkle_branch.root_for(self.id()) == Some(root);
        if verified {
            self.merkle_verified = true;
        }
        verified
    }

    pub(crate) fn invalidate_credit_cache(&mut self) {
        self.credit_cache = CreditCache::default();
    }
}

/// Entries compare by persisted state; the credit cache is excluded, so an
/// entry equals its own persistence round-trip.
impl PartialEq for WalletEntry {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
            && self.anchor_block == other.anchor_block
            && self.merkle_branch == other.merkle_branch
            && self.merkle_verified == other.merkle_verified
            && self.index_in_block == other.index_in_block
            && self.bwt_maturity_depth == other.bwt_maturity_depth
            && self.are_bwt_ceased == other.are_bwt_ceased
            && self.time_received == other.time_received
            && self.from_me == other.from_me
    }
}

impl Eq for WalletEntry {}

impl BitcoinSerialize for WalletEntry {
    fn bitcoin_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.payload.bitcoin_serialize(&mut writer)?;
        self.anchor_block.bitcoin_serialize(&mut writer)?;
        self.merkle_branch.bitcoin_serialize(&mut writer)?;
        self.index_in_block.bitcoin_serialize(&mut writer)?;
        self.merkle_verified.bitcoin_serialize(&mut writer)?;
        self.bwt_maturity_depth.bitcoin_serialize(&mut writer)?;
        self.are_bwt_ceased.bitcoin_serialize(&mut writer)?;
        self.time_received.bitcoin_serialize(&mut writer)?;
        self.from_me.bitcoin_serialize(&mut writer)?;
        Ok(())
    }
}

impl BitcoinDeserialize for WalletEntry {
    fn bitcoin_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(WalletEntry {
            payload: TxOrCert::bitcoin_deserialize(&mut reader)?,
            anchor_block: block::Hash::bitcoin_deserialize(&mut reader)?,
            merkle_branch: MerkleBranch::bitcoin_deserialize(&mut reader)?,
            index_in_block: i32::bitcoin_deserialize(&mut reader)?,
            merkle_verified: bool::bitcoin_deserialize(&mut reader)?,
            bwt_maturity_depth: i32::bitcoin_deserialize(&mut reader)?,
            are_bwt_ceased: bool::bitcoin_deserialize(&mut reader)?,
            time_received: i64::bitcoin_deserialize(&mut reader)?,
            from_me: bool::bitcoin_deserialize(&mut reader)?,
            credit_cache: CreditCache::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scion_chain::certificate::MutableCertificate;

    fn sample_cert_entry() -> WalletEntry {
        let mut mutable = MutableCertificate::new();
        mutable.epoch_number = 7;
        WalletEntry::new(TxOrCert::Cert(mutable.into()))
    }

    #[test]
    fn entry_codec_roundtrips() {
        let mut entry = sample_cert_entry();
        entry.bwt_maturity_depth = 25;
        entry.are_bwt_ceased = true;
        entry.time_received = 1_700_000_000;

        let data = entry.bitcoin_serialize_to_vec().expect("entry serializes");
        let parsed = WalletEntry::bitcoin_deserialize(&data[..]).expect("entry deserializes");
        assert_eq!(parsed, entry);
        assert_eq!(parsed.id(), entry.id());
    }

    #[test]
    fn payload_dispatch_distinguishes_tx_and_cert() {
        let cert_entry = sample_cert_entry();
        let data = cert_entry
            .payload
            .bitcoin_serialize_to_vec()
            .expect("payload serializes");
        let parsed = TxOrCert::bitcoin_deserialize(&data[..]).expect("payload deserializes");
        assert!(parsed.is_certificate());

        let tx = Transaction::new(1, Vec::new(), Vec::new(), scion_chain::transaction::LockTime(0));
        let data = TxOrCert::Tx(tx)
            .bitcoin_serialize_to_vec()
            .expect("payload serializes");
        let parsed = TxOrCert::bitcoin_deserialize(&data[..]).expect("payload deserializes");
        assert!(!parsed.is_certificate());
    }

    #[test]
    fn anchoring_records_position_and_branch() {
        use scion_chain::block::Header;

        let mut entry = sample_cert_entry();
        let cert = entry.payload.as_certificate().expect("cert entry").clone();
        let mut block = Block {
            header: Header {
                version: 4,
                previous_block_hash: block::Hash([1; 32]),
                merkle_root: merkle::Root([0; 32]),
                time: 0,
                difficulty_threshold: 0,
                nonce: 0,
            },
            transactions: Vec::new(),
            certificates: vec![cert],
        };
        block.header.merkle_root = block.merkle_root();

        assert!(entry.anchor_to_block(&block));
        assert_eq!(entry.anchor_block, block.hash());
        assert_eq!(entry.index_in_block, 0);
        assert!(entry.verify_merkle_branch(block.header.merkle_root));
        assert!(entry.merkle_verified);

        entry.clear_anchor();
        assert!(entry.anchor_block.is_null());
        assert_eq!(entry.index_in_block, -1);
        assert!(entry.merkle_branch.is_null());
    }
}
