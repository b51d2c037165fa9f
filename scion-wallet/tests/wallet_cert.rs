//! End-to-end wallet tests for certificate tracking: output maturity,
//! credit aggregation, sync signals, and persistence across restarts.

use std::convert::TryFrom;
use std::path::PathBuf;
use std::sync::Arc;

use tempdir::TempDir;

use scion_chain::{
    amount::{Amount, NegativeAllowed},
    block::{self, merkle, Block, Header},
    certificate::{BackwardTransfer, Certificate, MutableCertificate, SidechainId},
    parameters::COINBASE_MATURITY,
    transaction::{self, LockTime, Transaction, TRANSPARENT_TX_VERSION},
    transparent::{CoinbaseData, Input, OutPoint, Output, Script},
};
use scion_wallet::{
    chain_view::MemoryChainView,
    db::DbEnv,
    keystore::KeyOwnership,
    maturity::OutputMaturity,
    DbStatus, Wallet,
};

const WALLET_KEY_HASH: [u8; 20] = [0x02; 20];

fn amount(value: i64) -> Amount<NegativeAllowed> {
    Amount::try_from(value).expect("test amount is in range")
}

fn p2pkh_output(value: i64, pub_key_hash: [u8; 20]) -> Output {
    Output {
        value: amount(value),
        lock_script: Script::new_pay_to_pub_key_hash(pub_key_hash),
    }
}

#[allow(clippy::too_many_arguments)]
fn create_certificate(
    sidechain_byte: u8,
    epoch_number: i32,
    end_epoch_byte: u8,
    change_total: i64,
    num_change: usize,
    bwt_total: i64,
    num_bwt: usize,
    pub_key_hash: [u8; 20],
) -> Certificate {
    let mut mutable = MutableCertificate::new();
    mutable.sidechain_id = SidechainId([sidechain_byte; 32]);
    mutable.epoch_number = epoch_number;
    mutable.quality = 3;
    mutable.end_epoch_block_hash = block::Hash([end_epoch_byte; 32]);
    mutable.inputs.push(Input::PrevOut {
        outpoint: OutPoint {
            hash: transaction::Hash([0xad; 32]),
            index: 0,
        },
        unlock_script: Script(Vec::new()),
        sequence: 0,
    });
    for _ in 0..num_change {
        mutable.push_change(p2pkh_output(change_total / num_change as i64, pub_key_hash));
    }
    for _ in 0..num_bwt {
        mutable.push_backward_transfer(BackwardTransfer {
            value: amount(bwt_total / num_bwt as i64),
            pub_key_hash,
        });
    }
    mutable.into()
}

fn create_coinbase(value: i64, pub_key_hash: [u8; 20]) -> Transaction {
    Transaction::new(
        TRANSPARENT_TX_VERSION,
        vec![Input::Coinbase {
            data: CoinbaseData::new(vec![0x01, 0x02]),
            sequence: u32::max_value(),
        }],
        vec![p2pkh_output(value, pub_key_hash)],
        LockTime(0),
    )
}

fn create_transparent_tx(value: i64, pub_key_hash: [u8; 20]) -> Transaction {
    Transaction::new(
        TRANSPARENT_TX_VERSION,
        vec![Input::PrevOut {
            outpoint: OutPoint {
                hash: transaction::Hash([0xaa; 32]),
                index: 0,
            },
            unlock_script: Script(Vec::new()),
            sequence: 10,
        }],
        vec![p2pkh_output(value, pub_key_hash)],
        LockTime(0),
    )
}

fn block_with(transactions: Vec<Transaction>, certificates: Vec<Certificate>) -> Block {
    let mut block = Block {
        header: Header {
            version: 4,
            previous_block_hash: block::Hash([0x11; 32]),
            merkle_root: merkle::Root([0; 32]),
            time: 1_600_000_000,
            difficulty_threshold: 0x1d00_ffff,
            nonce: 7,
        },
        transactions: transactions.into_iter().map(Arc::new).collect(),
        certificates,
    };
    block.header.merkle_root = block.merkle_root();
    block
}

struct TestWallet {
    wallet: Wallet,
    env: Arc<DbEnv>,
    path: PathBuf,
    _dir: TempDir,
}

fn new_test_wallet() -> TestWallet {
    let dir = TempDir::new("scion-wallet-test").expect("create temp dir");
    let env = DbEnv::new();
    let path = dir.path().join("wallet-db");
    let wallet = Wallet::new(env.open(&path).expect("open wallet db"));
    TestWallet {
        wallet,
        env,
        path,
        _dir: dir,
    }
}

/// Sync a freshly created certificate into a wallet, anchored at height 101.
fn anchored_cert_fixture(
    change_total: i64,
    num_change: usize,
    bwt_total: i64,
    num_bwt: usize,
    bwt_maturity_depth: i32,
    ceased: bool,
) -> (TestWallet, MemoryChainView, transaction::Hash, u32) {
    let fixture = new_test_wallet();
    fixture.wallet.add_pub_key_hash(WALLET_KEY_HASH);

    let cert = create_certificate(
        0xaa,
        0,
        0xcc,
        change_total,
        num_change,
        bwt_total,
        num_bwt,
        WALLET_KEY_HASH,
    );
    let cert_block = block_with(Vec::new(), vec![cert.clone()]);

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);
    let creation_height = view.connect_block(&cert_block).0;

    assert!(fixture
        .wallet
        .sync_certificate(&cert, Some(&cert_block), bwt_maturity_depth)
        .is_ok());
    if ceased {
        assert!(fixture
            .wallet
            .sync_voided_certificate(cert.hash(), true)
            .is_ok());
    }

    (fixture, view, cert.hash(), creation_height)
}

fn credit(fixture: &TestWallet, view: &MemoryChainView, id: transaction::Hash) -> i64 {
    i64::from(
        fixture
            .wallet
            .credit(view, id, KeyOwnership::SPENDABLE)
            .expect("credit evaluation succeeds"),
    )
}

fn immature_credit(fixture: &TestWallet, view: &MemoryChainView, id: transaction::Hash) -> i64 {
    i64::from(
        fixture
            .wallet
            .immature_credit(view, id, KeyOwnership::SPENDABLE)
            .expect("immature credit evaluation succeeds"),
    )
}

fn maturity(
    fixture: &TestWallet,
    view: &MemoryChainView,
    id: transaction::Hash,
    pos: usize,
) -> OutputMaturity {
    fixture
        .wallet
        .output_maturity(view, id, pos)
        .expect("entry is in the wallet")
}

///////////////////////////////////////////////////////////////////////////////
// Wallet database construction machinery
///////////////////////////////////////////////////////////////////////////////

#[test]
fn db_env_use_count_and_close_machinery() {
    let dir = TempDir::new("scion-db-env-test").expect("create temp dir");
    let env = DbEnv::new();
    let path = dir.path().join("aRandomWallet");

    assert_eq!(env.use_count(&path), 0);
    assert!(!env.is_registered(&path));

    let first = env.open(&path).expect("first open succeeds");
    assert_eq!(env.use_count(&path), 1);
    assert!(env.is_open(&path));

    let second = env.open(&path).expect("second open attaches");
    assert_eq!(env.use_count(&path), 2);

    drop(second);
    assert_eq!(env.use_count(&path), 1);

    drop(first);
    assert_eq!(env.use_count(&path), 0);
    // the file object outlives the last handle until an explicit close
    assert!(env.is_open(&path));

    env.close_db(&path);
    assert!(!env.is_open(&path));
    assert!(env.is_registered(&path));
}

///////////////////////////////////////////////////////////////////////////////
// Load from db
///////////////////////////////////////////////////////////////////////////////

#[test]
fn wallet_cert_survives_load_from_db() {
    let fixture = new_test_wallet();
    let cert = create_certificate(0xaa, 0, 0xbb, 4, 2, 10, 4, WALLET_KEY_HASH);
    let cert_block = block_with(Vec::new(), vec![cert.clone()]);
    assert!(fixture
        .wallet
        .sync_certificate(&cert, Some(&cert_block), 7)
        .is_ok());

    let reader = Wallet::new(fixture.env.open(&fixture.path).expect("attach to wallet db"));
    assert_eq!(reader.load_wallet(), DbStatus::Ok);
    let loaded = reader.get(cert.hash()).expect("entry was loaded");
    let original = fixture.wallet.get(cert.hash()).expect("entry is present");
    assert_eq!(loaded, original);
    assert_eq!(loaded.payload.as_certificate(), Some(&cert));
}

#[test]
fn wallet_tx_survives_load_from_db() {
    let fixture = new_test_wallet();
    let tx = create_transparent_tx(10, WALLET_KEY_HASH);
    assert!(fixture.wallet.sync_transaction(&tx, None).is_ok());

    let reader = Wallet::new(fixture.env.open(&fixture.path).expect("attach to wallet db"));
    assert_eq!(reader.load_wallet(), DbStatus::Ok);
    let loaded = reader.get(tx.hash()).expect("entry was loaded");
    assert_eq!(loaded, fixture.wallet.get(tx.hash()).expect("entry"));
    assert!(loaded.anchor_block.is_null());
}

///////////////////////////////////////////////////////////////////////////////
// IsOutputMature
///////////////////////////////////////////////////////////////////////////////

#[test]
fn output_maturity_transparent_tx_in_blockchain() {
    let fixture = new_test_wallet();
    let tx = create_transparent_tx(10, WALLET_KEY_HASH);
    let tx_block = block_with(vec![tx.clone()], Vec::new());

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);
    view.connect_block(&tx_block);

    assert!(fixture.wallet.sync_transaction(&tx, Some(&tx_block)).is_ok());

    assert_eq!(
        maturity(&fixture, &view, tx.hash(), 0),
        OutputMaturity::Mature
    );
}

#[test]
fn output_maturity_coinbase_in_blockchain() {
    let fixture = new_test_wallet();
    let coinbase = create_coinbase(10, WALLET_KEY_HASH);
    let coinbase_block = block_with(vec![coinbase.clone()], Vec::new());

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);
    let creation_height = view.connect_block(&coinbase_block).0;

    assert!(fixture
        .wallet
        .sync_transaction(&coinbase, Some(&coinbase_block))
        .is_ok());
    let id = coinbase.hash();

    for height in creation_height..creation_height + COINBASE_MATURITY {
        view.set_tip_height(height);
        assert_eq!(
            maturity(&fixture, &view, id, 0),
            OutputMaturity::Immature,
            "coinbase at height {}",
            height
        );
    }

    view.set_tip_height(creation_height + COINBASE_MATURITY);
    assert_eq!(maturity(&fixture, &view, id, 0), OutputMaturity::Mature);

    // no hysteresis
    view.set_tip_height(creation_height + COINBASE_MATURITY - 1);
    assert_eq!(maturity(&fixture, &view, id, 0), OutputMaturity::Immature);
}

#[test]
fn output_maturity_certificate_in_blockchain() {
    let (fixture, mut view, id, creation_height) = anchored_cert_fixture(4, 2, 10, 4, 25, false);
    let last_output = 5;

    for height in creation_height..creation_height + 25 {
        view.set_tip_height(height);
        assert_eq!(
            maturity(&fixture, &view, id, 0),
            OutputMaturity::Mature,
            "change output at height {}",
            height
        );
        assert_eq!(
            maturity(&fixture, &view, id, last_output),
            OutputMaturity::Immature,
            "backward transfer at height {}",
            height
        );
    }

    view.set_tip_height(creation_height + 25);
    assert_eq!(maturity(&fixture, &view, id, 0), OutputMaturity::Mature);
    assert_eq!(
        maturity(&fixture, &view, id, last_output),
        OutputMaturity::Mature
    );

    // no hysteresis: walking the tip back re-immatures the backward transfers
    for height in (creation_height..creation_height + 25).rev() {
        view.set_tip_height(height);
        assert_eq!(maturity(&fixture, &view, id, 0), OutputMaturity::Mature);
        assert_eq!(
            maturity(&fixture, &view, id, last_output),
            OutputMaturity::Immature
        );
    }
}

#[test]
fn output_maturity_transparent_tx_in_mempool() {
    let fixture = new_test_wallet();
    let tx = create_transparent_tx(10, WALLET_KEY_HASH);

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);
    view.add_to_mempool(tx.hash());

    assert!(fixture.wallet.sync_transaction(&tx, None).is_ok());

    assert_eq!(
        maturity(&fixture, &view, tx.hash(), 0),
        OutputMaturity::Mature
    );
}

#[test]
fn output_maturity_certificate_in_mempool() {
    let fixture = new_test_wallet();
    let cert = create_certificate(0xaa, 12, 0xcc, 4, 2, 10, 4, WALLET_KEY_HASH);

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);
    view.add_to_mempool(cert.hash());

    assert!(fixture.wallet.sync_certificate(&cert, None, 0).is_ok());

    assert_eq!(
        maturity(&fixture, &view, cert.hash(), 0),
        OutputMaturity::Mature
    );
    assert_eq!(
        maturity(&fixture, &view, cert.hash(), 5),
        OutputMaturity::Immature
    );
}

#[test]
fn output_maturity_conflicted_entries() {
    let fixture = new_test_wallet();
    let tx = create_transparent_tx(10, WALLET_KEY_HASH);
    let coinbase = create_coinbase(10, WALLET_KEY_HASH);
    let cert = create_certificate(0xaa, 12, 0xcc, 4, 2, 10, 4, WALLET_KEY_HASH);

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);

    assert!(fixture.wallet.sync_transaction(&tx, None).is_ok());
    assert!(fixture.wallet.sync_transaction(&coinbase, None).is_ok());
    assert!(fixture.wallet.sync_certificate(&cert, None, 0).is_ok());

    assert_eq!(
        maturity(&fixture, &view, tx.hash(), 0),
        OutputMaturity::NotApplicable
    );
    assert_eq!(
        maturity(&fixture, &view, coinbase.hash(), 0),
        OutputMaturity::NotApplicable
    );
    assert_eq!(
        maturity(&fixture, &view, cert.hash(), 0),
        OutputMaturity::NotApplicable
    );
    assert_eq!(
        maturity(&fixture, &view, cert.hash(), 5),
        OutputMaturity::NotApplicable
    );
}

///////////////////////////////////////////////////////////////////////////////
// GetCredit
///////////////////////////////////////////////////////////////////////////////

#[test]
fn credit_coinbase_matures_after_one_hundred_blocks() {
    let fixture = new_test_wallet();
    fixture.wallet.add_pub_key_hash(WALLET_KEY_HASH);
    let coinbase = create_coinbase(10, WALLET_KEY_HASH);
    let coinbase_block = block_with(vec![coinbase.clone()], Vec::new());

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);
    let creation_height = view.connect_block(&coinbase_block).0;
    assert!(fixture
        .wallet
        .sync_transaction(&coinbase, Some(&coinbase_block))
        .is_ok());
    let id = coinbase.hash();

    for height in creation_height..creation_height + COINBASE_MATURITY {
        view.set_tip_height(height);
        assert_eq!(credit(&fixture, &view, id), 0, "at height {}", height);
    }

    view.set_tip_height(creation_height + COINBASE_MATURITY);
    assert_eq!(credit(&fixture, &view, id), 10);

    // no hysteresis
    for height in (creation_height..creation_height + COINBASE_MATURITY).rev() {
        view.set_tip_height(height);
        assert_eq!(credit(&fixture, &view, id), 0, "at height {}", height);
    }
}

#[test]
fn credit_full_certificate_not_voided() {
    let (fixture, mut view, id, creation_height) = anchored_cert_fixture(20, 2, 12, 4, 25, false);

    for height in creation_height..creation_height + 25 {
        view.set_tip_height(height);
        assert_eq!(credit(&fixture, &view, id), 20, "at height {}", height);
    }

    view.set_tip_height(creation_height + 25);
    assert_eq!(credit(&fixture, &view, id), 32);

    for height in (creation_height..creation_height + 25).rev() {
        view.set_tip_height(height);
        assert_eq!(credit(&fixture, &view, id), 20, "at height {}", height);
    }
}

#[test]
fn credit_bwt_only_certificate_not_voided() {
    let (fixture, mut view, id, creation_height) = anchored_cert_fixture(0, 0, 12, 4, 25, false);

    for height in creation_height..creation_height + 25 {
        view.set_tip_height(height);
        assert_eq!(credit(&fixture, &view, id), 0, "at height {}", height);
    }

    view.set_tip_height(creation_height + 25);
    assert_eq!(credit(&fixture, &view, id), 12);

    for height in (creation_height..creation_height + 25).rev() {
        view.set_tip_height(height);
        assert_eq!(credit(&fixture, &view, id), 0, "at height {}", height);
    }
}

#[test]
fn credit_no_bwt_certificate_not_voided() {
    let (fixture, mut view, id, creation_height) = anchored_cert_fixture(20, 2, 0, 0, 25, false);

    for height in creation_height..=creation_height + 25 {
        view.set_tip_height(height);
        assert_eq!(credit(&fixture, &view, id), 20, "at height {}", height);
    }
}

#[test]
fn credit_full_certificate_voided() {
    let (fixture, mut view, id, creation_height) = anchored_cert_fixture(20, 2, 12, 4, 25, true);

    // ceased backward transfers never contribute, at any depth
    for height in creation_height..=creation_height + 25 {
        view.set_tip_height(height);
        assert_eq!(credit(&fixture, &view, id), 20, "at height {}", height);
    }

    view.set_tip_height(creation_height + 25);
    assert_eq!(
        maturity(&fixture, &view, id, 5),
        OutputMaturity::NotApplicable
    );
}

#[test]
fn credit_bwt_only_certificate_voided() {
    let (fixture, mut view, id, creation_height) = anchored_cert_fixture(0, 0, 12, 4, 25, true);

    for height in creation_height..=creation_height + 25 {
        view.set_tip_height(height);
        assert_eq!(credit(&fixture, &view, id), 0, "at height {}", height);
    }
}

#[test]
fn credit_ignores_outputs_not_owned_by_the_wallet() {
    // same certificate, but the wallet never learns the key
    let fixture = new_test_wallet();
    let cert = create_certificate(0xaa, 0, 0xcc, 20, 2, 12, 4, WALLET_KEY_HASH);
    let cert_block = block_with(Vec::new(), vec![cert.clone()]);

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);
    view.connect_block(&cert_block);
    assert!(fixture
        .wallet
        .sync_certificate(&cert, Some(&cert_block), 25)
        .is_ok());

    view.set_tip_height(200);
    assert_eq!(credit(&fixture, &view, cert.hash()), 0);
    assert_eq!(immature_credit(&fixture, &view, cert.hash()), 0);
}

///////////////////////////////////////////////////////////////////////////////
// GetImmatureCredit
///////////////////////////////////////////////////////////////////////////////

#[test]
fn immature_credit_coinbase() {
    let fixture = new_test_wallet();
    fixture.wallet.add_pub_key_hash(WALLET_KEY_HASH);
    let coinbase = create_coinbase(10, WALLET_KEY_HASH);
    let coinbase_block = block_with(vec![coinbase.clone()], Vec::new());

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);
    let creation_height = view.connect_block(&coinbase_block).0;
    assert!(fixture
        .wallet
        .sync_transaction(&coinbase, Some(&coinbase_block))
        .is_ok());
    let id = coinbase.hash();

    for height in creation_height..creation_height + COINBASE_MATURITY {
        view.set_tip_height(height);
        assert_eq!(
            immature_credit(&fixture, &view, id),
            10,
            "at height {}",
            height
        );
    }

    view.set_tip_height(creation_height + COINBASE_MATURITY);
    assert_eq!(immature_credit(&fixture, &view, id), 0);

    // no hysteresis
    for height in (creation_height..creation_height + COINBASE_MATURITY).rev() {
        view.set_tip_height(height);
        assert_eq!(
            immature_credit(&fixture, &view, id),
            10,
            "at height {}",
            height
        );
    }
}

#[test]
fn immature_credit_full_certificate_not_voided() {
    let (fixture, mut view, id, creation_height) = anchored_cert_fixture(20, 2, 12, 4, 5, false);

    for height in creation_height..creation_height + 5 {
        view.set_tip_height(height);
        assert_eq!(
            immature_credit(&fixture, &view, id),
            12,
            "at height {}",
            height
        );
    }

    view.set_tip_height(creation_height + 5);
    assert_eq!(immature_credit(&fixture, &view, id), 0);

    for height in (creation_height..creation_height + 5).rev() {
        view.set_tip_height(height);
        assert_eq!(
            immature_credit(&fixture, &view, id),
            12,
            "at height {}",
            height
        );
    }
}

#[test]
fn immature_credit_no_bwt_certificate() {
    let (fixture, mut view, id, creation_height) = anchored_cert_fixture(20, 2, 0, 0, 3, false);

    for height in creation_height..=creation_height + 3 {
        view.set_tip_height(height);
        assert_eq!(
            immature_credit(&fixture, &view, id),
            0,
            "at height {}",
            height
        );
    }
}

#[test]
fn immature_credit_voided_certificate_is_zero() {
    let (fixture, mut view, id, creation_height) = anchored_cert_fixture(20, 2, 12, 4, 5, true);

    for height in creation_height..=creation_height + 5 {
        view.set_tip_height(height);
        assert_eq!(
            immature_credit(&fixture, &view, id),
            0,
            "at height {}",
            height
        );
    }
}

#[test]
fn mempool_bwt_only_certificate_has_no_credit_of_either_kind() {
    let fixture = new_test_wallet();
    fixture.wallet.add_pub_key_hash(WALLET_KEY_HASH);
    let cert = create_certificate(0xaa, 0, 0xcc, 0, 0, 12, 2, WALLET_KEY_HASH);

    let mut view = MemoryChainView::new();
    view.set_tip_height(100);
    view.add_to_mempool(cert.hash());
    assert!(fixture.wallet.sync_certificate(&cert, None, 25).is_ok());

    assert_eq!(
        maturity(&fixture, &view, cert.hash(), 0),
        OutputMaturity::Immature
    );
    assert_eq!(credit(&fixture, &view, cert.hash()), 0);
    // mempool backward transfers do not count toward immature credit
    assert_eq!(immature_credit(&fixture, &view, cert.hash()), 0);
}

///////////////////////////////////////////////////////////////////////////////
// Sync signals
///////////////////////////////////////////////////////////////////////////////

#[test]
fn sync_certificate_persists_across_restart() {
    let fixture = new_test_wallet();
    let cert = create_certificate(0xaa, 0, 0xcc, 20, 2, 10, 2, WALLET_KEY_HASH);
    let cert_block = block_with(Vec::new(), vec![cert.clone()]);

    assert!(fixture
        .wallet
        .sync_certificate(&cert, Some(&cert_block), 10)
        .is_ok());
    let before = fixture.wallet.get(cert.hash()).expect("entry is present");
    assert_eq!(before.bwt_maturity_depth, 10);

    // close and reopen the wallet
    let TestWallet {
        wallet,
        env,
        path,
        _dir,
    } = fixture;
    drop(wallet);
    env.close_db(&path);

    let reopened = Wallet::new(env.open(&path).expect("reopen wallet db"));
    assert!(!reopened.contains(cert.hash()));
    assert_eq!(reopened.load_wallet(), DbStatus::Ok);

    let after = reopened.get(cert.hash()).expect("entry was reloaded");
    assert_eq!(after.bwt_maturity_depth, 10);
    assert_eq!(after, before);
    assert_eq!(after.payload.as_certificate(), Some(&cert));
}

#[test]
fn sync_voided_certificate_persists_across_restart() {
    let fixture = new_test_wallet();
    let cert = create_certificate(0xaa, 0, 0xcc, 20, 2, 10, 2, WALLET_KEY_HASH);
    let cert_block = block_with(Vec::new(), vec![cert.clone()]);
    assert!(fixture
        .wallet
        .sync_certificate(&cert, Some(&cert_block), 10)
        .is_ok());

    assert!(fixture
        .wallet
        .sync_voided_certificate(cert.hash(), true)
        .is_ok());
    let before = fixture.wallet.get(cert.hash()).expect("entry is present");
    assert!(before.are_bwt_ceased);

    let TestWallet {
        wallet,
        env,
        path,
        _dir,
    } = fixture;
    drop(wallet);
    env.close_db(&path);

    let reopened = Wallet::new(env.open(&path).expect("reopen wallet db"));
    assert_eq!(reopened.load_wallet(), DbStatus::Ok);
    let after = reopened.get(cert.hash()).expect("entry was reloaded");
    assert!(after.are_bwt_ceased);
    assert_eq!(after, before);
}

#[test]
fn sync_voided_certificate_for_unknown_id_is_a_noop() {
    let fixture = new_test_wallet();
    assert_eq!(
        fixture
            .wallet
            .sync_voided_certificate(transaction::Hash([9; 32]), true),
        DbStatus::Ok
    );
    assert!(fixture.wallet.is_empty());
}

#[test]
fn sync_certificate_is_idempotent() {
    let fixture = new_test_wallet();
    let cert = create_certificate(0xaa, 0, 0xcc, 20, 2, 10, 2, WALLET_KEY_HASH);
    let cert_block = block_with(Vec::new(), vec![cert.clone()]);

    assert!(fixture
        .wallet
        .sync_certificate(&cert, Some(&cert_block), 10)
        .is_ok());
    let first = fixture.wallet.get(cert.hash()).expect("entry is present");

    assert!(fixture
        .wallet
        .sync_certificate(&cert, Some(&cert_block), 10)
        .is_ok());
    let second = fixture.wallet.get(cert.hash()).expect("entry is present");

    assert_eq!(fixture.wallet.len(), 1);
    assert_eq!(first, second);
}

#[test]
fn resync_updates_anchor_and_maturity_depth() {
    let fixture = new_test_wallet();
    let cert = create_certificate(0xaa, 0, 0xcc, 20, 2, 10, 2, WALLET_KEY_HASH);

    assert!(fixture.wallet.sync_certificate(&cert, None, 0).is_ok());
    assert!(fixture
        .wallet
        .get(cert.hash())
        .expect("entry")
        .anchor_block
        .is_null());

    let cert_block = block_with(Vec::new(), vec![cert.clone()]);
    assert!(fixture
        .wallet
        .sync_certificate(&cert, Some(&cert_block), 25)
        .is_ok());

    let entry = fixture.wallet.get(cert.hash()).expect("entry");
    assert_eq!(entry.anchor_block, cert_block.hash());
    assert_eq!(entry.bwt_maturity_depth, 25);
    assert_eq!(entry.index_in_block, 0);
    assert_eq!(fixture.wallet.len(), 1);
}

///////////////////////////////////////////////////////////////////////////////
// Entry persistence codec
///////////////////////////////////////////////////////////////////////////////

proptest::proptest! {
    #[test]
    fn wallet_entry_codec_roundtrips_for_any_certificate(
        cert in proptest::prelude::any::<Certificate>(),
        bwt_maturity_depth in 0i32..1_000,
        are_bwt_ceased in proptest::prelude::any::<bool>(),
    ) {
        use scion_chain::{BitcoinDeserialize, BitcoinSerialize};
        use scion_wallet::entry::{TxOrCert, WalletEntry};

        let mut entry = WalletEntry::new(TxOrCert::Cert(cert));
        entry.bwt_maturity_depth = bwt_maturity_depth;
        entry.are_bwt_ceased = are_bwt_ceased;
        entry.time_received = 1_700_000_000;

        let data = entry.bitcoin_serialize_to_vec().expect("entry serializes");
        let parsed = WalletEntry::bitcoin_deserialize(&data[..]).expect("entry deserializes");
        proptest::prop_assert_eq!(&parsed, &entry);
        proptest::prop_assert_eq!(parsed.id(), entry.id());
    }
}

#[test]
fn zap_wallet_clears_memory_and_disk() {
    let fixture = new_test_wallet();
    let cert = create_certificate(0xaa, 0, 0xcc, 20, 2, 10, 2, WALLET_KEY_HASH);
    let tx = create_transparent_tx(10, WALLET_KEY_HASH);
    assert!(fixture.wallet.sync_certificate(&cert, None, 0).is_ok());
    assert!(fixture.wallet.sync_transaction(&tx, None).is_ok());
    assert_eq!(fixture.wallet.len(), 2);

    assert_eq!(fixture.wallet.zap_wallet(), DbStatus::Ok);
    assert!(fixture.wallet.is_empty());

    // a fresh load observes the empty disk state
    let reader = Wallet::new(fixture.env.open(&fixture.path).expect("attach to wallet db"));
    assert_eq!(reader.load_wallet(), DbStatus::Ok);
    assert!(reader.is_empty());
}
