//! Wallet-side tracking of sidechain backward-transfer certificates.
//!
//! The wallet maps ledger ids to [`entry::WalletEntry`] values, each bundling
//! a transaction or certificate with the chain context needed to classify its
//! outputs as spendable. Certificates carry a per-entry maturity depth that
//! applies only to their backward-transfer outputs, and a cease flag that
//! voids those outputs when the sidechain is proven dead; the
//! [`maturity`] evaluator turns that state plus a [`chain_view::ChainView`]
//! snapshot into per-output maturity and credit totals.

pub mod chain_view;
mod config;
pub mod db;
pub mod entry;
mod error;
pub mod keystore;
pub mod maturity;
mod store;

pub use config::Config;
pub use error::{DbStatus, WalletError};
pub use store::Wallet;
