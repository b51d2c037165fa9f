//! Error types and status codes for the wallet store.

use displaydoc::Display;
use thiserror::Error;

use scion_chain::{amount, transaction, SerializationError};

/// The flat status code returned by the wallet store's public operations.
///
/// These mirror the wallet database error codes of the original node: a
/// caller decides between continuing, rescanning, or aborting based on the
/// worst status seen.
#[must_use = "wallet store status codes must be checked"]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DbStatus {
    /// The operation completed.
    Ok,
    /// On-disk data was damaged beyond recovery; damaged records were skipped.
    Corrupt,
    /// Records were readable but must be rewritten in the current format.
    NeedRewrite,
    /// A transient I/O failure; retrying may succeed.
    LoadFail,
    /// Something non-fatal went wrong; in-memory state is still consistent.
    NoncriticalError,
    /// A record was written by a future format version.
    TooNew,
}

impl DbStatus {
    pub fn is_ok(self) -> bool {
        self == DbStatus::Ok
    }
}

/// An error from the wallet store internals.
#[derive(Display, Error, Debug)]
pub enum WalletError {
    /// wallet database error: {0}
    Db(#[from] sled::Error),
    /// wallet record serialization error: {0}
    Serialization(#[from] SerializationError),
    /// amount out of range: {0}
    Amount(#[from] amount::Error),
    /// no wallet entry for {0}
    NotFound(transaction::Hash),
    /// wallet record format version {0} is newer than this build understands
    TooNew(u8),
}
