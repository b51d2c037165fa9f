//! Consensus parameters.

/// The number of confirmations a coinbase output needs before it can be spent.
pub const COINBASE_MATURITY: u32 = 100;
