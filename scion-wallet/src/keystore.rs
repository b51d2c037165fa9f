//! Lock-script ownership tracking.
//!
//! The credit evaluator only needs to know whether the wallet can sign for
//! an output's lock script, not the key material itself, so the store maps
//! scripts to an ownership class.

use std::collections::HashMap;

use bitflags::bitflags;

use scion_chain::transparent::Script;

bitflags! {
    /// How the wallet relates to a lock script.
    pub struct KeyOwnership: u8 {
        /// The wallet watches the script but cannot sign for it.
        const WATCH_ONLY = 0b01;
        /// The wallet holds the signing key.
        const SPENDABLE = 0b10;
        /// Any relationship at all.
        const ALL = 0b11;
    }
}

/// The set of lock scripts the wallet recognizes as its own.
#[derive(Clone, Debug, Default)]
pub struct KeyStore {
    scripts: HashMap<Script, KeyOwnership>,
}

impl KeyStore {
    pub fn new() -> KeyStore {
        KeyStore::default()
    }

    /// Register `script` with the given ownership class.
    pub fn add_script(&mut self, script: Script, ownership: KeyOwnership) {
        self.scripts.insert(script, ownership);
    }

    /// Register the canonical pay-to-pubkey-hash script over `pub_key_hash`
    /// as spendable.
    pub fn add_pub_key_hash(&mut self, pub_key_hash: [u8; 20]) {
        self.add_script(
            Script::new_pay_to_pub_key_hash(pub_key_hash),
            KeyOwnership::SPENDABLE,
        );
    }

    /// The wallet's relationship to `script`; empty when unknown.
    pub fn ownership(&self, script: &Script) -> KeyOwnership {
        self.scripts
            .get(script)
            .copied()
            .unwrap_or_else(KeyOwnership::empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_script_is_unowned() {
        let keystore = KeyStore::new();
        assert_eq!(
            keystore.ownership(&Script(vec![0x51])),
            KeyOwnership::empty()
        );
    }

    #[test]
    fn registered_pub_key_hash_is_spendable() {
        let mut keystore = KeyStore::new();
        keystore.add_pub_key_hash([3; 20]);

        let script = Script::new_pay_to_pub_key_hash([3; 20]);
        assert_eq!(keystore.ownership(&script), KeyOwnership::SPENDABLE);
        assert!(keystore.ownership(&script).intersects(KeyOwnership::ALL));
    }
}
