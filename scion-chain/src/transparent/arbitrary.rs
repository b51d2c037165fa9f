use std::convert::TryFrom;

use proptest::prelude::*;

use super::{CoinbaseData, Input, OutPoint, Output, Script};
use crate::amount::Amount;

impl Arbitrary for Output {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        (0i64..=1_000_000, any::<Script>())
            .prop_map(|(value, lock_script)| Output {
                value: Amount::try_from(value).expect("value is within range"),
                lock_script,
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for Input {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        prop_oneof![
            (any::<[u8; 32]>(), any::<u32>(), any::<Script>(), any::<u32>()).prop_map(
                |(hash, index, unlock_script, sequence)| Input::PrevOut {
                    outpoint: OutPoint {
                        hash: crate::transaction::Hash(hash),
                        index,
                    },
                    unlock_script,
                    sequence,
                }
            ),
            (prop::collection::vec(any::<u8>(), 0..95), any::<u32>()).prop_map(
                |(data, sequence)| Input::Coinbase {
                    data: CoinbaseData(data),
                    sequence,
                }
            ),
        ]
        .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
