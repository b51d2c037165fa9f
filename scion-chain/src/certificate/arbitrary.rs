use std::convert::TryFrom;

use proptest::prelude::*;

use super::{BackwardTransfer, Certificate, MutableCertificate, ScProof, SidechainId};
use crate::{amount::Amount, block, transparent};

impl Arbitrary for Certificate {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            0i32..100,
            0i64..1_000,
            any::<[u8; 32]>(),
            prop::collection::vec(any::<u8>(), 0..64),
            prop::collection::vec(any::<transparent::Output>(), 0..4),
            prop::collection::vec((0i64..1_000_000, any::<[u8; 20]>()), 0..4),
        )
            .prop_map(
                |(sidechain_id, epoch_number, quality, end_hash, proof, change, backward)| {
                    let mut mutable = MutableCertificate::new();
                    mutable.sidechain_id = SidechainId(sidechain_id);
                    mutable.epoch_number = epoch_number;
                    mutable.quality = quality;
                    mutable.end_epoch_block_hash = block::Hash(end_hash);
                    mutable.proof = ScProof(proof);
                    for output in change {
                        mutable.push_change(output);
                    }
                    for (value, pub_key_hash) in backward {
                        mutable.push_backward_transfer(BackwardTransfer {
                            value: Amount::try_from(value).expect("value is within range"),
                            pub_key_hash,
                        });
                    }
                    mutable.into()
                },
            )
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
