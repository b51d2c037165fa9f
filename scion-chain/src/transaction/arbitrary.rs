use proptest::prelude::*;

use super::{LockTime, Transaction};
use crate::transparent;

impl Arbitrary for Transaction {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        (
            any::<i32>(),
            prop::collection::vec(any::<transparent::Input>(), 0..4),
            prop::collection::vec(any::<transparent::Output>(), 0..4),
            any::<u32>(),
        )
            .prop_map(|(version, inputs, outputs, lock_time)| {
                Transaction::new(version, inputs, outputs, LockTime(lock_time))
            })
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
