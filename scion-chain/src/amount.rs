//! Strongly-typed monetary amounts.
//!
//! An [`Amount`] carries a compile-time [`Constraint`] on its valid range, so
//! code paths that must never see a negative value (credit aggregation, fee
//! checks) can say so in their types. Arithmetic is checked: any operation
//! that leaves the constraint's range fails with [`Error`].

use std::{
    cmp::Ordering,
    convert::TryFrom,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::RangeInclusive,
};

use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// One whole coin, in base units.
pub const COIN: i64 = 100_000_000;

/// The monetary-range cap: no amount (or sum of amounts) may exceed this.
pub const MAX_MONEY: i64 = 21_000_000 * COIN;

/// A monetary amount in base units, bounded by the constraint `C`.
#[derive(Serialize, Deserialize)]
#[serde(try_from = "i64")]
#[serde(into = "i64")]
#[serde(bound = "C: Constraint")]
pub struct Amount<C = NonNegative>(i64, PhantomData<C>);

// Not derived: a derive would demand `C: Clone`/`C: Copy`, and the marker is
// phantom.
impl<C> Copy for Amount<C> {}

impl<C> Clone for Amount<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> fmt::Debug for Amount<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Amount<{}>", std::any::type_name::<C>()))
            .field(&self.0)
            .finish()
    }
}

impl<C: Constraint> Amount<C> {
    /// The zero amount.
    pub fn zero() -> Amount<C> {
        Amount(0, PhantomData)
    }

    /// Convert this amount into one with a different constraint, checking the
    /// target range.
    pub fn constrain<C2: Constraint>(self) -> Result<Amount<C2>, Error> {
        Amount::try_from(self.0)
    }
}

impl<C> From<Amount<C>> for i64 {
    fn from(amount: Amount<C>) -> i64 {
        amount.0
    }
}

impl<C: Constraint> TryFrom<i64> for Amount<C> {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if C::valid_range().contains(&value) {
            Ok(Amount(value, PhantomData))
        } else {
            Err(Error::OutOfRange {
                value,
                range: C::valid_range(),
            })
        }
    }
}

impl<C> PartialEq for Amount<C> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<C> Eq for Amount<C> {}

impl<C> PartialOrd for Amount<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for Amount<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<C> Hash for Amount<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<C: Constraint> std::ops::Add<Amount<C>> for Amount<C> {
    type Output = Result<Amount<C>, Error>;

    fn add(self, rhs: Amount<C>) -> Self::Output {
        let value = self
            .0
            .checked_add(rhs.0)
            .ok_or_else(|| Error::Overflow { lhs: self.0, rhs: rhs.0 })?;
        Amount::try_from(value)
    }
}

impl<C: Constraint> std::ops::Add<Amount<C>> for Result<Amount<C>, Error> {
    type Output = Result<Amount<C>, Error>;

    fn add(self, rhs: Amount<C>) -> Self::Output {
        self? + rhs
    }
}

impl<C: Constraint> std::ops::Sub<Amount<C>> for Amount<C> {
    type Output = Result<Amount<C>, Error>;

    fn sub(self, rhs: Amount<C>) -> Self::Output {
        let value = self
            .0
            .checked_sub(rhs.0)
            .ok_or_else(|| Error::Overflow { lhs: self.0, rhs: rhs.0 })?;
        Amount::try_from(value)
    }
}

impl<C: Constraint> std::ops::Sub<Amount<C>> for Result<Amount<C>, Error> {
    type Output = Result<Amount<C>, Error>;

    fn sub(self, rhs: Amount<C>) -> Self::Output {
        self? - rhs
    }
}

impl<C: Constraint> std::iter::Sum<Amount<C>> for Result<Amount<C>, Error> {
    fn sum<I: Iterator<Item = Amount<C>>>(iter: I) -> Self {
        iter.fold(Ok(Amount::zero()), |total, next| total + next)
    }
}

/// Errors that can be returned when validating or combining `Amount`s.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The amount is outside the range valid under its constraint.
    #[error("amount {value} is outside the valid range {range:?}")]
    OutOfRange {
        value: i64,
        range: RangeInclusive<i64>,
    },
    /// Combining the two operands overflowed `i64` itself.
    #[error("amount arithmetic on {lhs} and {rhs} overflowed")]
    Overflow { lhs: i64, rhs: i64 },
}

/// Marker type for amounts in `0..=MAX_MONEY`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NonNegative;

/// Marker type for amounts in `-MAX_MONEY..=MAX_MONEY`.
///
/// Needed for the `-1` null sentinel carried by default-constructed outputs
/// and backward transfers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NegativeAllowed;

/// The range of values an `Amount` with this constraint may hold.
pub trait Constraint {
    fn valid_range() -> RangeInclusive<i64>;
}

impl Constraint for NonNegative {
    fn valid_range() -> RangeInclusive<i64> {
        0..=MAX_MONEY
    }
}

impl Constraint for NegativeAllowed {
    fn valid_range() -> RangeInclusive<i64> {
        -MAX_MONEY..=MAX_MONEY
    }
}

impl<C: Constraint> BitcoinSerialize for Amount<C> {
    fn bitcoin_serialize<W: std::io::Write>(&self, mut target: W) -> Result<(), std::io::Error> {
        target.write_i64::<LittleEndian>(self.0)
    }
}

impl<C: Constraint> BitcoinDeserialize for Amount<C> {
    fn bitcoin_deserialize<R: std::io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let value = reader.read_i64::<LittleEndian>()?;
        Amount::try_from(value)
            .map_err(|_| SerializationError::Parse("amount outside its valid range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_within_range() {
        let one = Amount::<NonNegative>::try_from(1).unwrap();
        let two = Amount::try_from(2).unwrap();
        assert_eq!((one + two).unwrap(), Amount::try_from(3).unwrap());
    }

    #[test]
    fn add_beyond_cap_fails() {
        let max = Amount::<NonNegative>::try_from(MAX_MONEY).unwrap();
        let one = Amount::try_from(1).unwrap();
        assert!((max + one).is_err());
    }

    #[test]
    fn negative_rejected_by_non_negative() {
        assert!(Amount::<NonNegative>::try_from(-1).is_err());
        assert!(Amount::<NegativeAllowed>::try_from(-1).is_ok());
    }

    #[test]
    fn constrain_checks_target_range() {
        let minus_one = Amount::<NegativeAllowed>::try_from(-1).unwrap();
        assert!(minus_one.constrain::<NonNegative>().is_err());

        let five = Amount::<NegativeAllowed>::try_from(5).unwrap();
        assert_eq!(
            five.constrain::<NonNegative>().unwrap(),
            Amount::<NonNegative>::try_from(5).unwrap()
        );
    }

    #[test]
    fn sum_over_iterator() {
        let amounts = vec![1, 2, 3]
            .into_iter()
            .map(|v| Amount::<NonNegative>::try_from(v).unwrap());
        let total: Result<Amount<NonNegative>, Error> = amounts.sum();
        assert_eq!(total.unwrap(), Amount::try_from(6).unwrap());
    }
}
