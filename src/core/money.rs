use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A signed money amount held as integer cents.
///
/// Every distribution step in the engine runs on `Cents` so that shares
/// always add back up to the expense total. Decimal currency units only
/// appear at the public boundary, via [`to_cents`] and [`from_cents`].
///
/// # Examples
///
/// ```
/// use split_engine::core::money::Cents;
///
/// let a = Cents::new(1_250);
/// let b = Cents::new(-50);
/// assert_eq!((a + b).to_string(), "12.00");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Raw value in cents.
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Saturates at `i64::MAX` for `i64::MIN`.
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn checked_add(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_add(rhs.0).map(Cents)
    }

    pub fn checked_sub(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_sub(rhs.0).map(Cents)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Largest magnitude accepted for a single amount: ten trillion currency units.
///
/// Keeps per-expense sums far from the `i64` limits.
pub const MAX_AMOUNT_CENTS: Cents = Cents(1_000_000_000_000_000);

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        self.0 += rhs.0;
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Cents) {
        self.0 -= rhs.0;
    }
}

impl Neg for Cents {
    type Output = Cents;

    fn neg(self) -> Cents {
        Cents(-self.0)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Cents {
        iter.copied().sum()
    }
}

/// Convert a currency amount to integer cents.
///
/// Rounds half up (toward positive infinity on ties), i.e. `floor(x * 100 + 0.5)`:
/// `0.125` becomes `13` and `-0.125` becomes `-12`. Amounts outside the `i64`
/// cent range saturate.
///
/// ```
/// use split_engine::core::money::to_cents;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(to_cents(dec!(25.30)).value(), 2530);
/// assert_eq!(to_cents(dec!(0.125)).value(), 13);
/// assert_eq!(to_cents(dec!(-0.125)).value(), -12);
/// ```
pub fn to_cents(amount: Decimal) -> Cents {
    let saturated = if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };
    let scaled = match amount.checked_mul(Decimal::ONE_HUNDRED) {
        Some(scaled) => scaled,
        None => return Cents(saturated),
    };
    let rounded = match scaled.checked_add(Decimal::new(5, 1)) {
        Some(half_up) => half_up.floor(),
        None => return Cents(saturated),
    };
    Cents(rounded.to_i64().unwrap_or(saturated))
}

/// Convert integer cents back to a currency amount with exactly two decimal places.
pub fn from_cents(cents: Cents) -> Decimal {
    Decimal::new(cents.0, 2)
}

/// Round an amount to two decimal places using the same rule as [`to_cents`].
pub fn round_money(amount: Decimal) -> Decimal {
    from_cents(to_cents(amount))
}

/// Whether `amount` rounds to at most [`MAX_AMOUNT_CENTS`] in magnitude.
pub fn within_limit(amount: Decimal) -> bool {
    to_cents(amount).abs() <= MAX_AMOUNT_CENTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_cents_whole_and_fractional() {
        assert_eq!(to_cents(dec!(75)), Cents::new(7_500));
        assert_eq!(to_cents(dec!(25.30)), Cents::new(2_530));
        assert_eq!(to_cents(dec!(0.01)), Cents::new(1));
        assert_eq!(to_cents(Decimal::ZERO), Cents::ZERO);
    }

    #[test]
    fn test_to_cents_rounds_half_up() {
        assert_eq!(to_cents(dec!(1.005)), Cents::new(101));
        assert_eq!(to_cents(dec!(1.004)), Cents::new(100));
        assert_eq!(to_cents(dec!(2.675)), Cents::new(268));
        // Ties go toward positive infinity, like Math.round.
        assert_eq!(to_cents(dec!(-0.125)), Cents::new(-12));
        assert_eq!(to_cents(dec!(-0.126)), Cents::new(-13));
    }

    #[test]
    fn test_from_cents_has_two_decimal_places() {
        let amount = from_cents(Cents::new(1_800));
        assert_eq!(amount, dec!(18));
        assert_eq!(amount.scale(), 2);
        assert_eq!(amount.to_string(), "18.00");
        assert_eq!(from_cents(Cents::new(-5)).to_string(), "-0.05");
    }

    #[test]
    fn test_round_trip_two_decimals() {
        for x in [dec!(0.10), dec!(19.99), dec!(-42.07), dec!(1000000.01)] {
            assert_eq!(from_cents(to_cents(x)), x);
        }
        assert_eq!(round_money(dec!(3.14159)), dec!(3.14));
    }

    #[test]
    fn test_to_cents_saturates() {
        assert_eq!(to_cents(Decimal::MAX), Cents::new(i64::MAX));
        assert_eq!(to_cents(Decimal::MIN), Cents::new(i64::MIN));
    }

    #[test]
    fn test_cents_arithmetic_and_display() {
        let mut total: Cents = [Cents::new(100), Cents::new(250)].iter().sum();
        total -= Cents::new(1);
        assert_eq!(total, Cents::new(349));
        assert_eq!((-total).to_string(), "-3.49");
        assert_eq!(Cents::new(7).to_string(), "0.07");
        assert!(Cents::ZERO.is_zero());
    }

    #[test]
    fn test_checked_arithmetic_and_limits() {
        assert_eq!(Cents::new(i64::MAX).checked_add(Cents::new(1)), None);
        assert_eq!(Cents::new(i64::MIN).checked_sub(Cents::new(1)), None);
        assert_eq!(Cents::new(5).checked_sub(Cents::new(7)), Some(Cents::new(-2)));
        assert_eq!(Cents::new(i64::MIN).abs(), Cents::new(i64::MAX));

        assert!(within_limit(dec!(10000000000000)));
        assert!(within_limit(dec!(-10000000000000)));
        assert!(!within_limit(dec!(10000000000000.01)));
        assert!(!within_limit(Decimal::MIN));
    }
}
