use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decimal amount of money. Never rounded on construction; rounding only
/// happens when the amount is displayed or converted to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn new(decimal: Decimal) -> Self {
        Money(decimal)
    }

    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Rounds half away from zero to whole cents. `None` if the amount does not
    /// fit in an `i64` number of cents.
    pub fn to_cents(self) -> Option<i64> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// `None` when the sum exceeds the decimal range.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Sum of `amounts`, or `None` as soon as the running total overflows.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// One equal share of this amount among `parts` people, at full decimal
    /// precision. Shares are not guaranteed to re-sum to the original amount.
    /// Returns `None` for zero parts.
    pub fn share(self, parts: usize) -> Option<Money> {
        if parts == 0 {
            return None;
        }
        self.0.checked_div(Decimal::from(parts)).map(Money)
    }

    /// Splits this amount into `parts` whole-cent shares that re-sum exactly to
    /// the amount rounded to cents. The first `cents % parts` shares carry one
    /// extra cent. Returns `None` for zero parts or an amount too large for
    /// `i64` cents.
    pub fn allocate(self, parts: usize) -> Option<Vec<Money>> {
        if parts == 0 {
            return None;
        }
        let cents = self.to_cents()?;
        let n = i64::try_from(parts).ok()?;
        let base = cents / n;
        let remainder = cents % n;
        Some(
            (0..n)
                .map(|i| Money::from_cents(if i < remainder { base + 1 } else { base }))
                .collect(),
        )
    }

    /// Two-decimal rendering prefixed with `symbol`, e.g. `₹125.00`.
    pub fn display_with(self, symbol: &str) -> String {
        format!("{symbol}{self}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{rounded:.2}")
    }
}

impl From<Decimal> for Money {
    fn from(decimal: Decimal) -> Self {
        Money(decimal)
    }
}
