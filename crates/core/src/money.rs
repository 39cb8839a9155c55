//! Money: fixed-point amounts in minor currency units.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// An amount of money in the smallest currency unit (cents).
///
/// Signed: a negative value is a balance still owed. Arithmetic is checked
/// only; there are no operator impls, so an overflow can never be silently
/// wrapped or clamped.
///
/// On the wire (and in catalog files) money is a decimal string such as
/// `"1.50"`, never a float.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Price of `quantity` units at this unit price, or `None` on overflow.
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    pub fn checked_add(self, rhs: Money) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Sum of `amounts`, or `None` as soon as a partial sum overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }
}

impl ValueObject for Money {}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

fn malformed(input: &str) -> DomainError {
    DomainError::invalid_argument(format!("not a decimal amount: {input:?}"))
}

impl FromStr for Money {
    type Err = DomainError;

    /// Parses `"5"`, `"5.5"`, `"5.50"` or `"-1.00"`. More than two fractional
    /// digits would lose precision and is rejected.
    fn from_str(s: &str) -> DomainResult<Self> {
        let raw = s.trim();
        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (unsigned, None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(s));
        }

        let fraction_cents = match fraction {
            None => 0,
            Some(digits)
                if (1..=2).contains(&digits.len())
                    && digits.bytes().all(|b| b.is_ascii_digit()) =>
            {
                let value: i64 = digits.parse().map_err(|_| malformed(s))?;
                if digits.len() == 1 { value * 10 } else { value }
            }
            Some(_) => return Err(malformed(s)),
        };

        let whole: i64 = whole.parse().map_err(|_| malformed(s))?;
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .ok_or_else(|| malformed(s))?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl TryFrom<String> for Money {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}
