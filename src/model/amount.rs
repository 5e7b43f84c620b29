//! Money values.
//!
//! `Amount` wraps a `Decimal` so that totals over many expenses are exact. User input may carry a
//! leading minus sign, a dollar sign and comma thousands separators, e.g. `-$1,250.00`. Underscore
//! separators, repeated signs and scientific notation are rejected.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// An amount of money in the ledger's single currency.
///
/// Equality and ordering are numeric: `12.5` and `12.50` are the same amount.
///
/// ```
/// # use expense_ledger::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("$1,250.50").unwrap();
/// let b = Amount::from_str("1250.5").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "$1,250.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// The largest amount a single expense may have: $1,000,000,000,000.00.
    pub const MAX: Amount = Amount(Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0));

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.0.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is at most `Amount::MAX` and survives a trip through a SQLite
    /// `REAL` column unchanged.
    pub fn is_storable(&self) -> bool {
        *self <= Self::MAX && self.to_f64().and_then(Self::from_f64) == Some(*self)
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// The value as SQLite stores it (`REAL`).
    pub(crate) fn to_f64(self) -> Option<f64> {
        self.0.to_f64()
    }

    /// Reads a `REAL` column back. Returns `None` for NaN or infinite values.
    pub(crate) fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(Self)
    }
}

/// An error that can occur when parsing text into an `Amount`.
pub struct AmountError {
    input: String,
    source: Option<rust_decimal::Error>,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AmountError({:?}, {:?})", self.input, self.source)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(e) => write!(f, "'{}' is not a number: {e}", self.input),
            None => write!(f, "'{}' is not a number", self.input),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |source| AmountError {
            input: s.to_string(),
            source,
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid(None));
        }

        // "-$5.00", "$5.00" and "5.00" are all accepted. A sign after a stripped prefix is not.
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (dollar, unsigned) = match unsigned.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, unsigned),
        };
        if (negative || dollar) && unsigned.starts_with(['-', '+']) {
            return Err(invalid(None));
        }
        // Only commas separate thousands.
        if unsigned.contains('_') {
            return Err(invalid(None));
        }

        let value =
            Decimal::from_str(&unsigned.replace(',', "")).map_err(|e| invalid(Some(e)))?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.0.is_sign_negative() && !self.0.is_zero() {
            "-"
        } else {
            ""
        };
        let abs = self.0.abs().to_f64().unwrap_or_default();
        write!(f, "{sign}${}", format_num::format_num!(",.2", abs))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// Addition saturates at the bounds of `Decimal` instead of panicking.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
