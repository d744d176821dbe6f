use std::fmt;
use std::iter::Sum;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected numeric input at the catalog or cart boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Amount must not be negative: {0}")]
    NegativeAmount(f64),
    #[error("Amount is not a finite number")]
    NotFinite,
    #[error("Amount is too large: {0}")]
    AmountOverflow(f64),
    #[error("Invalid amount: {0}")]
    Unparsable(String),
    #[error("Quantity must not be negative: {0}")]
    NegativeQuantity(i64),
    #[error("Quantity is too large: {0}")]
    QuantityOverflow(i64),
}

/// A non-negative amount of money, held in whole cents.
///
/// Serializes as a decimal number (`2.5`) so stored records stay readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Money {
    cents: u64,
}

impl Money {
    pub const ZERO: Money = Money { cents: 0 };

    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Validated construction from a decimal amount, rounded to the nearest cent.
    pub fn from_decimal(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::NotFinite);
        }
        if amount < 0.0 {
            return Err(ValidationError::NegativeAmount(amount));
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(ValidationError::AmountOverflow(amount));
        }
        Ok(Self { cents: cents as u64 })
    }

    pub fn cents(self) -> u64 {
        self.cents
    }

    pub fn as_decimal(self) -> f64 {
        self.cents as f64 / 100.0
    }

    pub fn times(self, quantity: u32) -> Money {
        Money { cents: self.cents.saturating_mul(u64::from(quantity)) }
    }

    /// Divides evenly across `count` parts, rounding half up. Zero parts yields zero.
    pub fn split(self, count: usize) -> Money {
        if count == 0 {
            return Money::ZERO;
        }
        let count = count as u64;
        Money { cents: (self.cents + count / 2) / count }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money { cents: self.cents.saturating_add(rhs.cents) }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl TryFrom<f64> for Money {
    type Error = ValidationError;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Money::from_decimal(amount)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> f64 {
        money.as_decimal()
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('$');
        let amount: f64 = trimmed
            .parse()
            .map_err(|_| ValidationError::Unparsable(s.to_string()))?;
        Money::from_decimal(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.cents / 100, self.cents % 100)
    }
}

/// A non-negative count of units, used for stock levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    pub const fn new(units: u32) -> Self {
        Self(units)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// `None` when taking `units` would go below zero.
    pub fn checked_sub(self, units: u32) -> Option<Quantity> {
        self.0.checked_sub(units).map(Quantity)
    }

    pub fn saturating_add(self, units: u32) -> Quantity {
        Quantity(self.0.saturating_add(units))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(ValidationError::NegativeQuantity(value));
        }
        u32::try_from(value)
            .map(Quantity)
            .map_err(|_| ValidationError::QuantityOverflow(value))
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> u32 {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_rejects_invalid_amounts() {
        assert_eq!(Money::from_decimal(-0.01), Err(ValidationError::NegativeAmount(-0.01)));
        assert_eq!(Money::from_decimal(f64::NAN), Err(ValidationError::NotFinite));
        assert_eq!(Money::from_decimal(f64::INFINITY), Err(ValidationError::NotFinite));
        assert!(matches!("abc".parse::<Money>(), Err(ValidationError::Unparsable(_))));
    }

    #[test]
    fn test_money_rounds_to_cents_and_displays() {
        let price: Money = "$2.50".parse().unwrap();
        assert_eq!(price.cents(), 250);
        assert_eq!(Money::from_decimal(0.1 + 0.2).unwrap().cents(), 30);
        assert_eq!(price.times(3).to_string(), "$7.50");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
    }

    #[test]
    fn test_money_split_rounds_half_up() {
        assert_eq!(Money::from_cents(1000).split(3), Money::from_cents(333));
        assert_eq!(Money::from_cents(1001).split(2), Money::from_cents(501));
        assert_eq!(Money::from_cents(1000).split(0), Money::ZERO);
    }

    #[test]
    fn test_money_json_is_decimal() {
        let json = serde_json::to_string(&Money::from_cents(250)).unwrap();
        assert_eq!(json, "2.5");
        let back: Money = serde_json::from_str("2.5").unwrap();
        assert_eq!(back.cents(), 250);
        assert!(serde_json::from_str::<Money>("-1.0").is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert_eq!(Quantity::try_from(-1), Err(ValidationError::NegativeQuantity(-1)));
        assert_eq!(
            Quantity::try_from(i64::from(u32::MAX) + 1),
            Err(ValidationError::QuantityOverflow(i64::from(u32::MAX) + 1))
        );
        assert_eq!(Quantity::new(3).checked_sub(4), None);
        assert_eq!(Quantity::new(3).checked_sub(3), Some(Quantity::ZERO));
        assert!(serde_json::from_str::<Quantity>("-5").is_err());
    }
}
