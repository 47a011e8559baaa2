//! Value Objects for the storefront catalog

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Non-negative decimal price
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Price from a whole number of cents.
    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::from(cents) / Decimal::ONE_HUNDRED)
    }

    pub fn amount(&self) -> Decimal { self.0 }

    pub fn times(&self, quantity: u32) -> Price { Price(self.0 * Decimal::from(quantity)) }

    pub fn plus(&self, other: Price) -> Price { Price(self.0 + other.0) }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;
    fn try_from(amount: Decimal) -> Result<Self, Self::Error> { Self::new(amount) }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self { price.0 }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// Star rating between 0 and 5 inclusive
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Rating(f32);

impl Rating {
    pub const MAX: f32 = 5.0;

    pub fn new(value: f32) -> Result<Self, RatingError> {
        if !(0.0..=Self::MAX).contains(&value) {
            return Err(RatingError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 { self.0 }
}

impl TryFrom<f32> for Rating {
    type Error = RatingError;
    fn try_from(value: f32) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Rating> for f32 {
    fn from(rating: Rating) -> Self { rating.0 }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error("rating must be between 0 and 5, got {0}")]
    OutOfRange(f32),
}

/// Units on hand for a product. Never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockLevel(u32);

impl StockLevel {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn is_empty(&self) -> bool { self.0 == 0 }

    /// Removes up to `quantity` units, flooring at zero.
    pub fn take(&self, quantity: u32) -> Self { Self(self.0.saturating_sub(quantity)) }

    pub fn put(&self, quantity: u32) -> Self { Self(self.0.saturating_add(quantity)) }
}
