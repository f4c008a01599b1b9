//! Price amounts with the "zero means no price" rule made explicit

use crate::models::BuyOption;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A strictly positive, finite price amount
///
/// All prices are assumed to share one currency. Absent, zero, negative and
/// non-finite inputs have no `Money` representation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Money(f64);

impl Money {
    pub fn new(amount: f64) -> Option<Self> {
        if amount.is_finite() && amount > 0.0 {
            Some(Money(amount))
        } else {
            None
        }
    }

    /// Convert a nullable stored price
    pub fn from_price(price: Option<f64>) -> Option<Self> {
        price.and_then(Money::new)
    }

    pub fn amount(&self) -> f64 {
        self.0
    }

    /// Total ordering; amounts are always finite so this never sees NaN
    pub fn total_cmp(&self, other: &Money) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl BuyOption {
    /// Price plus shipping, both defaulting to 0
    ///
    /// A total of 0 is "no price", not "free", and yields `None`.
    pub fn total(&self) -> Option<Money> {
        let price = self.price.unwrap_or(0.0);
        Money::new(price + self.shipping_cost)
    }

    /// Whether this option's total equals the lowest total among its siblings
    pub fn is_cheapest(&self, lowest: Option<Money>) -> bool {
        match (self.total(), lowest) {
            (Some(total), Some(lowest)) => total == lowest,
            _ => false,
        }
    }
}

/// Lowest positive total (price + shipping) among a card's buy options
pub fn cheapest_buy_option_total(options: &[BuyOption]) -> Option<Money> {
    options
        .iter()
        .filter_map(BuyOption::total)
        .min_by(Money::total_cmp)
}
