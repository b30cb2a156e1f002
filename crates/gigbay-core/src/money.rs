//! # Opaque Price Amounts
//!
//! The workflow engine carries prices between offers and orders; it never
//! computes with them. Settlement, fees, and currency conversion happen in
//! systems outside this repository.
//!
//! `Price` wraps [`rust_decimal::Decimal`] so amounts survive serialization
//! without float rounding, and exposes only construction, comparison, and
//! display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// An opaque decimal amount attached to an offer or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Construct a price. Rejects zero and negative amounts.
    pub fn new(amount: Decimal) -> Result<Self, WorkflowError> {
        if amount <= Decimal::ZERO {
            return Err(WorkflowError::Validation(format!(
                "price must be positive, got {amount}"
            )));
        }
        Ok(Self(amount))
    }

    /// Parse a price from its decimal string form (e.g. `"100.00"`).
    pub fn parse(s: &str) -> Result<Self, WorkflowError> {
        let amount: Decimal = s
            .parse()
            .map_err(|_| WorkflowError::Validation(format!("invalid price amount: {s:?}")))?;
        Self::new(amount)
    }

    /// Access the inner decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_amounts_accepted() {
        let p = Price::parse("100.00").unwrap();
        assert_eq!(p.to_string(), "100.00");
    }

    #[test]
    fn zero_rejected() {
        assert!(Price::parse("0").is_err());
    }

    #[test]
    fn negative_rejected() {
        assert!(Price::parse("-5.50").is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(Price::parse("a hundred").is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let p = Price::parse("42.50").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"42.50\"");
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(p, parsed);
    }

    #[test]
    fn ordering_follows_amount() {
        assert!(Price::parse("10").unwrap() < Price::parse("20").unwrap());
    }
}
