use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative monetary amount in a payment's currency.
///
/// Wraps `rust_decimal::Decimal` so negative values cannot enter line items or
/// currency bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(format!(
                "Amount must not be negative, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// `None` if the sum does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Amount::new(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(Amount::new(dec!(0.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(-0.01)),
            Err(PaymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_amount_arithmetic() {
        let unit = Amount::new(dec!(2.50)).unwrap();
        assert_eq!(unit.checked_mul(3).unwrap().value(), dec!(7.50));
        let total = Amount::ZERO.checked_add(unit).unwrap();
        assert_eq!(total.checked_add(unit).unwrap().value(), dec!(5.00));
    }

    #[test]
    fn test_amount_overflow_is_none() {
        let max = Amount::new(Decimal::MAX).unwrap();
        assert!(max.checked_mul(2).is_none());
        assert!(max.checked_add(Amount::new(dec!(1)).unwrap()).is_none());
        assert_eq!(max.checked_mul(1), Some(max));
    }

    #[test]
    fn test_negative_amount_rejected_on_deserialize() {
        assert!(serde_json::from_str::<Amount>("\"-3\"").is_err());
        let amount: Amount = serde_json::from_str("\"12.34\"").unwrap();
        assert_eq!(amount.value(), dec!(12.34));
    }
}
