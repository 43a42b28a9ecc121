use super::status::StatusKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optional lower and upper limits on a payment amount in one currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBounds {
    #[serde(default)]
    pub minimum: Option<Decimal>,
    #[serde(default)]
    pub maximum: Option<Decimal>,
}

impl CurrencyBounds {
    pub fn new(minimum: Option<Decimal>, maximum: Option<Decimal>) -> Self {
        Self { minimum, maximum }
    }

    /// Both limits are inclusive.
    pub fn contains(&self, amount: Decimal) -> bool {
        if let Some(minimum) = self.minimum {
            if amount < minimum {
                return false;
            }
        }
        if let Some(maximum) = self.maximum {
            if amount > maximum {
                return false;
            }
        }
        true
    }
}

/// The currencies, and amounts per currency, a payment method accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportedCurrencies {
    #[default]
    All,
    Limited(BTreeMap<String, CurrencyBounds>),
}

impl SupportedCurrencies {
    pub fn allows(&self, currency_code: &str, amount: Decimal) -> bool {
        match self {
            SupportedCurrencies::All => true,
            SupportedCurrencies::Limited(currencies) => currencies
                .get(currency_code)
                .is_some_and(|bounds| bounds.contains(amount)),
        }
    }
}

/// The static description of an executable payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodDefinition {
    /// The configuration id the method was derived from.
    pub id: String,
    pub plugin_id: String,
    pub label: String,
    pub active: bool,
    /// Whether completing a payment requires leaving the current flow.
    pub interruptive: bool,
    pub supported_currencies: SupportedCurrencies,
    pub execute_status_id: StatusKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn euro_only() -> SupportedCurrencies {
        let mut currencies = BTreeMap::new();
        currencies.insert(
            "EUR".to_string(),
            CurrencyBounds::new(Some(dec!(10)), Some(dec!(20))),
        );
        SupportedCurrencies::Limited(currencies)
    }

    #[test]
    fn test_bounds_check() {
        let currencies = euro_only();
        assert!(currencies.allows("EUR", dec!(12.34)));
        assert!(!currencies.allows("EUR", dec!(5)));
        assert!(!currencies.allows("EUR", dec!(25)));
        assert!(!currencies.allows("GBP", dec!(12.34)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let currencies = euro_only();
        assert!(currencies.allows("EUR", dec!(10)));
        assert!(currencies.allows("EUR", dec!(20)));
    }

    #[test]
    fn test_missing_bound_is_unbounded() {
        let bounds = CurrencyBounds::new(None, Some(dec!(1)));
        assert!(bounds.contains(dec!(0)));
        assert!(!bounds.contains(dec!(1.01)));
        assert!(CurrencyBounds::default().contains(dec!(1000000)));
    }

    #[test]
    fn test_all_currencies_accepted() {
        assert!(SupportedCurrencies::All.allows("JPY", dec!(999999)));
    }

    #[test]
    fn test_supported_currencies_json() {
        let all: SupportedCurrencies = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(all, SupportedCurrencies::All);

        let limited: SupportedCurrencies =
            serde_json::from_str(r#"{"limited": {"EUR": {"minimum": "10", "maximum": "20"}}}"#)
                .unwrap();
        assert_eq!(limited, euro_only());
    }
}
