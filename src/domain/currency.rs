use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The ISO 4217 code for "no currency", used when a payment's currency no longer exists.
pub const UNKNOWN_CURRENCY_CODE: &str = "XXX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub label: String,
    /// Number of minor units per major unit, e.g. 100 for cents. Zero for none.
    pub subunits: u32,
    pub sign: String,
}

impl Currency {
    pub fn new(code: &str, label: &str, subunits: u32, sign: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
            subunits,
            sign: sign.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_CURRENCY_CODE, "Unknown", 0, "¤")
    }

    /// The number of decimal places implied by the minor unit.
    pub fn decimals(&self) -> u32 {
        let mut decimals = 0;
        let mut units = self.subunits;
        while units >= 10 {
            units /= 10;
            decimals += 1;
        }
        decimals
    }

    pub fn format_amount(&self, amount: Decimal) -> String {
        let decimals = self.decimals();
        let mut rounded =
            amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(decimals);
        format!("{}{}", self.sign, rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimals_from_subunits() {
        assert_eq!(Currency::new("EUR", "Euro", 100, "€").decimals(), 2);
        assert_eq!(Currency::new("JPY", "Yen", 1, "¥").decimals(), 0);
        assert_eq!(Currency::new("BHD", "Dinar", 1000, "BD").decimals(), 3);
        assert_eq!(Currency::unknown().decimals(), 0);
    }

    #[test]
    fn test_format_amount_uses_minor_units() {
        let euro = Currency::new("EUR", "Euro", 100, "€");
        assert_eq!(euro.format_amount(dec!(12.3)), "€12.30");
        assert_eq!(euro.format_amount(dec!(12.345)), "€12.34");

        let yen = Currency::new("JPY", "Yen", 1, "¥");
        assert_eq!(yen.format_amount(dec!(1500.6)), "¥1501");
    }
}
