//! JSON documents for method configurations and payments.

use crate::application::methods::PaymentMethodConfiguration;
use crate::domain::payment::{Payment, validate_currency_code};
use crate::domain::ports::CurrencyResolver;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads a JSON array of payment method configurations.
pub fn read_method_configurations<R: Read>(source: R) -> Result<Vec<PaymentMethodConfiguration>> {
    Ok(serde_json::from_reader(source)?)
}

/// Reads a single payment. Its currency must be known to `currencies` and
/// its total must be representable.
pub fn read_payment<R: Read>(source: R, currencies: &dyn CurrencyResolver) -> Result<Payment> {
    let payment: Payment = serde_json::from_reader(source)?;
    validate_currency_code(&payment.currency_code)?;
    if currencies.load(&payment.currency_code).is_none() {
        return Err(PaymentError::ValidationError(format!(
            "Unknown currency {}",
            payment.currency_code
        )));
    }
    payment.amount()?;
    Ok(payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::method::SupportedCurrencies;
    use crate::infrastructure::currency::InMemoryCurrencyStore;
    use rust_decimal_macros::dec;

    #[test]
    fn test_read_method_configurations() {
        let data = r#"[
            {"id": "cash", "label": "Cash"},
            {"id": "card", "label": "Card", "plugin_id": "payment_card", "enabled": false,
             "supported_currencies": {"limited": {"EUR": {"minimum": "1", "maximum": null}}}}
        ]"#;
        let configurations = read_method_configurations(data.as_bytes()).unwrap();

        assert_eq!(configurations.len(), 2);
        assert!(configurations[0].enabled);
        assert_eq!(configurations[0].execute_status_id.as_str(), "payment_pending");
        assert!(!configurations[1].enabled);
        assert!(matches!(configurations[1].supported_currencies, SupportedCurrencies::Limited(_)));
    }

    #[test]
    fn test_read_payment() {
        let data = r#"{"owner_id": 2, "currency_code": "EUR",
                       "line_items": [{"name": "ticket", "amount": "7.5", "quantity": 2}]}"#;
        let payment = read_payment(data.as_bytes(), &InMemoryCurrencyStore::new()).unwrap();
        assert_eq!(payment.amount().unwrap(), dec!(15.0));
        assert!(payment.status().is_none());
    }

    #[test]
    fn test_read_payment_rejects_bad_currency_and_amount() {
        let currencies = InMemoryCurrencyStore::new();
        let bad_code = r#"{"owner_id": 2, "currency_code": "euro"}"#;
        assert!(matches!(
            read_payment(bad_code.as_bytes(), &currencies),
            Err(PaymentError::ValidationError(_))
        ));

        let negative = r#"{"owner_id": 2, "currency_code": "EUR",
                          "line_items": [{"name": "refund", "amount": "-1"}]}"#;
        assert!(read_payment(negative.as_bytes(), &currencies).is_err());
    }

    #[test]
    fn test_read_payment_requires_a_known_currency() {
        let currencies = InMemoryCurrencyStore::new();
        let unknown = r#"{"owner_id": 2, "currency_code": "ZZZ"}"#;
        assert!(matches!(
            read_payment(unknown.as_bytes(), &currencies),
            Err(PaymentError::ValidationError(message)) if message.contains("ZZZ")
        ));

        let sentinel = r#"{"owner_id": 2, "currency_code": "XXX"}"#;
        assert!(read_payment(sentinel.as_bytes(), &currencies).is_ok());
    }

    #[test]
    fn test_read_payment_rejects_overflowing_total() {
        let data = r#"{"owner_id": 2, "currency_code": "EUR",
                       "line_items": [{"name": "huge", "amount": "79228162514264337593543950335",
                                       "quantity": 2}]}"#;
        assert!(matches!(
            read_payment(data.as_bytes(), &InMemoryCurrencyStore::new()),
            Err(PaymentError::ValidationError(_))
        ));
    }
}
