use crate::domain::currency::{Currency, UNKNOWN_CURRENCY_CODE};
use crate::domain::payment::validate_currency_code;
use crate::domain::ports::CurrencyResolver;
use crate::error::Result;
use std::collections::HashMap;

/// Currencies known to the application, including the `XXX` fallback.
#[derive(Debug, Clone)]
pub struct InMemoryCurrencyStore {
    currencies: HashMap<String, Currency>,
}

impl Default for InMemoryCurrencyStore {
    fn default() -> Self {
        let currencies = [
            Currency::new("EUR", "Euro", 100, "€"),
            Currency::new("USD", "United States dollar", 100, "$"),
            Currency::new("GBP", "Pound sterling", 100, "£"),
            Currency::new("JPY", "Japanese yen", 1, "¥"),
            Currency::unknown(),
        ];
        Self {
            currencies: currencies
                .into_iter()
                .map(|currency| (currency.code.clone(), currency))
                .collect(),
        }
    }
}

impl InMemoryCurrencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, currency: Currency) -> Result<()> {
        validate_currency_code(&currency.code)?;
        self.currencies.insert(currency.code.clone(), currency);
        Ok(())
    }

    /// Loads the currency, or `XXX` if the code is not known.
    pub fn resolve_or_fallback(&self, currency_code: &str) -> Currency {
        self.load(currency_code)
            .or_else(|| self.load(UNKNOWN_CURRENCY_CODE))
            .unwrap_or_else(Currency::unknown)
    }
}

impl CurrencyResolver for InMemoryCurrencyStore {
    fn load(&self, currency_code: &str) -> Option<Currency> {
        self.currencies.get(currency_code).cloned()
    }
}
