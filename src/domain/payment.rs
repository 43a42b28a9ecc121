use super::amount::Amount;
use super::status::{StatusInstance, StatusKind};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single billable item of a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub amount: Amount,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub description: String,
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    pub fn new(name: &str, amount: Amount, quantity: u32) -> Self {
        Self {
            name: name.to_string(),
            amount,
            quantity,
            description: String::new(),
        }
    }

    pub fn total(&self) -> Result<Amount> {
        self.amount.checked_mul(self.quantity).ok_or_else(|| {
            PaymentError::ValidationError(format!("Total of line item '{}' overflows", self.name))
        })
    }
}

/// A payment and its append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Assigned by the payment store on first save.
    #[serde(default)]
    pub id: Option<u64>,
    pub owner_id: u64,
    pub currency_code: String,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    statuses: Vec<StatusInstance>,
    /// The configuration id of the payment method that executes the payment.
    #[serde(default)]
    pub method_id: Option<String>,
}

impl Payment {
    pub fn new(owner_id: u64, currency_code: &str) -> Result<Self> {
        validate_currency_code(currency_code)?;
        Ok(Self {
            id: None,
            owner_id,
            currency_code: currency_code.to_string(),
            line_items: Vec::new(),
            statuses: Vec::new(),
            method_id: None,
        })
    }

    pub fn with_line_item(mut self, line_item: LineItem) -> Self {
        self.line_items.push(line_item);
        self
    }

    /// The sum of all line item totals. Fails if the sum is not representable.
    pub fn amount(&self) -> Result<Decimal> {
        let mut total = Amount::ZERO;
        for item in &self.line_items {
            total = total.checked_add(item.total()?).ok_or_else(|| {
                PaymentError::ValidationError("Payment amount overflows".to_string())
            })?;
        }
        Ok(total.value())
    }

    /// Appends a new status to the history and returns it.
    pub fn set_status(&mut self, kind: StatusKind, created: u64) -> &StatusInstance {
        let instance = StatusInstance {
            kind,
            created,
            payment_id: self.id,
            id: self.statuses.len() as u64 + 1,
        };
        self.statuses.push(instance);
        &self.statuses[self.statuses.len() - 1]
    }

    /// The most recently created status, if the payment has any.
    pub fn status(&self) -> Option<&StatusInstance> {
        self.statuses.last()
    }

    pub fn statuses(&self) -> &[StatusInstance] {
        &self.statuses
    }

    /// Replaces the history with persisted instances, ordered oldest first.
    #[cfg(feature = "storage-rocksdb")]
    pub(crate) fn restore_statuses(&mut self, statuses: Vec<StatusInstance>) {
        self.statuses = statuses;
    }

    /// Records the payment's id, including on the instances already in its history.
    pub(crate) fn assign_id(&mut self, id: u64) {
        self.id = Some(id);
        for instance in &mut self.statuses {
            instance.payment_id = Some(id);
        }
    }

    /// A copy of this payment without id or history, as used for a fresh checkout.
    pub fn create_duplicate(&self) -> Self {
        Self {
            id: None,
            owner_id: self.owner_id,
            currency_code: self.currency_code.clone(),
            line_items: self.line_items.clone(),
            statuses: Vec::new(),
            method_id: self.method_id.clone(),
        }
    }
}

/// Currency codes are three uppercase ASCII letters, ISO 4217 style.
pub fn validate_currency_code(code: &str) -> Result<()> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(PaymentError::ValidationError(format!(
            "Invalid currency code '{code}'"
        )))
    }
}
