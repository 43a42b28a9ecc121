use super::access::{AccessVote, Principal};
use super::currency::Currency;
use super::method::PaymentMethodDefinition;
use super::payment::Payment;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn load(&self, payment_id: u64) -> Result<Option<Payment>>;
    /// Loads the payment as persisted, bypassing any cached copy.
    async fn load_unchanged(&self, payment_id: u64) -> Result<Option<Payment>>;
    /// Persists the payment, assigning an id if it has none, and returns the id.
    async fn save(&self, payment: Payment) -> Result<u64>;
    async fn delete(&self, payment_id: u64) -> Result<()>;
}

pub type SharedPaymentStore = Arc<dyn PaymentStore>;

/// A configured payment method that can authorize and execute payments.
#[async_trait]
pub trait PaymentMethod: Send + Sync {
    fn definition(&self) -> &PaymentMethodDefinition;

    fn is_execution_interruptive(&self) -> bool {
        self.definition().interruptive
    }

    /// Method-specific rules applied after all generic execution access checks.
    async fn do_execute_payment_access(
        &self,
        _payment: &Payment,
        _principal: &dyn Principal,
    ) -> Result<bool> {
        Ok(true)
    }

    async fn do_execute_payment(&self, payment: &mut Payment) -> Result<()>;
}

/// What is being decided when execution access is checked.
///
/// `payment.method_id` holds the method currently configured on the payment,
/// which is not necessarily `method`.
pub struct ExecuteAccessEvent<'a> {
    pub payment: &'a Payment,
    pub method: &'a dyn PaymentMethod,
    pub principal: &'a dyn Principal,
}

#[async_trait]
pub trait ExecuteAccessVoter: Send + Sync {
    fn name(&self) -> &str;
    /// Returns `None` to abstain.
    async fn vote(&self, event: &ExecuteAccessEvent<'_>) -> Result<Option<AccessVote>>;
}

#[async_trait]
pub trait PreExecuteListener: Send + Sync {
    fn name(&self) -> &str;
    async fn on_pre_execute(&self, payment: &Payment) -> Result<()>;
}

pub trait CurrencyResolver: Send + Sync {
    fn load(&self, currency_code: &str) -> Option<Currency>;
}

pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> u64;
}

pub trait ClaimCodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}
