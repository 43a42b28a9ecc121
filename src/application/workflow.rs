use super::claims::ClaimQueue;
use super::executor::PaymentExecutor;
use super::methods::PaymentMethodManager;
use crate::domain::access::Principal;
use crate::domain::payment::Payment;
use crate::domain::ports::{PaymentMethod, SharedPaymentStore};
use crate::error::{PaymentError, Result};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayOutcome {
    /// The payment was saved and executed.
    Completed { payment_id: u64 },
    /// The method continues elsewhere. The payment waits in the claim queue.
    Interrupted { claim_code: String },
}

/// Drives a payment from method selection to execution.
pub struct PaymentWorkflow {
    methods: Arc<PaymentMethodManager>,
    executor: PaymentExecutor,
    claims: Arc<ClaimQueue>,
    store: SharedPaymentStore,
}

impl PaymentWorkflow {
    pub fn new(
        methods: Arc<PaymentMethodManager>,
        executor: PaymentExecutor,
        claims: Arc<ClaimQueue>,
        store: SharedPaymentStore,
    ) -> Self {
        Self {
            methods,
            executor,
            claims,
            store,
        }
    }

    pub async fn pay(
        &self,
        mut payment: Payment,
        method_id: &str,
        principal: &dyn Principal,
    ) -> Result<PayOutcome> {
        let method = self.methods.create_instance(method_id)?;
        payment.method_id = Some(method_id.to_string());
        self.authorize(&payment, method.as_ref(), principal).await?;

        if method.is_execution_interruptive() {
            let claim_code = self.claims.claim(payment).await?;
            return Ok(PayOutcome::Interrupted { claim_code });
        }
        let payment_id = self.finish(payment, method.as_ref()).await?;
        Ok(PayOutcome::Completed { payment_id })
    }

    /// Continues an interrupted payment. Execution access is checked again,
    /// since the method configuration may have changed in the meantime.
    pub async fn resume(&self, claim_code: &str, principal: &dyn Principal) -> Result<u64> {
        let payment = self.claims.acquire(claim_code).await?;
        let method_id = payment.method_id.clone().ok_or_else(|| {
            PaymentError::ValidationError("Claimed payment has no payment method".to_string())
        })?;
        let method = self.methods.create_instance(&method_id)?;
        self.authorize(&payment, method.as_ref(), principal).await?;
        self.finish(payment, method.as_ref()).await
    }

    async fn authorize(
        &self,
        payment: &Payment,
        method: &dyn PaymentMethod,
        principal: &dyn Principal,
    ) -> Result<()> {
        if self.executor.can_execute(payment, method, principal).await? {
            Ok(())
        } else {
            Err(PaymentError::ExecutionDenied(method.definition().id.clone()))
        }
    }

    async fn finish(&self, mut payment: Payment, method: &dyn PaymentMethod) -> Result<u64> {
        let payment_id = self.store.save(payment.clone()).await?;
        payment.assign_id(payment_id);
        self.executor.execute_payment(&mut payment, method).await?;
        self.store.save(payment).await?;
        Ok(payment_id)
    }
}
