use crate::domain::access::{AccessVote, Principal, resolve_votes};
use crate::domain::payment::Payment;
use crate::domain::ports::{
    ExecuteAccessEvent, ExecuteAccessVoter, PaymentMethod, PreExecuteListener,
};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Decides whether a payment method may execute a payment, and executes it.
///
/// Voters and listeners are fixed when the executor is assembled.
#[derive(Default, Clone)]
pub struct PaymentExecutor {
    voters: Vec<Arc<dyn ExecuteAccessVoter>>,
    listeners: Vec<Arc<dyn PreExecuteListener>>,
}

impl PaymentExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voter(mut self, voter: Arc<dyn ExecuteAccessVoter>) -> Self {
        self.voters.push(voter);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn PreExecuteListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Checks, in order and stopping at the first refusal: that the method is
    /// active, that it accepts the payment's currency and amount, the voters'
    /// verdict, and the method's own rules.
    ///
    /// Refusals are `Ok(false)`. A failing voter is an error, never a grant.
    pub async fn can_execute(
        &self,
        payment: &Payment,
        method: &dyn PaymentMethod,
        principal: &dyn Principal,
    ) -> Result<bool> {
        let definition = method.definition();
        if !definition.active {
            tracing::debug!(method = %definition.id, "Execution denied: method is inactive");
            return Ok(false);
        }

        let amount = payment.amount()?;
        if !definition
            .supported_currencies
            .allows(&payment.currency_code, amount)
        {
            tracing::debug!(
                method = %definition.id,
                currency = %payment.currency_code,
                %amount,
                "Execution denied: currency or amount not supported"
            );
            return Ok(false);
        }

        let event = ExecuteAccessEvent {
            payment,
            method,
            principal,
        };
        let votes = self.collect_votes(&event).await?;
        if !resolve_votes(&votes) {
            tracing::debug!(method = %definition.id, ?votes, "Execution denied by voters");
            return Ok(false);
        }

        let allowed = method.do_execute_payment_access(payment, principal).await?;
        if !allowed {
            tracing::debug!(method = %definition.id, "Execution denied by the method");
        }
        Ok(allowed)
    }

    async fn collect_votes(&self, event: &ExecuteAccessEvent<'_>) -> Result<Vec<AccessVote>> {
        let mut votes = Vec::with_capacity(self.voters.len());
        for voter in &self.voters {
            let vote = voter.vote(event).await.map_err(|e| PaymentError::VoterFailure {
                voter: voter.name().to_string(),
                reason: e.to_string(),
            })?;
            votes.extend(vote);
        }
        Ok(votes)
    }

    /// Notifies the pre-execute listeners, then lets the method execute the payment.
    ///
    /// Callers authorize with [`Self::can_execute`] first.
    pub async fn execute_payment(
        &self,
        payment: &mut Payment,
        method: &dyn PaymentMethod,
    ) -> Result<()> {
        for listener in &self.listeners {
            listener.on_pre_execute(payment).await?;
        }
        method.do_execute_payment(payment).await
    }
}

/// Adapts a closure into an execution access voter.
pub struct FnVoter<F> {
    name: String,
    vote: F,
}

impl<F> FnVoter<F>
where
    F: for<'a> Fn(&ExecuteAccessEvent<'a>) -> Result<Option<AccessVote>> + Send + Sync,
{
    pub fn new(name: &str, vote: F) -> Self {
        Self {
            name: name.to_string(),
            vote,
        }
    }
}

#[async_trait]
impl<F> ExecuteAccessVoter for FnVoter<F>
where
    F: for<'a> Fn(&ExecuteAccessEvent<'a>) -> Result<Option<AccessVote>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn vote(&self, event: &ExecuteAccessEvent<'_>) -> Result<Option<AccessVote>> {
        (self.vote)(event)
    }
}
