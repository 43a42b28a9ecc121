use crate::domain::payment::Payment;
use crate::domain::ports::PaymentStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payments.
///
/// Uses `Arc<RwLock<BTreeMap<u64, Payment>>>` to allow shared concurrent access.
/// Ids are handed out from 1 upward and never reused.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<BTreeMap<u64, Payment>>>,
    last_id: Arc<AtomicU64>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.payments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.payments.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn load(&self, payment_id: u64) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&payment_id).cloned())
    }

    async fn load_unchanged(&self, payment_id: u64) -> Result<Option<Payment>> {
        self.load(payment_id).await
    }

    async fn save(&self, mut payment: Payment) -> Result<u64> {
        let mut payments = self.payments.write().await;
        let payment_id = match payment.id {
            Some(id) => {
                self.last_id.fetch_max(id, Ordering::SeqCst);
                id
            }
            None => self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
        };
        payment.assign_id(payment_id);
        payments.insert(payment_id, payment);
        Ok(payment_id)
    }

    async fn delete(&self, payment_id: u64) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.remove(&payment_id);
        Ok(())
    }
}
