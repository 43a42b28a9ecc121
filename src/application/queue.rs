use super::catalog::StatusCatalog;
use crate::domain::ports::{ClaimCodeGenerator, Clock, SharedPaymentStore};
use crate::domain::status::StatusKind;
use crate::error::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct QueueEntry {
    category_id: String,
    acquisition_code: Option<String>,
    /// When the current acquisition code was handed out.
    claimed: u64,
}

/// Payments waiting to be picked up by the entity that is paid for.
///
/// A payment made for a reference field is queued under the field's category
/// until the entity it was made for is saved. Whoever wants to use a queued
/// payment first claims it, receiving an acquisition code that is valid for
/// the claim expiration period, and then acquires it with that code, which
/// removes it from the queue.
pub struct PaymentQueue {
    entries: Mutex<BTreeMap<u64, QueueEntry>>,
    store: SharedPaymentStore,
    catalog: Arc<StatusCatalog>,
    allowed_status_ids: Vec<StatusKind>,
    claim_expiration: u64,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn ClaimCodeGenerator>,
}

impl PaymentQueue {
    pub fn new(
        store: SharedPaymentStore,
        catalog: Arc<StatusCatalog>,
        allowed_status_ids: Vec<StatusKind>,
        claim_expiration: u64,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn ClaimCodeGenerator>,
    ) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            store,
            catalog,
            allowed_status_ids,
            claim_expiration,
            clock,
            generator,
        }
    }

    pub async fn save(&self, category_id: &str, payment_id: u64) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            payment_id,
            QueueEntry {
                category_id: category_id.to_string(),
                acquisition_code: None,
                claimed: 0,
            },
        );
        tracing::debug!(payment_id, category_id, "Queued payment");
        Ok(())
    }

    fn is_claimed(&self, entry: &QueueEntry, now: u64) -> bool {
        entry.acquisition_code.is_some()
            && now < entry.claimed.saturating_add(self.claim_expiration)
    }

    /// Claims a queued payment. Returns `None` if it is not queued or another
    /// claim on it is still valid.
    pub async fn claim_payment(&self, payment_id: u64) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        let now = self.clock.now();
        let Some(entry) = entries.get_mut(&payment_id) else {
            return Ok(None);
        };
        if self.is_claimed(entry, now) {
            return Ok(None);
        }
        let code = self.generator.generate();
        entry.acquisition_code = Some(code.clone());
        entry.claimed = now;
        tracing::debug!(payment_id, "Claimed queued payment");
        Ok(Some(code))
    }

    /// Removes the payment from the queue if `acquisition_code` belongs to its
    /// current, unexpired claim.
    pub async fn acquire_payment(&self, payment_id: u64, acquisition_code: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        let now = self.clock.now();
        let acquirable = entries.get(&payment_id).is_some_and(|entry| {
            entry.acquisition_code.as_deref() == Some(acquisition_code)
                && self.is_claimed(entry, now)
        });
        if acquirable {
            entries.remove(&payment_id);
            tracing::info!(payment_id, "Acquired queued payment");
        }
        Ok(acquirable)
    }

    /// IDs of unclaimed payments in the category owned by `owner_id` whose
    /// current status is, or descends from, one of the allowed statuses.
    /// Payments whose status was removed from the catalog are left out.
    pub async fn load_payment_ids(&self, category_id: &str, owner_id: u64) -> Result<Vec<u64>> {
        let candidates: Vec<u64> = {
            let entries = self.entries.lock().await;
            let now = self.clock.now();
            entries
                .iter()
                .filter(|(_, entry)| {
                    entry.category_id == category_id && !self.is_claimed(entry, now)
                })
                .map(|(&payment_id, _)| payment_id)
                .collect()
        };

        let hierarchy = self.catalog.hierarchy()?;
        let mut payment_ids = Vec::new();
        for payment_id in candidates {
            let Some(payment) = self.store.load(payment_id).await? else {
                continue;
            };
            if payment.owner_id != owner_id {
                continue;
            }
            let Some(status) = payment.status() else {
                continue;
            };
            if !hierarchy.contains(&status.kind) {
                tracing::warn!(
                    payment_id,
                    status = %status.kind,
                    "Skipping queued payment with a status that no longer exists"
                );
                continue;
            }
            let mut allowed = false;
            for allowed_status in &self.allowed_status_ids {
                if hierarchy.is_or_has_ancestor(&status.kind, allowed_status)? {
                    allowed = true;
                    break;
                }
            }
            if allowed {
                payment_ids.push(payment_id);
            }
        }
        Ok(payment_ids)
    }

    pub async fn delete_by_payment_id(&self, payment_id: u64) -> Result<()> {
        self.entries.lock().await.remove(&payment_id);
        Ok(())
    }

    pub async fn delete_by_category_id(&self, category_id: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .retain(|_, entry| entry.category_id != category_id);
        Ok(())
    }

    pub async fn delete_by_category_id_prefix(&self, prefix: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .retain(|_, entry| !entry.category_id.starts_with(prefix));
        Ok(())
    }
}
