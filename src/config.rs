use crate::application::catalog::{SUCCESS, StatusCatalog};
use crate::application::claims::{ClaimQueue, DEFAULT_CLAIM_TTL};
use crate::application::queue::PaymentQueue;
use crate::domain::ports::{Clock, SharedPaymentStore};
use crate::domain::status::StatusKind;
use crate::error::{PaymentError, Result};
use crate::infrastructure::random::{
    DEFAULT_CLAIM_CODE_LENGTH, MIN_CLAIM_CODE_LENGTH, RandomClaimCodeGenerator,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Runtime settings. Every field has a default, so a settings file only
/// names what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Seconds a temporary payment stays claimable.
    pub claim_ttl_secs: u64,
    pub claim_code_length: usize,
    /// Seconds an acquisition code for a queued payment stays valid.
    pub queue_claim_expiration_secs: u64,
    /// Queued payments are only offered if their status is or descends from one of these.
    pub queue_allowed_status_ids: Vec<StatusKind>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            claim_ttl_secs: DEFAULT_CLAIM_TTL,
            claim_code_length: DEFAULT_CLAIM_CODE_LENGTH,
            queue_claim_expiration_secs: 3600,
            queue_allowed_status_ids: vec![StatusKind::new(SUCCESS)],
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Self = serde_json::from_reader(File::open(path)?)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.claim_code_length < MIN_CLAIM_CODE_LENGTH {
            return Err(PaymentError::ValidationError(format!(
                "claim_code_length must be at least {MIN_CLAIM_CODE_LENGTH}"
            )));
        }
        if self.claim_ttl_secs == 0 || self.queue_claim_expiration_secs == 0 {
            return Err(PaymentError::ValidationError(
                "Claim lifetimes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn claim_code_generator(&self) -> Arc<RandomClaimCodeGenerator> {
        Arc::new(RandomClaimCodeGenerator::new(self.claim_code_length))
    }

    pub fn claim_queue(&self, clock: Arc<dyn Clock>) -> ClaimQueue {
        ClaimQueue::new(self.claim_ttl_secs, clock, self.claim_code_generator())
    }

    pub fn payment_queue(
        &self,
        store: SharedPaymentStore,
        catalog: Arc<StatusCatalog>,
        clock: Arc<dyn Clock>,
    ) -> PaymentQueue {
        PaymentQueue::new(
            store,
            catalog,
            self.queue_allowed_status_ids.clone(),
            self.queue_claim_expiration_secs,
            clock,
            self.claim_code_generator(),
        )
    }
}
