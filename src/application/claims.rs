use crate::domain::payment::Payment;
use crate::domain::ports::{ClaimCodeGenerator, Clock};
use crate::error::{PaymentError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// How long a claimed payment waits for its payer to come back, in seconds.
pub const DEFAULT_CLAIM_TTL: u64 = 3600;

/// Generated codes tried before a claim gives up on finding an unused one.
pub const MAX_CLAIM_CODE_ATTEMPTS: usize = 16;

/// A payment parked under a claim code.
#[derive(Debug, Clone)]
pub struct ClaimRecord {
    pub payment: Payment,
    pub claim_code: String,
    /// Seconds since the Unix epoch. The claim is valid strictly before this.
    pub expires_at: u64,
}

impl ClaimRecord {
    fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Holds payments whose execution continues elsewhere, such as after an
/// external redirect, until the payer returns with the claim code.
///
/// Codes are single use. Looking a code up and removing its record happen in
/// one critical section, so of several concurrent acquirers exactly one wins.
pub struct ClaimQueue {
    records: Mutex<HashMap<String, ClaimRecord>>,
    ttl: u64,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn ClaimCodeGenerator>,
}

impl ClaimQueue {
    pub fn new(ttl: u64, clock: Arc<dyn Clock>, generator: Arc<dyn ClaimCodeGenerator>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            ttl,
            clock,
            generator,
        }
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    /// Parks the payment and returns the code needed to acquire it.
    pub async fn claim(&self, payment: Payment) -> Result<String> {
        let mut records = self.records.lock().await;
        let now = self.clock.now();
        let mut claim_code = None;
        for _ in 0..MAX_CLAIM_CODE_ATTEMPTS {
            let candidate = self.generator.generate();
            if candidate.is_empty() {
                return Err(PaymentError::ValidationError(
                    "Claim code generator produced an empty code".to_string(),
                ));
            }
            if records.get(&candidate).is_none_or(|existing| existing.is_expired(now)) {
                claim_code = Some(candidate);
                break;
            }
        }
        let Some(claim_code) = claim_code else {
            tracing::warn!(
                attempts = MAX_CLAIM_CODE_ATTEMPTS,
                "Claim code generator kept producing codes in use"
            );
            return Err(PaymentError::ValidationError(
                "Could not generate an unused claim code".to_string(),
            ));
        };
        let expires_at = now.saturating_add(self.ttl);
        tracing::info!(payment_id = ?payment.id, expires_at, "Claimed temporary payment");
        records.insert(
            claim_code.clone(),
            ClaimRecord {
                payment,
                claim_code: claim_code.clone(),
                expires_at,
            },
        );
        Ok(claim_code)
    }

    /// Whether an unexpired payment is waiting under `claim_code`.
    pub async fn contains(&self, claim_code: &str) -> bool {
        let records = self.records.lock().await;
        records
            .get(claim_code)
            .is_some_and(|record| !record.is_expired(self.clock.now()))
    }

    /// Hands out the payment claimed under `claim_code` and forgets the code.
    pub async fn acquire(&self, claim_code: &str) -> Result<Payment> {
        let mut records = self.records.lock().await;
        let record = records.remove(claim_code).ok_or(PaymentError::ClaimNotFound)?;
        if record.is_expired(self.clock.now()) {
            tracing::debug!(payment_id = ?record.payment.id, "Claim code presented after expiry");
            return Err(PaymentError::ClaimExpired);
        }
        tracing::info!(payment_id = ?record.payment.id, "Acquired temporary payment");
        Ok(record.payment)
    }

    /// Drops every expired record and returns how many were dropped.
    pub async fn sweep_expired(&self) -> usize {
        let mut records = self.records.lock().await;
        let now = self.clock.now();
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        let removed = before - records.len();
        if removed > 0 {
            tracing::debug!(removed, "Swept expired temporary payments");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;
    use crate::infrastructure::random::RandomClaimCodeGenerator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SequenceGenerator {
        codes: Vec<&'static str>,
        next: AtomicUsize,
    }

    impl ClaimCodeGenerator for SequenceGenerator {
        fn generate(&self) -> String {
            let index = self.next.fetch_add(1, Ordering::SeqCst);
            self.codes[index.min(self.codes.len() - 1)].to_string()
        }
    }

    fn queue(clock: Arc<ManualClock>) -> ClaimQueue {
        ClaimQueue::new(
            DEFAULT_CLAIM_TTL,
            clock,
            Arc::new(RandomClaimCodeGenerator::default()),
        )
    }

    #[tokio::test]
    async fn test_claim_then_acquire_once() {
        let clock = Arc::new(ManualClock::new(1_000));
        let queue = queue(clock);
        let payment = Payment::new(1, "EUR").unwrap();

        let code = queue.claim(payment.clone()).await.unwrap();
        assert_eq!(code.len(), 128);
        assert!(queue.contains(&code).await);

        assert_eq!(queue.acquire(&code).await.unwrap(), payment);
        assert!(matches!(queue.acquire(&code).await, Err(PaymentError::ClaimNotFound)));
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_wrong_code() {
        let queue = queue(Arc::new(ManualClock::new(0)));
        queue.claim(Payment::new(1, "EUR").unwrap()).await.unwrap();
        assert!(matches!(queue.acquire("guess").await, Err(PaymentError::ClaimNotFound)));
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_claim() {
        let clock = Arc::new(ManualClock::new(1_000));
        let queue = queue(clock.clone());
        let code = queue.claim(Payment::new(1, "EUR").unwrap()).await.unwrap();

        clock.advance(DEFAULT_CLAIM_TTL - 1);
        assert!(queue.contains(&code).await);

        clock.advance(1);
        assert!(!queue.contains(&code).await);
        assert!(matches!(queue.acquire(&code).await, Err(PaymentError::ClaimExpired)));
        assert!(matches!(queue.acquire(&code).await, Err(PaymentError::ClaimNotFound)));
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let clock = Arc::new(ManualClock::new(0));
        let queue = queue(clock.clone());
        queue.claim(Payment::new(1, "EUR").unwrap()).await.unwrap();
        clock.advance(10);
        let fresh = queue.claim(Payment::new(2, "EUR").unwrap()).await.unwrap();

        clock.advance(DEFAULT_CLAIM_TTL - 5);
        assert_eq!(queue.sweep_expired().await, 1);
        assert_eq!(queue.len().await, 1);
        assert!(queue.acquire(&fresh).await.is_ok());
    }

    #[tokio::test]
    async fn test_live_code_is_never_reissued() {
        let generator = Arc::new(SequenceGenerator {
            codes: vec!["alpha", "alpha", "beta"],
            next: AtomicUsize::new(0),
        });
        let queue = ClaimQueue::new(60, Arc::new(ManualClock::new(0)), generator);

        assert_eq!(queue.claim(Payment::new(1, "EUR").unwrap()).await.unwrap(), "alpha");
        assert_eq!(queue.claim(Payment::new(2, "EUR").unwrap()).await.unwrap(), "beta");
        assert_eq!(queue.acquire("alpha").await.unwrap().owner_id, 1);
    }

    #[tokio::test]
    async fn test_claim_fails_when_generator_repeats_a_live_code() {
        let generator = Arc::new(SequenceGenerator {
            codes: vec!["alpha"],
            next: AtomicUsize::new(0),
        });
        let queue = ClaimQueue::new(60, Arc::new(ManualClock::new(0)), generator.clone());

        queue.claim(Payment::new(1, "EUR").unwrap()).await.unwrap();
        assert!(matches!(
            queue.claim(Payment::new(2, "EUR").unwrap()).await,
            Err(PaymentError::ValidationError(_))
        ));
        assert_eq!(generator.next.load(Ordering::SeqCst), 1 + MAX_CLAIM_CODE_ATTEMPTS);
        assert_eq!(queue.len().await, 1);
        assert_eq!(queue.acquire("alpha").await.unwrap().owner_id, 1);
    }
}
