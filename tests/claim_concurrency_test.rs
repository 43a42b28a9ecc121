mod common;

use paygate::error::PaymentError;
use paygate::infrastructure::clock::ManualClock;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquire_has_single_winner() {
    let queue = Arc::new(common::claim_queue(3600, Arc::new(ManualClock::new(0))));
    let code = queue.claim(common::payment(1, dec!(10))).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let queue = queue.clone();
            let code = code.clone();
            tokio::spawn(async move { queue.acquire(&code).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(payment) => {
                assert_eq!(payment.owner_id, 1);
                winners += 1;
            }
            Err(PaymentError::ClaimNotFound) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);
    assert!(queue.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_get_distinct_codes() {
    let queue = Arc::new(common::claim_queue(3600, Arc::new(ManualClock::new(0))));

    let handles: Vec<_> = (0..32u64)
        .map(|owner_id| {
            let queue = queue.clone();
            tokio::spawn(async move { queue.claim(common::payment(owner_id, dec!(1))).await })
        })
        .collect();

    let mut codes = std::collections::HashSet::new();
    for handle in handles {
        assert!(codes.insert(handle.await.unwrap().unwrap()));
    }
    assert_eq!(queue.len().await, 32);
}

#[tokio::test]
async fn test_expired_claim_is_rejected_once_then_gone() {
    let clock = Arc::new(ManualClock::new(1_000));
    let queue = common::claim_queue(60, clock.clone());
    let code = queue.claim(common::payment(1, dec!(10))).await.unwrap();

    clock.advance(60);
    assert!(matches!(queue.acquire(&code).await, Err(PaymentError::ClaimExpired)));
    assert!(matches!(queue.acquire(&code).await, Err(PaymentError::ClaimNotFound)));
}
