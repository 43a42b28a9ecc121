#![allow(dead_code)]

use paygate::application::catalog::StatusCatalog;
use paygate::application::claims::ClaimQueue;
use paygate::application::methods::{PaymentMethodConfiguration, PaymentMethodManager};
use paygate::domain::amount::Amount;
use paygate::domain::payment::{LineItem, Payment};
use paygate::infrastructure::clock::ManualClock;
use paygate::infrastructure::random::RandomClaimCodeGenerator;
use rust_decimal::Decimal;
use std::sync::Arc;

pub fn payment(owner_id: u64, amount: Decimal) -> Payment {
    Payment::new(owner_id, "EUR")
        .unwrap()
        .with_line_item(LineItem::new("item", Amount::new(amount).unwrap(), 1))
}

pub fn claim_queue(ttl: u64, clock: Arc<ManualClock>) -> ClaimQueue {
    ClaimQueue::new(ttl, clock, Arc::new(RandomClaimCodeGenerator::default()))
}

pub fn manager(
    clock: Arc<ManualClock>,
    configurations: Vec<PaymentMethodConfiguration>,
) -> PaymentMethodManager {
    let manager = PaymentMethodManager::new(Arc::new(StatusCatalog::default()), clock);
    for configuration in configurations {
        manager.save_configuration(configuration);
    }
    manager
}
