//! Adapters implementing the domain ports: payment stores, currencies, time
//! and claim code generation.

pub mod clock;
pub mod currency;
pub mod in_memory;
pub mod random;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
