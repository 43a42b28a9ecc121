use crate::domain::status::StatusKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Unknown payment status: {0}")]
    UnknownStatusKind(StatusKind),
    #[error("Payment status {0} is defined more than once")]
    DuplicateStatusKind(StatusKind),
    #[error("Payment status hierarchy is corrupt: cycle through {0}")]
    HierarchyCorruption(StatusKind),
    #[error("No temporary payment is stored under this claim code")]
    ClaimNotFound,
    #[error("The claim code has expired")]
    ClaimExpired,
    #[error("Execution access voter '{voter}' failed: {reason}")]
    VoterFailure { voter: String, reason: String },
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),
    #[error("Payment method {0} is unavailable")]
    MethodUnavailable(String),
    #[error("Payment method {0} may not execute this payment")]
    ExecutionDenied(String),
    #[error("Payment {0} not found")]
    PaymentNotFound(u64),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
