use crate::domain::payment::Payment;
use crate::domain::ports::PaymentStore;
use crate::domain::status::StatusInstance;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Column Family for payment bodies, without their status history.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for status instances, one row per instance.
pub const CF_PAYMENT_STATUSES: &str = "payment_statuses";

/// Payment id, creation time and instance id, all big endian, so that a scan
/// over a payment id prefix yields its history oldest first.
fn status_key(payment_id: u64, instance: &StatusInstance) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[..8].copy_from_slice(&payment_id.to_be_bytes());
    key[8..16].copy_from_slice(&instance.created.to_be_bytes());
    key[16..].copy_from_slice(&instance.id.to_be_bytes());
    key
}

/// A persistent payment store using RocksDB.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    last_id: Arc<AtomicU64>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// `payments` and `payment_statuses` column families if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let cf_statuses = ColumnFamilyDescriptor::new(CF_PAYMENT_STATUSES, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments, cf_statuses])?;
        let store = Self {
            db: Arc::new(db),
            last_id: Arc::new(AtomicU64::new(0)),
        };
        let last_id = store.highest_payment_id()?;
        store.last_id.store(last_id, Ordering::SeqCst);
        Ok(store)
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn highest_payment_id(&self) -> Result<u64> {
        let cf = self.cf(CF_PAYMENTS)?;
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (key, _) = item?;
                decode_id(&key)
            }
            None => Ok(0),
        }
    }

    fn status_keys(&self, payment_id: u64) -> Result<Vec<Box<[u8]>>> {
        Ok(self
            .status_rows(payment_id)?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    fn status_rows(&self, payment_id: u64) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let cf = self.cf(CF_PAYMENT_STATUSES)?;
        let prefix = payment_id.to_be_bytes();
        let mut rows = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward))
        {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            rows.push((key, value));
        }
        Ok(rows)
    }
}

fn decode_id(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Malformed payment key",
        )))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn load(&self, payment_id: u64) -> Result<Option<Payment>> {
        let cf = self.cf(CF_PAYMENTS)?;
        let Some(bytes) = self.db.get_cf(cf, payment_id.to_be_bytes())? else {
            return Ok(None);
        };
        let mut payment: Payment = serde_json::from_slice(&bytes)?;

        let statuses = self
            .status_rows(payment_id)?
            .into_iter()
            .map(|(_, value)| serde_json::from_slice::<StatusInstance>(&value))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        payment.restore_statuses(statuses);
        Ok(Some(payment))
    }

    async fn load_unchanged(&self, payment_id: u64) -> Result<Option<Payment>> {
        self.load(payment_id).await
    }

    async fn save(&self, mut payment: Payment) -> Result<u64> {
        let payment_id = match payment.id {
            Some(id) => {
                self.last_id.fetch_max(id, Ordering::SeqCst);
                id
            }
            None => self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
        };
        payment.assign_id(payment_id);

        let cf_payments = self.cf(CF_PAYMENTS)?;
        let cf_statuses = self.cf(CF_PAYMENT_STATUSES)?;
        let mut batch = WriteBatch::default();

        for key in self.status_keys(payment_id)? {
            batch.delete_cf(cf_statuses, key);
        }
        for instance in payment.statuses() {
            batch.put_cf(
                cf_statuses,
                status_key(payment_id, instance),
                serde_json::to_vec(instance)?,
            );
        }

        let mut body = payment;
        body.restore_statuses(Vec::new());
        batch.put_cf(cf_payments, payment_id.to_be_bytes(), serde_json::to_vec(&body)?);

        self.db.write(batch)?;
        tracing::debug!(payment_id, "Persisted payment");
        Ok(payment_id)
    }

    async fn delete(&self, payment_id: u64) -> Result<()> {
        let cf_payments = self.cf(CF_PAYMENTS)?;
        let cf_statuses = self.cf(CF_PAYMENT_STATUSES)?;
        let mut batch = WriteBatch::default();
        for key in self.status_keys(payment_id)? {
            batch.delete_cf(cf_statuses, key);
        }
        batch.delete_cf(cf_payments, payment_id.to_be_bytes());
        self.db.write(batch)?;
        Ok(())
    }
}
