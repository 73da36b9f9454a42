//! redb-backed storage for the storefront
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `bindings` | `txid` | `ChargeBinding` | Charge → product binding and its state |
//! | `inventory` | `(product_id, seq)` | credential payload | Unused credential records |
//! | `inventory_seq` | `product_id` | `u64` | Next record sequence per product |
//! | `orders` | `order_id` | `Order` | Order ledger |
//! | `fulfillment_alerts` | `txid` | `FulfillmentAlert` | Operator queue |
//!
//! # Transactions
//!
//! redb allows a single write transaction at a time, so every read-modify-write
//! done inside one `WriteTransaction` is linearizable. The `*_in` helpers take
//! the caller's transaction so several entities can change in one commit.

use redb::{Database, ReadableDatabase, TableDefinition, WriteTransaction};
use shared::models::BindingStatus;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = txid, value = JSON-serialized ChargeBinding
pub(crate) const BINDINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("bindings");

/// key = (product_id, seq), value = credential payload
pub(crate) const INVENTORY_TABLE: TableDefinition<(&str, u64), &str> =
    TableDefinition::new("inventory");

/// key = product_id, value = next sequence number
pub(crate) const INVENTORY_SEQ_TABLE: TableDefinition<&str, u64> =
    TableDefinition::new("inventory_seq");

/// key = order_id, value = JSON-serialized Order
pub(crate) const ORDERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("orders");

/// key = txid, value = JSON-serialized FulfillmentAlert
pub(crate) const ALERTS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("fulfillment_alerts");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No credential records left for product {0}")]
    StockExhausted(String),

    #[error("Binding already exists: {0}")]
    DuplicateBinding(String),

    #[error("Binding not found: {0}")]
    BindingNotFound(String),

    #[error("Binding {0} cannot be rebound to another product or order")]
    BindingImmutable(String),

    #[error("Binding {txid}: illegal transition {from} -> {to}")]
    InvalidTransition {
        txid: String,
        from: BindingStatus,
        to: BindingStatus,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(i64),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage failures reach clients as an opaque database error
impl From<StorageError> for shared::error::AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Storage failure");
        shared::error::AppError::new(shared::error::ErrorCode::DatabaseError)
    }
}

/// Storefront storage backed by redb
#[derive(Clone)]
pub struct Storage {
    pub(crate) db: Arc<Database>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: once `commit()`
    /// returns, a taken credential record is gone from disk.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn init_tables(db: &Database) -> StorageResult<()> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BINDINGS_TABLE)?;
            let _ = write_txn.open_table(INVENTORY_TABLE)?;
            let _ = write_txn.open_table(INVENTORY_SEQ_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ALERTS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Cheap liveness probe for `/health`
    pub fn ping(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(BINDINGS_TABLE)?;
        Ok(())
    }
}
