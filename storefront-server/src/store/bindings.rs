//! Charge bindings (txid → product/order) with guarded transitions

use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use shared::models::ChargeBinding;

use super::storage::{BINDINGS_TABLE, Storage, StorageError, StorageResult};

impl Storage {
    pub fn get_binding(&self, txid: &str) -> StorageResult<Option<ChargeBinding>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BINDINGS_TABLE)?;
        match table.get(txid)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_binding_in(
        &self,
        txn: &WriteTransaction,
        txid: &str,
    ) -> StorageResult<Option<ChargeBinding>> {
        let table = txn.open_table(BINDINGS_TABLE)?;
        match table.get(txid)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Store a new binding; a txid is bound exactly once
    pub fn insert_binding_in(
        &self,
        txn: &WriteTransaction,
        binding: &ChargeBinding,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(BINDINGS_TABLE)?;
        if table.get(binding.txid.as_str())?.is_some() {
            return Err(StorageError::DuplicateBinding(binding.txid.clone()));
        }
        let value = serde_json::to_vec(binding)?;
        table.insert(binding.txid.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Replace a binding, enforcing the state machine
    ///
    /// The stored `product_id`/`order_id` must not change, and the status
    /// must either stay the same or follow a legal edge.
    pub fn update_binding_in(
        &self,
        txn: &WriteTransaction,
        binding: &ChargeBinding,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(BINDINGS_TABLE)?;
        let current: ChargeBinding = match table.get(binding.txid.as_str())? {
            Some(value) => serde_json::from_slice(value.value())?,
            None => return Err(StorageError::BindingNotFound(binding.txid.clone())),
        };

        if current.product_id != binding.product_id || current.order_id != binding.order_id {
            return Err(StorageError::BindingImmutable(binding.txid.clone()));
        }
        if current.status != binding.status && !current.status.can_transition_to(binding.status) {
            return Err(StorageError::InvalidTransition {
                txid: binding.txid.clone(),
                from: current.status,
                to: binding.status,
            });
        }

        let value = serde_json::to_vec(binding)?;
        table.insert(binding.txid.as_str(), value.as_slice())?;
        Ok(())
    }

    /// All bindings, in txid order
    pub fn list_bindings(&self) -> StorageResult<Vec<ChargeBinding>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BINDINGS_TABLE)?;
        let mut bindings = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            bindings.push(serde_json::from_slice(value.value())?);
        }
        Ok(bindings)
    }

    /// Open bindings whose expiry horizon has passed
    pub fn overdue_bindings(&self, now: i64) -> StorageResult<Vec<ChargeBinding>> {
        Ok(self
            .list_bindings()?
            .into_iter()
            .filter(|b| b.is_overdue(now))
            .collect())
    }
}
