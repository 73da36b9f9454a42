//! Inventory store: per-product pools of unused credential records

use rand::Rng;
use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use shared::models::CredentialRecord;

use super::storage::{INVENTORY_SEQ_TABLE, INVENTORY_TABLE, Storage, StorageError, StorageResult};

impl Storage {
    /// Whether the product has at least one unused record
    ///
    /// Advisory only: a concurrent checkout may take the last record between
    /// this check and `take_one`.
    pub fn has_stock(&self, product_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVENTORY_TABLE)?;
        let mut range = table.range((product_id, 0u64)..=(product_id, u64::MAX))?;
        Ok(range.next().transpose()?.is_some())
    }

    /// Number of unused records for the product
    pub fn stock_count(&self, product_id: &str) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVENTORY_TABLE)?;
        let mut count = 0;
        for result in table.range((product_id, 0u64)..=(product_id, u64::MAX))? {
            result?;
            count += 1;
        }
        Ok(count)
    }

    /// Append restock lines to the product's pool
    ///
    /// Malformed lines are skipped; returns how many records were stored.
    pub fn add_many<S: AsRef<str>>(&self, product_id: &str, lines: &[S]) -> StorageResult<usize> {
        let records: Vec<CredentialRecord> = lines
            .iter()
            .filter_map(|line| CredentialRecord::parse_line(product_id, line.as_ref()))
            .collect();
        if records.is_empty() {
            return Ok(0);
        }

        let txn = self.begin_write()?;
        {
            let mut seq_table = txn.open_table(INVENTORY_SEQ_TABLE)?;
            let mut next = seq_table.get(product_id)?.map(|g| g.value()).unwrap_or(0);

            let mut table = txn.open_table(INVENTORY_TABLE)?;
            for record in &records {
                table.insert((product_id, next), record.payload.as_str())?;
                next += 1;
            }
            seq_table.insert(product_id, next)?;
        }
        txn.commit()?;

        tracing::debug!(product_id = %product_id, added = records.len(), "Inventory records stored");
        Ok(records.len())
    }

    /// Atomically select and remove one record
    ///
    /// Durable before it returns. `StockExhausted` when the pool is empty.
    pub fn take_one(&self, product_id: &str) -> StorageResult<CredentialRecord> {
        let txn = self.begin_write()?;
        let record = self.take_one_in(&txn, product_id)?;
        txn.commit()?;
        Ok(record)
    }

    /// `take_one` inside the caller's transaction
    ///
    /// The record is only gone once the caller commits; dropping the
    /// transaction puts it back.
    pub fn take_one_in(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
    ) -> StorageResult<CredentialRecord> {
        let mut table = txn.open_table(INVENTORY_TABLE)?;

        let seqs = table
            .range((product_id, 0u64)..=(product_id, u64::MAX))?
            .map(|result| result.map(|(key, _)| key.value().1))
            .collect::<Result<Vec<u64>, redb::StorageError>>()?;
        if seqs.is_empty() {
            return Err(StorageError::StockExhausted(product_id.to_string()));
        }

        // 随机挑选一条
        let seq = seqs[rand::thread_rng().gen_range(0..seqs.len())];
        let payload = table
            .remove((product_id, seq))?
            .map(|guard| guard.value().to_string())
            .ok_or_else(|| StorageError::StockExhausted(product_id.to_string()))?;

        Ok(CredentialRecord {
            product_id: product_id.to_string(),
            payload,
        })
    }
}
