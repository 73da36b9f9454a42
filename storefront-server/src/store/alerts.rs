//! Operator alert queue

use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use shared::models::FulfillmentAlert;

use super::storage::{ALERTS_TABLE, Storage, StorageResult};

impl Storage {
    /// Raise (or refresh) the alert for a txid
    pub fn put_alert_in(&self, txn: &WriteTransaction, alert: &FulfillmentAlert) -> StorageResult<()> {
        let mut table = txn.open_table(ALERTS_TABLE)?;
        let value = serde_json::to_vec(alert)?;
        table.insert(alert.txid.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_alert(&self, txid: &str) -> StorageResult<Option<FulfillmentAlert>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ALERTS_TABLE)?;
        match table.get(txid)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_alert_in(
        &self,
        txn: &WriteTransaction,
        txid: &str,
    ) -> StorageResult<Option<FulfillmentAlert>> {
        let table = txn.open_table(ALERTS_TABLE)?;
        match table.get(txid)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Mark the alert resolved; no-op when none is open
    pub fn resolve_alert_in(&self, txn: &WriteTransaction, txid: &str, now: i64) -> StorageResult<()> {
        let mut table = txn.open_table(ALERTS_TABLE)?;
        let alert: Option<FulfillmentAlert> = match table.get(txid)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        if let Some(mut alert) = alert.filter(FulfillmentAlert::is_open) {
            alert.resolved_at = Some(now);
            let value = serde_json::to_vec(&alert)?;
            table.insert(txid, value.as_slice())?;
        }
        Ok(())
    }

    /// Unresolved alerts, oldest first
    pub fn open_alerts(&self) -> StorageResult<Vec<FulfillmentAlert>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ALERTS_TABLE)?;
        let mut alerts = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let alert: FulfillmentAlert = serde_json::from_slice(value.value())?;
            if alert.is_open() {
                alerts.push(alert);
            }
        }
        alerts.sort_by_key(|a| a.raised_at);
        Ok(alerts)
    }
}
