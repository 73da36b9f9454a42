//! Order ledger

use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use shared::models::Order;

use super::storage::{ORDERS_TABLE, Storage, StorageError, StorageResult};

impl Storage {
    pub fn get_order(&self, order_id: i64) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Load an order inside a write transaction; missing orders are an error
    pub fn get_order_in(&self, txn: &WriteTransaction, order_id: i64) -> StorageResult<Order> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::OrderNotFound(order_id)),
        }
    }

    pub fn put_order_in(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id, value.as_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{OrderItem, PaymentStatus};

    #[test]
    fn order_round_trips_through_ledger() {
        let storage = Storage::open_in_memory().unwrap();
        let order = Order::new(
            42,
            "a@b.co",
            vec![OrderItem {
                product_id: "P1".into(),
                product_name: "Conta".into(),
                quantity: 1,
                unit_price: Decimal::new(1990, 2),
            }],
            0,
        );

        let txn = storage.begin_write().unwrap();
        storage.put_order_in(&txn, &order).unwrap();
        txn.commit().unwrap();

        let stored = storage.get_order(42).unwrap().unwrap();
        assert_eq!(stored, order);
        assert_eq!(stored.payment_status, PaymentStatus::Pending);
        assert!(storage.get_order(7).unwrap().is_none());
    }

    #[test]
    fn missing_order_in_txn_is_an_error() {
        let storage = Storage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        assert!(matches!(
            storage.get_order_in(&txn, 1),
            Err(StorageError::OrderNotFound(1))
        ));
    }
}
