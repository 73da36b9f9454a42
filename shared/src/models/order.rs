//! Order aggregate

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Payment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// Delivery status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
}

/// Purchased line, priced from the catalog at checkout time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Order as recorded in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub email: String,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub created_at: i64,
    /// Provider `txid` paying for this order
    #[serde(default)]
    pub payment_id: Option<String>,
}

impl Order {
    /// New pending order; `total` is Σ unit price × quantity, half-up at 2 dp
    pub fn new(id: i64, email: impl Into<String>, items: Vec<OrderItem>, now: i64) -> Self {
        let total = items
            .iter()
            .map(OrderItem::line_total)
            .sum::<Decimal>()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            id,
            email: email.into(),
            items,
            total,
            payment_status: PaymentStatus::Pending,
            delivery_status: DeliveryStatus::Pending,
            created_at: now,
            payment_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: Decimal, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: "P1".into(),
            product_name: "Conta".into(),
            quantity,
            unit_price: price,
        }
    }

    #[test]
    fn total_is_sum_of_lines_rounded() {
        let order = Order::new(
            1,
            "a@b.co",
            vec![item(Decimal::new(19_905, 3), 1), item(Decimal::new(1000, 2), 2)],
            0,
        );
        // 19.905 + 20.00 = 39.905, half-up to 39.91
        assert_eq!(order.total, Decimal::new(3991, 2));
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.delivery_status, DeliveryStatus::Pending);
    }
}
