//! Operator alerts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why a charge needs manual attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    /// Buyer paid, but no credential was left for the product
    OutOfStockAfterPayment,
    /// Provider reported funds for a charge that had already expired
    LatePaymentOnExpiredCharge,
}

/// Persisted alert, keyed by `txid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentAlert {
    pub txid: String,
    pub order_id: i64,
    pub product_id: String,
    pub email: String,
    pub amount: Decimal,
    pub reason: AlertReason,
    pub raised_at: i64,
    #[serde(default)]
    pub resolved_at: Option<i64>,
}

impl FulfillmentAlert {
    pub fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }
}
