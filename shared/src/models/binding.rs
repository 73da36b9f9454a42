//! Charge binding
//!
//! A binding ties one provider transaction id (`txid`) to the product and
//! order it pays for. Its status follows:
//!
//! ```text
//! Created ──► AwaitingPayment ──► Confirmed ──► Fulfilled
//!    │              │
//!    └──────────────┴──► Failed | Expired
//! ```
//!
//! `Fulfilled`, `Failed` and `Expired` are terminal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Binding lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStatus {
    Created,
    AwaitingPayment,
    Confirmed,
    Fulfilled,
    Failed,
    Expired,
}

impl BindingStatus {
    /// No further transitions are allowed from a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fulfilled | Self::Failed | Self::Expired)
    }

    /// Still waiting for the provider to settle
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Created | Self::AwaitingPayment)
    }

    /// Whether `self → next` is an edge of the state machine
    pub fn can_transition_to(&self, next: BindingStatus) -> bool {
        use BindingStatus::*;
        matches!(
            (self, next),
            (Created, AwaitingPayment)
                | (Created | AwaitingPayment, Confirmed)
                | (Created | AwaitingPayment, Failed)
                | (Created | AwaitingPayment, Expired)
                | (Confirmed, Fulfilled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Confirmed => "confirmed",
            Self::Fulfilled => "fulfilled",
            Self::Failed => "failed",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for BindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted charge binding, keyed by `txid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeBinding {
    pub txid: String,
    /// Fixed at creation, never rebound
    pub product_id: String,
    pub order_id: i64,
    pub amount: Decimal,
    pub status: BindingStatus,
    /// Provider location id (QR code lookup)
    pub location_id: i64,
    pub created_at: i64,
    pub expires_at: i64,
    #[serde(default)]
    pub confirmed_at: Option<i64>,
    #[serde(default)]
    pub fulfilled_at: Option<i64>,
    /// Credential handed out for this charge, set together with `Fulfilled`
    #[serde(default)]
    pub issued_record: Option<String>,
}

impl ChargeBinding {
    /// New binding in `Created`, expiring `expiry_secs` after `now`
    pub fn new(
        txid: impl Into<String>,
        product_id: impl Into<String>,
        order_id: i64,
        amount: Decimal,
        location_id: i64,
        now: i64,
        expiry_secs: u64,
    ) -> Self {
        Self {
            txid: txid.into(),
            product_id: product_id.into(),
            order_id,
            amount,
            status: BindingStatus::Created,
            location_id,
            created_at: now,
            expires_at: now.saturating_add((expiry_secs as i64).saturating_mul(1000)),
            confirmed_at: None,
            fulfilled_at: None,
            issued_record: None,
        }
    }

    /// Open and past its expiry horizon
    pub fn is_overdue(&self, now: i64) -> bool {
        self.status.is_open() && now >= self.expires_at
    }
}

/// Binding as exposed by `GET /payments/{txid}`; never carries the credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingView {
    pub txid: String,
    pub product_id: String,
    pub order_id: i64,
    pub amount: Decimal,
    pub status: BindingStatus,
    pub created_at: i64,
    pub expires_at: i64,
    pub confirmed_at: Option<i64>,
    pub fulfilled_at: Option<i64>,
}

impl From<&ChargeBinding> for BindingView {
    fn from(b: &ChargeBinding) -> Self {
        Self {
            txid: b.txid.clone(),
            product_id: b.product_id.clone(),
            order_id: b.order_id,
            amount: b.amount,
            status: b.status,
            created_at: b.created_at,
            expires_at: b.expires_at,
            confirmed_at: b.confirmed_at,
            fulfilled_at: b.fulfilled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn binding(now: i64) -> ChargeBinding {
        ChargeBinding::new("tx-1", "P1", 1, Decimal::new(1990, 2), 7, now, 3600)
    }

    #[test]
    fn new_binding_expires_after_horizon() {
        let b = binding(1_000);
        assert_eq!(b.status, BindingStatus::Created);
        assert_eq!(b.expires_at, 1_000 + 3_600_000);
        assert!(!b.is_overdue(1_000 + 3_599_999));
        assert!(b.is_overdue(1_000 + 3_600_000));
    }

    #[test]
    fn terminal_bindings_are_never_overdue() {
        let mut b = binding(0);
        b.status = BindingStatus::Fulfilled;
        assert!(!b.is_overdue(i64::MAX));
    }

    #[test]
    fn transitions_follow_state_machine() {
        use BindingStatus::*;
        assert!(Created.can_transition_to(AwaitingPayment));
        assert!(AwaitingPayment.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Fulfilled));
        assert!(AwaitingPayment.can_transition_to(Expired));
        assert!(!Confirmed.can_transition_to(Expired));
        assert!(!Expired.can_transition_to(Confirmed));
        assert!(!Fulfilled.can_transition_to(Fulfilled));
        assert!(!Failed.can_transition_to(AwaitingPayment));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&BindingStatus::AwaitingPayment).unwrap();
        assert_eq!(json, "\"awaiting_payment\"");
    }

    #[test]
    fn view_hides_issued_record() {
        let mut b = binding(0);
        b.issued_record = Some("u1:p1".into());
        let json = serde_json::to_value(BindingView::from(&b)).unwrap();
        assert!(json.get("issued_record").is_none());
        assert!(!json.to_string().contains("u1:p1"));
    }
}
