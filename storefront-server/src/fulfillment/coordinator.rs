//! Payment-to-fulfillment coordinator
//!
//! Owns the charge binding lifecycle:
//!
//! ```text
//! create_payment ──► Created ──► AwaitingPayment
//!                                     │ confirm (poll / webhook)
//!                                     ▼
//!                                 Confirmed ──take_one──► Fulfilled
//! ```
//!
//! Confirm and fulfill for one txid are serialized twice over: a per-txid
//! async mutex, and a compare-and-swap on the stored status inside the redb
//! write transaction that also removes the credential record.

use dashmap::DashMap;
use pix_client::{ChargeStatus, PixProvider};
use shared::models::{
    AlertReason, BindingStatus, BindingView, ChargeBinding, CheckoutRequest, CredentialRecord,
    DeliveryStatus, FulfillmentAlert, Order, OrderItem, PaymentCreated, PaymentStatus,
};
use shared::util::{now_millis, snowflake_id};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::error::{CoordinatorError, CoordinatorResult};
use crate::catalog::ProductCatalog;
use crate::store::{Storage, StorageError};
use crate::utils::validation::{MAX_PRODUCT_ID_LEN, is_valid_email};

/// Who asked for the status check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmTrigger {
    /// Buyer polling `/download/{id}`
    Poll,
    /// Provider notification on `/webhook`
    Webhook,
}

/// Result of a confirm attempt
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Credential issued; `replayed` when it was issued by an earlier call
    Fulfilled {
        record: CredentialRecord,
        replayed: bool,
    },
    /// Provider has not settled the charge yet
    AwaitingPayment,
    Expired,
    /// Charge removed at the provider
    Failed,
    /// Paid, but no record was left; waiting on an operator
    Unfulfillable,
}

impl ConfirmOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ConfirmOutcome::Fulfilled { .. } => "fulfilled",
            ConfirmOutcome::AwaitingPayment => "awaiting_payment",
            ConfirmOutcome::Expired => "expired",
            ConfirmOutcome::Failed => "failed",
            ConfirmOutcome::Unfulfillable => "unfulfillable",
        }
    }
}

/// Payment-to-fulfillment coordinator
pub struct PaymentCoordinator {
    storage: Storage,
    provider: Arc<dyn PixProvider>,
    catalog: Arc<ProductCatalog>,
    charge_expiry_secs: u64,
    /// txid → confirm lock
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for PaymentCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentCoordinator")
            .field("charge_expiry_secs", &self.charge_expiry_secs)
            .field("in_flight", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl PaymentCoordinator {
    pub fn new(
        storage: Storage,
        provider: Arc<dyn PixProvider>,
        catalog: Arc<ProductCatalog>,
        charge_expiry_secs: u64,
    ) -> Self {
        Self {
            storage,
            provider,
            catalog,
            charge_expiry_secs,
            locks: DashMap::new(),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    // ========== Create ==========

    /// Validate the cart, create the Pix charge and bind it to the product
    pub async fn create_payment(&self, request: CheckoutRequest) -> CoordinatorResult<PaymentCreated> {
        let email = request.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(CoordinatorError::InvalidEmail);
        }

        let line = match request.items.as_slice() {
            [] => return Err(CoordinatorError::EmptyCart),
            [line] => line,
            _ => return Err(CoordinatorError::CartTooLarge),
        };
        match line.quantity {
            0 => return Err(CoordinatorError::InvalidCart("quantity must be at least 1".into())),
            1 => {}
            _ => return Err(CoordinatorError::CartTooLarge),
        }
        let product_id = line.id.trim();
        if product_id.is_empty() || product_id.len() > MAX_PRODUCT_ID_LEN {
            return Err(CoordinatorError::InvalidCart("invalid product id".into()));
        }

        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(|| CoordinatorError::ProductNotFound(product_id.to_string()))?;

        // 先查库存，避免无货时向支付方创建收费
        if !self.storage.has_stock(&product.id)? {
            tracing::info!(product_id = %product.id, "Checkout rejected: out of stock");
            return Err(CoordinatorError::OutOfStock(product.id.clone()));
        }

        let now = now_millis();
        let mut order = Order::new(
            snowflake_id(),
            email.as_str(),
            vec![OrderItem {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.price,
            }],
            now,
        );

        let charge = self
            .provider
            .create_charge(order.total, &format!("Pedido de {email}"), self.charge_expiry_secs)
            .await?;

        order.payment_id = Some(charge.txid.clone());
        let mut binding = ChargeBinding::new(
            charge.txid.as_str(),
            product.id.as_str(),
            order.id,
            order.total,
            charge.location_id,
            now,
            self.charge_expiry_secs,
        );

        let txn = self.storage.begin_write()?;
        self.storage.put_order_in(&txn, &order)?;
        self.storage.insert_binding_in(&txn, &binding)?;
        txn.commit().map_err(StorageError::from)?;

        binding.status = BindingStatus::AwaitingPayment;
        let txn = self.storage.begin_write()?;
        self.storage.update_binding_in(&txn, &binding)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            txid = %binding.txid,
            order_id = order.id,
            product_id = %binding.product_id,
            amount = %order.total,
            "Charge bound to order"
        );

        let qr = self.provider.fetch_qr_code(charge.location_id).await?;

        Ok(PaymentCreated {
            id: charge.txid,
            qr_code_id: charge.location_id,
            pix_url: charge.payment_url,
            qr_code: qr.text,
            qr_image: qr.image,
        })
    }

    // ========== Confirm / Fulfill ==========

    /// Evaluate the charge and hand out its credential once it is settled
    ///
    /// Idempotent: a fulfilled binding returns the record issued the first
    /// time, without touching the provider or the inventory.
    pub async fn confirm(&self, txid: &str, trigger: ConfirmTrigger) -> CoordinatorResult<ConfirmOutcome> {
        let lock = self.lock_for(txid);
        let outcome = {
            let _guard = lock.lock().await;
            self.confirm_locked(txid, trigger).await
        };
        drop(lock);
        self.release_lock_if_settled(txid, &outcome);
        outcome
    }

    async fn confirm_locked(&self, txid: &str, trigger: ConfirmTrigger) -> CoordinatorResult<ConfirmOutcome> {
        let binding = self
            .storage
            .get_binding(txid)?
            .ok_or_else(|| CoordinatorError::UnknownTransaction(txid.to_string()))?;

        match binding.status {
            BindingStatus::Fulfilled => Self::replay(&binding),
            BindingStatus::Failed => Ok(ConfirmOutcome::Failed),
            BindingStatus::Confirmed => Ok(ConfirmOutcome::Unfulfillable),
            BindingStatus::Expired => {
                if trigger == ConfirmTrigger::Webhook {
                    self.check_late_payment(&binding).await?;
                }
                Ok(ConfirmOutcome::Expired)
            }
            BindingStatus::Created | BindingStatus::AwaitingPayment => {
                let now = now_millis();
                if binding.is_overdue(now) {
                    let status = self.close_open_binding(&binding, BindingStatus::Expired)?;
                    if status == BindingStatus::Expired && trigger == ConfirmTrigger::Webhook {
                        self.check_late_payment(&binding).await?;
                    }
                    return self.outcome_for(txid, status);
                }

                match self.provider.charge_status(txid).await? {
                    ChargeStatus::Settled => self.fulfill(&binding),
                    ChargeStatus::Removed(provider_status) => {
                        tracing::info!(txid = %txid, status = %provider_status, "Charge removed at provider");
                        let status = self.close_open_binding(&binding, BindingStatus::Failed)?;
                        self.outcome_for(txid, status)
                    }
                    ChargeStatus::Awaiting(_) => Ok(ConfirmOutcome::AwaitingPayment),
                }
            }
        }
    }

    /// Confirm the binding and take exactly one record, in one transaction
    fn fulfill(&self, seen: &ChargeBinding) -> CoordinatorResult<ConfirmOutcome> {
        let now = now_millis();
        let txn = self.storage.begin_write()?;

        let mut binding = self
            .storage
            .get_binding_in(&txn, &seen.txid)?
            .ok_or_else(|| CoordinatorError::UnknownTransaction(seen.txid.clone()))?;
        if binding.status != seen.status {
            // 状态已被其他路径改变 (例如过期清扫)，按当前状态回答
            txn.abort().map_err(StorageError::from)?;
            return self.outcome_for(&seen.txid, binding.status);
        }

        binding.status = BindingStatus::Confirmed;
        binding.confirmed_at = Some(now);
        self.storage.update_binding_in(&txn, &binding)?;

        let mut order = self.storage.get_order_in(&txn, binding.order_id)?;
        order.payment_status = PaymentStatus::Paid;

        match self.storage.take_one_in(&txn, &binding.product_id) {
            Ok(record) => {
                binding.status = BindingStatus::Fulfilled;
                binding.fulfilled_at = Some(now);
                binding.issued_record = Some(record.payload.clone());
                self.storage.update_binding_in(&txn, &binding)?;

                order.delivery_status = DeliveryStatus::Delivered;
                self.storage.put_order_in(&txn, &order)?;
                txn.commit().map_err(StorageError::from)?;

                tracing::info!(
                    txid = %binding.txid,
                    order_id = order.id,
                    product_id = %binding.product_id,
                    "Payment confirmed, credential issued"
                );
                Ok(ConfirmOutcome::Fulfilled {
                    record,
                    replayed: false,
                })
            }
            Err(StorageError::StockExhausted(_)) => {
                self.storage.put_order_in(&txn, &order)?;
                self.put_alert_once_in(&txn, &binding, &order.email, AlertReason::OutOfStockAfterPayment, now)?;
                txn.commit().map_err(StorageError::from)?;

                tracing::error!(
                    txid = %binding.txid,
                    order_id = order.id,
                    product_id = %binding.product_id,
                    email = %order.email,
                    "Payment confirmed but stock is exhausted, operator alert raised"
                );
                Ok(ConfirmOutcome::Unfulfillable)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Re-run fulfillment for a confirmed-but-unfulfilled charge
    ///
    /// Only operator-triggered; resolves the alert when a record is issued.
    pub async fn retry_fulfillment(&self, txid: &str) -> CoordinatorResult<ConfirmOutcome> {
        let lock = self.lock_for(txid);
        let outcome = {
            let _guard = lock.lock().await;
            self.retry_locked(txid)
        };
        drop(lock);
        self.release_lock_if_settled(txid, &outcome);
        outcome
    }

    fn retry_locked(&self, txid: &str) -> CoordinatorResult<ConfirmOutcome> {
        let now = now_millis();
        let txn = self.storage.begin_write()?;

        let mut binding = self
            .storage
            .get_binding_in(&txn, txid)?
            .ok_or_else(|| CoordinatorError::UnknownTransaction(txid.to_string()))?;

        match binding.status {
            BindingStatus::Confirmed => {}
            BindingStatus::Fulfilled => {
                self.storage.resolve_alert_in(&txn, txid, now)?;
                txn.commit().map_err(StorageError::from)?;
                return Self::replay(&binding);
            }
            status => {
                return Err(CoordinatorError::InvalidState {
                    txid: txid.to_string(),
                    status,
                });
            }
        }

        let record = match self.storage.take_one_in(&txn, &binding.product_id) {
            Ok(record) => record,
            Err(StorageError::StockExhausted(product_id)) => {
                tracing::warn!(txid = %txid, product_id = %product_id, "Retry failed: still out of stock");
                txn.abort().map_err(StorageError::from)?;
                return Ok(ConfirmOutcome::Unfulfillable);
            }
            Err(e) => return Err(e.into()),
        };

        binding.status = BindingStatus::Fulfilled;
        binding.fulfilled_at = Some(now);
        binding.issued_record = Some(record.payload.clone());
        self.storage.update_binding_in(&txn, &binding)?;

        let mut order = self.storage.get_order_in(&txn, binding.order_id)?;
        order.delivery_status = DeliveryStatus::Delivered;
        self.storage.put_order_in(&txn, &order)?;
        self.storage.resolve_alert_in(&txn, txid, now)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(txid = %txid, order_id = order.id, "Fulfillment retried, credential issued");
        Ok(ConfirmOutcome::Fulfilled {
            record,
            replayed: false,
        })
    }

    // ========== Expiry ==========

    /// Expire every open binding past its horizon; returns how many changed
    pub async fn expire_overdue(&self, now: i64) -> CoordinatorResult<usize> {
        let mut expired = 0;
        for binding in self.storage.overdue_bindings(now)? {
            let lock = self.lock_for(&binding.txid);
            let status = {
                let _guard = lock.lock().await;
                self.close_open_binding(&binding, BindingStatus::Expired)
            };
            drop(lock);

            match status {
                Ok(BindingStatus::Expired) => {
                    self.locks.remove_if(&binding.txid, |_, m| Arc::strong_count(m) == 1);
                    expired += 1;
                    tracing::info!(txid = %binding.txid, order_id = binding.order_id, "Charge expired");
                }
                Ok(_) => {}
                Err(e) => tracing::error!(txid = %binding.txid, error = %e, "Failed to expire charge"),
            }
        }
        Ok(expired)
    }

    // ========== Reads ==========

    /// Binding status without the credential; never calls the provider
    pub fn payment_status(&self, txid: &str) -> CoordinatorResult<BindingView> {
        self.storage
            .get_binding(txid)?
            .map(|b| BindingView::from(&b))
            .ok_or_else(|| CoordinatorError::UnknownTransaction(txid.to_string()))
    }

    // ========== Helpers ==========

    fn lock_for(&self, txid: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(txid.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release_lock_if_settled(&self, txid: &str, outcome: &CoordinatorResult<ConfirmOutcome>) {
        let settled = matches!(
            outcome,
            Ok(ConfirmOutcome::Fulfilled { .. } | ConfirmOutcome::Expired | ConfirmOutcome::Failed)
                | Err(CoordinatorError::UnknownTransaction(_))
        );
        if settled {
            self.locks.remove_if(txid, |_, m| Arc::strong_count(m) == 1);
        }
    }

    fn replay(binding: &ChargeBinding) -> CoordinatorResult<ConfirmOutcome> {
        let payload = binding.issued_record.clone().ok_or_else(|| CoordinatorError::InvalidState {
            txid: binding.txid.clone(),
            status: binding.status,
        })?;
        Ok(ConfirmOutcome::Fulfilled {
            record: CredentialRecord {
                product_id: binding.product_id.clone(),
                payload,
            },
            replayed: true,
        })
    }

    /// Outcome for a binding whose status changed under us
    fn outcome_for(&self, txid: &str, status: BindingStatus) -> CoordinatorResult<ConfirmOutcome> {
        match status {
            BindingStatus::Created | BindingStatus::AwaitingPayment => Ok(ConfirmOutcome::AwaitingPayment),
            BindingStatus::Confirmed => Ok(ConfirmOutcome::Unfulfillable),
            BindingStatus::Expired => Ok(ConfirmOutcome::Expired),
            BindingStatus::Failed => Ok(ConfirmOutcome::Failed),
            BindingStatus::Fulfilled => {
                let binding = self
                    .storage
                    .get_binding(txid)?
                    .ok_or_else(|| CoordinatorError::UnknownTransaction(txid.to_string()))?;
                Self::replay(&binding)
            }
        }
    }

    /// Move an open binding to `Expired`/`Failed` and fail its order
    ///
    /// Returns the status the binding ends up in; a binding that is no longer
    /// open is left untouched.
    fn close_open_binding(&self, seen: &ChargeBinding, to: BindingStatus) -> CoordinatorResult<BindingStatus> {
        let txn = self.storage.begin_write()?;
        let mut binding = self
            .storage
            .get_binding_in(&txn, &seen.txid)?
            .ok_or_else(|| CoordinatorError::UnknownTransaction(seen.txid.clone()))?;
        if !binding.status.is_open() {
            txn.abort().map_err(StorageError::from)?;
            return Ok(binding.status);
        }

        binding.status = to;
        self.storage.update_binding_in(&txn, &binding)?;

        let mut order = self.storage.get_order_in(&txn, binding.order_id)?;
        order.payment_status = PaymentStatus::Failed;
        self.storage.put_order_in(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(to)
    }

    /// A webhook for an expired charge only raises an alert once the provider
    /// itself reports the charge as settled. The binding stays expired.
    async fn check_late_payment(&self, binding: &ChargeBinding) -> CoordinatorResult<()> {
        match self.provider.charge_status(&binding.txid).await {
            Ok(ChargeStatus::Settled) => self.raise_late_payment_alert(binding),
            Ok(status) => {
                tracing::debug!(txid = %binding.txid, status = ?status, "Webhook for expired charge, provider reports no payment");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(txid = %binding.txid, error = %e, "Could not verify payment on expired charge");
                Ok(())
            }
        }
    }

    fn raise_late_payment_alert(&self, binding: &ChargeBinding) -> CoordinatorResult<()> {
        let now = now_millis();
        let txn = self.storage.begin_write()?;
        let email = self.storage.get_order_in(&txn, binding.order_id)?.email;
        let raised = self.put_alert_once_in(&txn, binding, &email, AlertReason::LatePaymentOnExpiredCharge, now)?;
        txn.commit().map_err(StorageError::from)?;

        if raised {
            tracing::error!(
                txid = %binding.txid,
                order_id = binding.order_id,
                email = %email,
                "Payment notification for an expired charge, operator alert raised"
            );
        }
        Ok(())
    }

    /// Raise an alert unless one is already recorded for the txid
    fn put_alert_once_in(
        &self,
        txn: &redb::WriteTransaction,
        binding: &ChargeBinding,
        email: &str,
        reason: AlertReason,
        now: i64,
    ) -> CoordinatorResult<bool> {
        if self.storage.get_alert_in(txn, &binding.txid)?.is_some() {
            return Ok(false);
        }
        let alert = FulfillmentAlert {
            txid: binding.txid.clone(),
            order_id: binding.order_id,
            product_id: binding.product_id.clone(),
            email: email.to_string(),
            amount: binding.amount,
            reason,
            raised_at: now,
            resolved_at: None,
        };
        self.storage.put_alert_in(txn, &alert)?;
        Ok(true)
    }
}
