//! Payment API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use http::StatusCode;
use shared::models::{BindingView, CheckoutRequest, PaymentCreated, WebhookPayload};

use crate::core::ServerState;
use crate::fulfillment::{ConfirmTrigger, CoordinatorError};
use crate::utils::{AppError, AppResult, ValidJson};

/// Create the Pix charge and return its QR code
pub async fn create_payment(
    State(state): State<ServerState>,
    ValidJson(request): ValidJson<CheckoutRequest>,
) -> AppResult<Json<PaymentCreated>> {
    let created = state
        .coordinator
        .create_payment(request)
        .await
        .map_err(CoordinatorError::into_checkout_error)?;
    Ok(Json(created))
}

/// Provider notification
///
/// Answers 200 whatever happens so the provider does not retry forever; the
/// notification only triggers a status check against the provider.
pub async fn webhook(State(state): State<ServerState>, body: Bytes) -> StatusCode {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed webhook body");
            return StatusCode::OK;
        }
    };

    if payload.pix.is_empty() {
        // 注册 webhook 时支付方会发送不带 pix 的探测请求
        tracing::debug!("Webhook without pix entries");
        return StatusCode::OK;
    }

    for notification in payload.pix {
        let Some(txid) = notification.txid.as_deref().filter(|t| !t.is_empty()) else {
            tracing::warn!(end_to_end_id = ?notification.end_to_end_id, "Webhook entry without txid");
            continue;
        };

        match state.coordinator.confirm(txid, ConfirmTrigger::Webhook).await {
            Ok(outcome) => {
                tracing::info!(txid = %txid, outcome = outcome.label(), "Webhook processed");
            }
            Err(CoordinatorError::UnknownTransaction(_)) => {
                tracing::info!(txid = %txid, "Webhook for unknown transaction ignored");
            }
            Err(e) => {
                tracing::error!(txid = %txid, error = %e, "Webhook processing failed");
            }
        }
    }

    StatusCode::OK
}

/// Binding status for the success page
pub async fn payment_status(
    State(state): State<ServerState>,
    Path(txid): Path<String>,
) -> AppResult<Json<BindingView>> {
    match state.coordinator.payment_status(&txid) {
        Ok(view) => Ok(Json(view)),
        Err(CoordinatorError::UnknownTransaction(_)) => Err(AppError::not_found(format!("Charge {txid}"))),
        Err(e) => Err(e.into()),
    }
}
