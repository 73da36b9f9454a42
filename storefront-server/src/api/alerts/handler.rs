use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::FulfillmentAlert;

use crate::core::ServerState;
use crate::utils::AppResult;

pub async fn list_open(State(state): State<ServerState>) -> AppResult<Json<Vec<FulfillmentAlert>>> {
    Ok(Json(state.storage.open_alerts()?))
}

#[derive(Debug, Serialize)]
pub struct RetryResponse {
    pub txid: String,
    /// fulfilled | unfulfillable
    pub status: &'static str,
}

/// 补货后手动重试发货；凭据本身只通过 /download 交付
pub async fn retry(State(state): State<ServerState>, Path(txid): Path<String>) -> AppResult<Json<RetryResponse>> {
    let outcome = state.coordinator.retry_fulfillment(&txid).await?;
    Ok(Json(RetryResponse {
        status: outcome.label(),
        txid,
    }))
}
