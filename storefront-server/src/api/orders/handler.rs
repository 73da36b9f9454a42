//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::Order;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Get order by id
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Order>> {
    let order = state
        .storage
        .get_order(id)?
        .ok_or_else(|| AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found")))?;
    Ok(Json(order))
}
