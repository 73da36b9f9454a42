use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{RestockRequest, RestockResponse, StockLevel};

use crate::core::ServerState;
use crate::utils::validation::{MAX_PRODUCT_ID_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode, ValidJson};

/// 补充库存；只写入格式有效的记录
pub async fn restock(
    State(state): State<ServerState>,
    Path(product_id): Path<String>,
    ValidJson(request): ValidJson<RestockRequest>,
) -> AppResult<Json<RestockResponse>> {
    let product_id = known_product(&state, &product_id)?;

    if request.contas.is_empty() {
        return Err(AppError::validation("Nenhuma conta fornecida"));
    }

    let added = state.storage.add_many(&product_id, &request.contas)?;
    if added == 0 {
        return Err(AppError::new(ErrorCode::InvalidCredentialRecord));
    }

    tracing::info!(
        product_id = %product_id,
        submitted = request.contas.len(),
        added,
        "Inventory restocked"
    );
    Ok(Json(RestockResponse {
        sucesso: true,
        adicionadas: added,
    }))
}

pub async fn stock_level(
    State(state): State<ServerState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<StockLevel>> {
    let product_id = known_product(&state, &product_id)?;
    let disponiveis = state.storage.stock_count(&product_id)?;
    Ok(Json(StockLevel {
        product_id,
        disponiveis,
    }))
}

fn known_product(state: &ServerState, product_id: &str) -> AppResult<String> {
    validate_required_text(product_id, "productId", MAX_PRODUCT_ID_LEN)?;
    let product_id = product_id.trim();
    if state.coordinator.catalog().get(product_id).is_none() {
        return Err(AppError::with_message(
            ErrorCode::ProductNotFound,
            format!("Product not found: {product_id}"),
        ));
    }
    Ok(product_id.to_string())
}
