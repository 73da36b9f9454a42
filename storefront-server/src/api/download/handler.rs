use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use http::header;

use crate::core::ServerState;
use crate::fulfillment::{ConfirmOutcome, ConfirmTrigger};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Name the buyer's browser saves the credential under
const DOWNLOAD_FILENAME: &str = "conta.txt";

pub async fn download(State(state): State<ServerState>, Path(txid): Path<String>) -> AppResult<Response> {
    let outcome = state.coordinator.confirm(&txid, ConfirmTrigger::Poll).await?;

    match outcome {
        ConfirmOutcome::Fulfilled { record, replayed } => {
            tracing::debug!(txid = %txid, replayed, "Serving credential");
            Ok((
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
                    ),
                    (header::CACHE_CONTROL, "no-store".to_string()),
                ],
                record.payload,
            )
                .into_response())
        }
        ConfirmOutcome::AwaitingPayment => Err(AppError::new(ErrorCode::PaymentNotConfirmed)),
        ConfirmOutcome::Expired => Err(AppError::new(ErrorCode::ChargeExpired)),
        ConfirmOutcome::Failed => Err(AppError::new(ErrorCode::ChargeFailed)),
        ConfirmOutcome::Unfulfillable => Err(AppError::new(ErrorCode::PaidButUnfulfilled)),
    }
}
