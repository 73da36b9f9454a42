//! Coordinator errors and their HTTP mapping

use pix_client::PixError;
use shared::error::{AppError, ErrorCode};
use shared::models::BindingStatus;
use thiserror::Error;

use crate::store::StorageError;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Only one unit can be purchased per checkout")]
    CartTooLarge,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid cart: {0}")]
    InvalidCart(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Stock pre-check failed before any charge was created
    #[error("Product out of stock: {0}")]
    OutOfStock(String),

    #[error("Payment provider error: {0}")]
    Provider(#[from] PixError),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("Charge {txid} is {status}")]
    InvalidState { txid: String, status: BindingStatus },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Message the checkout page shows when the charge could not be created
const CHECKOUT_FAILED: &str = "Erro ao criar pagamento";

impl CoordinatorError {
    /// Checkout flavour: provider failures carry the provider body as `details`
    pub fn into_checkout_error(self) -> AppError {
        match self {
            CoordinatorError::Provider(PixError::Request { status, body }) => {
                tracing::error!(status, details = %body, "Pix charge creation rejected");
                AppError::with_message(ErrorCode::ProviderRequestFailed, CHECKOUT_FAILED)
                    .with_details(body)
            }
            CoordinatorError::Provider(PixError::Timeout) => {
                AppError::new(ErrorCode::ProviderTimeout)
            }
            CoordinatorError::Provider(e) => {
                tracing::error!(error = %e, "Pix charge creation failed");
                let code = match e {
                    PixError::Auth(_) => ErrorCode::ProviderAuthFailed,
                    _ => ErrorCode::ProviderRequestFailed,
                };
                AppError::with_message(code, CHECKOUT_FAILED).with_details(e.to_string())
            }
            other => other.into(),
        }
    }
}

/// Opaque mapping: provider and storage failures never leak internals
impl From<CoordinatorError> for AppError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::EmptyCart => AppError::new(ErrorCode::OrderEmpty),
            CoordinatorError::CartTooLarge => AppError::new(ErrorCode::CartTooLarge),
            CoordinatorError::InvalidEmail => AppError::new(ErrorCode::InvalidEmail),
            CoordinatorError::InvalidCart(msg) => AppError::validation(msg),
            CoordinatorError::ProductNotFound(id) => AppError::with_message(
                ErrorCode::ProductNotFound,
                format!("Product not found: {id}"),
            ),
            CoordinatorError::OutOfStock(_) => AppError::new(ErrorCode::OutOfStock),
            CoordinatorError::Provider(e) => {
                tracing::error!(error = %e, "Pix provider call failed");
                match e {
                    PixError::Timeout => AppError::new(ErrorCode::ProviderTimeout),
                    PixError::Auth(_) => AppError::new(ErrorCode::ProviderAuthFailed),
                    _ => AppError::new(ErrorCode::ProviderRequestFailed),
                }
            }
            CoordinatorError::UnknownTransaction(txid) => {
                tracing::warn!(txid = %txid, "No binding for transaction");
                AppError::new(ErrorCode::UnknownTransaction)
            }
            CoordinatorError::InvalidState { status, .. } => AppError::with_message(
                ErrorCode::InvalidChargeState,
                format!("Charge is {status}"),
            ),
            CoordinatorError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}
