//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::InvalidChargeState => StatusCode::CONFLICT,

            // 403 Forbidden: the charge exists but is not (or no longer) payable
            Self::PaymentNotConfirmed | Self::ChargeExpired | Self::ChargeFailed => {
                StatusCode::FORBIDDEN
            }

            // 503 Service Unavailable (transient errors, client can retry)
            Self::ProviderTimeout => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::ProviderAuthFailed
            | Self::ProviderRequestFailed
            | Self::UnknownTransaction
            | Self::PaidButUnfulfilled
            | Self::InternalError
            | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::OrderEmpty
            | Self::CartTooLarge
            | Self::InvalidEmail
            | Self::ProductNotFound
            | Self::OutOfStock
            | Self::InvalidCredentialRecord => StatusCode::BAD_REQUEST,
        }
    }
}
