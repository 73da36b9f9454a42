//! Unified error codes for the storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order / checkout errors
//! - 5xxx: Payment errors
//! - 6xxx: Product / inventory errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the storefront UI can
/// branch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Cart is empty
    OrderEmpty = 4007,
    /// Cart holds more than one digital unit
    CartTooLarge = 4010,
    /// Buyer email is missing or malformed
    InvalidEmail = 4011,

    // ==================== 5xxx: Payment ====================
    /// Payment has not been confirmed by the provider yet
    PaymentNotConfirmed = 5010,
    /// Charge expired before payment was confirmed
    ChargeExpired = 5011,
    /// Charge was removed / failed at the provider
    ChargeFailed = 5012,
    /// Provider rejected our credentials
    ProviderAuthFailed = 5020,
    /// Provider rejected a request
    ProviderRequestFailed = 5021,
    /// Provider did not answer in time
    ProviderTimeout = 5022,
    /// No binding exists for this transaction id
    UnknownTransaction = 5030,
    /// Buyer paid but no credential could be issued
    PaidButUnfulfilled = 5040,
    /// Binding is not in a state that allows this operation
    InvalidChargeState = 5041,

    // ==================== 6xxx: Product ====================
    /// Product not found in the catalog
    ProductNotFound = 6001,
    /// No unused credential record left for the product
    OutOfStock = 6010,
    /// Credential lines were all rejected
    InvalidCredentialRecord = 6011,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Cart is empty",
            ErrorCode::CartTooLarge => "Only one digital unit can be purchased per checkout",
            ErrorCode::InvalidEmail => "Invalid email",

            // Payment
            ErrorCode::PaymentNotConfirmed => "Payment has not been confirmed yet",
            ErrorCode::ChargeExpired => "Charge has expired",
            ErrorCode::ChargeFailed => "Charge was cancelled",
            ErrorCode::ProviderAuthFailed => "Payment provider authentication failed",
            ErrorCode::ProviderRequestFailed => "Payment provider request failed",
            ErrorCode::ProviderTimeout => "Payment provider timed out, please retry",
            ErrorCode::UnknownTransaction => "No product is bound to this transaction",
            ErrorCode::PaidButUnfulfilled => "Payment received but stock is exhausted; support has been notified",
            ErrorCode::InvalidChargeState => "Charge is not in a state that allows this operation",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::OutOfStock => "Product is out of stock",
            ErrorCode::InvalidCredentialRecord => "Invalid account format",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4010 => Ok(ErrorCode::CartTooLarge),
            4011 => Ok(ErrorCode::InvalidEmail),

            // Payment
            5010 => Ok(ErrorCode::PaymentNotConfirmed),
            5011 => Ok(ErrorCode::ChargeExpired),
            5012 => Ok(ErrorCode::ChargeFailed),
            5020 => Ok(ErrorCode::ProviderAuthFailed),
            5021 => Ok(ErrorCode::ProviderRequestFailed),
            5022 => Ok(ErrorCode::ProviderTimeout),
            5030 => Ok(ErrorCode::UnknownTransaction),
            5040 => Ok(ErrorCode::PaidButUnfulfilled),
            5041 => Ok(ErrorCode::InvalidChargeState),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6010 => Ok(ErrorCode::OutOfStock),
            6011 => Ok(ErrorCode::InvalidCredentialRecord),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::CartTooLarge.code(), 4010);
        assert_eq!(ErrorCode::PaymentNotConfirmed.code(), 5010);
        assert_eq!(ErrorCode::PaidButUnfulfilled.code(), 5040);
        assert_eq!(ErrorCode::OutOfStock.code(), 6010);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_matches_code() {
        let all = [
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::OrderNotFound,
            ErrorCode::OrderEmpty,
            ErrorCode::CartTooLarge,
            ErrorCode::InvalidEmail,
            ErrorCode::PaymentNotConfirmed,
            ErrorCode::ChargeExpired,
            ErrorCode::ChargeFailed,
            ErrorCode::ProviderAuthFailed,
            ErrorCode::ProviderRequestFailed,
            ErrorCode::ProviderTimeout,
            ErrorCode::UnknownTransaction,
            ErrorCode::PaidButUnfulfilled,
            ErrorCode::InvalidChargeState,
            ErrorCode::ProductNotFound,
            ErrorCode::OutOfStock,
            ErrorCode::InvalidCredentialRecord,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::OutOfStock).unwrap();
        assert_eq!(json, "6010");
        let code: ErrorCode = serde_json::from_str("5010").unwrap();
        assert_eq!(code, ErrorCode::PaymentNotConfirmed);
    }
}
