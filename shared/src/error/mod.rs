//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ErrorBody`]: JSON body every failed request returns
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order / checkout errors
//! - 5xxx: Payment errors
//! - 6xxx: Product / inventory errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::OutOfStock);
//! assert_eq!(err.http_status().as_u16(), 400);
//!
//! let err = AppError::new(ErrorCode::ProviderRequestFailed)
//!     .with_details("valor.original inválido");
//! assert_eq!(err.http_status().as_u16(), 500);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
