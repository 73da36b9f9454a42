//! Shared types for the storefront workspace
//!
//! Common types used by `pix-client` and `storefront-server`: the unified
//! error system, the wire/domain models of the checkout flow, and small
//! time/id utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
