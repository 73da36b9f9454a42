//! Order API Module
//!
//! Read-only access to orders. All mutations go through the payment coordinator.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().route("/orders/{id}", get(handler::get_by_id))
}
