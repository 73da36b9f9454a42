//! Credential download
//!
//! `GET /download/{id}` checks the charge with the provider and hands out the
//! credential once it is settled. Repeated calls return the same credential.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/download/{id}", get(handler::download))
}
