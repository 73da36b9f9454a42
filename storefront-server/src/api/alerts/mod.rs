//! Operator alert queue
//!
//! | Path | Method | Notes |
//! |------|--------|-------|
//! | /admin/alerts | GET | open alerts, oldest first |
//! | /admin/alerts/{txid}/retry | POST | re-run fulfillment for a confirmed charge |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/admin/alerts", get(handler::list_open))
        .route("/admin/alerts/{txid}/retry", post(handler::retry))
}
