//! Inventory admin API
//!
//! | Path | Method | Notes |
//! |------|--------|-------|
//! | /admin/estoque/{productId} | POST | append `login:senha` records |
//! | /admin/estoque/{productId} | GET | count of unused records |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/admin/estoque/{product_id}",
        get(handler::stock_level).post(handler::restock),
    )
}
