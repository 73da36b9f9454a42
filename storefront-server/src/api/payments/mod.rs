//! Payment API
//!
//! | Path | Method | Notes |
//! |------|--------|-------|
//! | /create-payment | POST | create the Pix charge for a one-item cart |
//! | /webhook | POST | provider notification, always 200 |
//! | /webhook/pix | POST | same; the provider appends `/pix` to the registered URL |
//! | /payments/{txid} | GET | binding status, never the credential |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/create-payment", post(handler::create_payment))
        .route("/webhook", post(handler::webhook))
        .route("/webhook/pix", post(handler::webhook))
        .route("/payments/{txid}", get(handler::payment_status))
}
