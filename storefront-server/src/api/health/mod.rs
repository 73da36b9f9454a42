//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 服务与数据库状态 |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "database": "ok", "uptime_seconds": 42 }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    /// ok | error
    database: &'static str,
    uptime_seconds: u64,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database = match state.storage.ping() {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Health check: database unavailable");
            "error"
        }
    };
    Json(HealthResponse {
        status: if database == "ok" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
