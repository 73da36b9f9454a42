//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`payments`] - 创建收费、支付方 webhook、收费状态
//! - [`download`] - 支付确认后下载凭据
//! - [`inventory`] - 库存补充与查询 (管理)
//! - [`orders`] - 订单查询
//! - [`alerts`] - 运营告警队列 (管理)

pub mod alerts;
pub mod download;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod payments;

use axum::Router;
use http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub use crate::utils::{AppError, AppResult};

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(payments::router())
        .merge(download::router())
        .merge(orders::router())
        // Admin API - 部署时在边缘限制 /admin/*
        .merge(inventory::router())
        .merge(alerts::router())
}

/// Build a fully configured application with all middleware
///
/// HTTP 服务器和 oneshot 测试共用
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        .layer(cors_layer(&state.config.cors_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Invalid CORS_ORIGIN, allowing any origin");
                AllowOrigin::any()
            }
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
