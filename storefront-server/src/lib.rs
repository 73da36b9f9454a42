//! Storefront Server - Pix 数字商品店面的支付到发货服务
//!
//! # 架构概述
//!
//! - **支付方客户端** (`pix-client` crate): OAuth 令牌、mTLS、收费 API
//! - **存储** (`store`): 嵌入式 redb，收费绑定、库存、订单、告警
//! - **协调器** (`fulfillment`): 收费状态机，每个 txid 恰好发放一次凭据
//! - **HTTP API** (`api`): 店面与管理接口
//!
//! # 模块结构
//!
//! ```text
//! storefront-server/src/
//! ├── core/          # 配置、状态、后台任务、错误
//! ├── api/           # HTTP 路由和处理器
//! ├── catalog/       # 只读商品目录
//! ├── fulfillment/   # 支付到发货协调器
//! ├── store/         # redb 存储层
//! └── utils/         # 日志、校验
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod fulfillment;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use catalog::ProductCatalog;
pub use crate::core::{Config, Server, ServerState};
pub use fulfillment::{ConfirmOutcome, ConfirmTrigger, PaymentCoordinator};
pub use store::Storage;
pub use utils::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 启动前的环境准备: 读取 `.env` 并初始化日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 不存在时忽略
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    let log_json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(log_level.as_deref(), log_json, log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   __         _        ___ _     
  / /  ___   (_) __ _ / _ (_)_ __
 / /__/ _ \  | |/ _` / ___/ \ \ /
/____/\___/ _/ |\__,_/_/  /_/_\_\
           |__/
    "#
    );
}
