use pix_client::PixConfig;
use std::path::PathBuf;

use crate::core::ServerError;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、商品目录) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | CORS_ORIGIN | http://localhost:5173 | 店面前端地址 |
/// | CATALOG_PATH | $WORK_DIR/catalog.json | 商品目录文件 |
/// | CHARGE_EXPIRY_SECS | 3600 | Pix 收费有效期 (秒) |
/// | EXPIRY_SWEEP_SECS | 60 | 过期清扫间隔 (秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志目录，存在时按天滚动写文件 |
/// | LOG_JSON | false | JSON 日志 |
/// | PIX_WEBHOOK_URL | (无) | 启动时向支付方注册的 webhook 地址 |
///
/// 支付方相关变量 (`EFI_*`) 见 [`PixConfig`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/loja HTTP_PORT=8080 cargo run -p storefront-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 允许跨域的店面地址
    pub cors_origin: String,
    /// 商品目录文件 (未设置时使用 work_dir/catalog.json)
    pub catalog_path: Option<String>,
    /// 收费有效期 (秒)
    pub charge_expiry_secs: u64,
    /// 过期清扫间隔 (秒)
    pub expiry_sweep_secs: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// Pix 支付方配置
    pub pix: PixConfig,
    /// webhook 注册地址
    pub webhook_url: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            catalog_path: std::env::var("CATALOG_PATH").ok(),
            charge_expiry_secs: std::env::var("CHARGE_EXPIRY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            expiry_sweep_secs: std::env::var("EXPIRY_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            pix: PixConfig::from_env(),
            webhook_url: std::env::var("PIX_WEBHOOK_URL").ok().filter(|u| !u.is_empty()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.catalog_path = None;
        config
    }

    /// 启动前检查；非开发环境必须配置支付方凭据
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.charge_expiry_secs == 0 {
            return Err(ServerError::Config("CHARGE_EXPIRY_SECS must be positive".into()));
        }
        if self.expiry_sweep_secs == 0 {
            return Err(ServerError::Config("EXPIRY_SWEEP_SECS must be positive".into()));
        }
        match self.pix.validate() {
            Ok(()) => Ok(()),
            Err(e) if self.is_development() => {
                tracing::warn!(error = %e, "Pix provider not fully configured (development)");
                Ok(())
            }
            Err(e) => Err(ServerError::Config(format!("{e} in {} environment", self.environment))),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 数据库文件: work_dir/database/storefront.redb
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("storefront.redb")
    }

    /// 商品目录文件
    pub fn catalog_path(&self) -> PathBuf {
        match &self.catalog_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.work_dir).join("catalog.json"),
        }
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
