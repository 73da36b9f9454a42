use pix_client::{PixClient, PixProvider};
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::ProductCatalog;
use crate::core::tasks::{BackgroundTasks, register_expiry_sweeper};
use crate::core::{Config, Result};
use crate::fulfillment::PaymentCoordinator;
use crate::store::Storage;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求 clone 一次成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | Storage | redb 存储 |
/// | coordinator | Arc<PaymentCoordinator> | 支付到发货协调器 |
/// | started_at | Instant | 启动时间 (健康检查) |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub storage: Storage,
    pub coordinator: Arc<PaymentCoordinator>,
    pub started_at: Instant,
}

impl ServerState {
    /// 用已构造好的组件创建状态
    ///
    /// 测试里用它注入假的支付方
    pub fn new(
        config: Config,
        storage: Storage,
        catalog: ProductCatalog,
        provider: Arc<dyn PixProvider>,
    ) -> Self {
        let coordinator = Arc::new(PaymentCoordinator::new(
            storage.clone(),
            provider,
            Arc::new(catalog),
            config.charge_expiry_secs,
        ));
        Self {
            config,
            storage,
            coordinator,
            started_at: Instant::now(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/storefront.redb)
    /// 3. 商品目录
    /// 4. Pix 客户端 (mTLS)，配置了 PIX_WEBHOOK_URL 时注册 webhook
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.validate()?;
        config.ensure_work_dir_structure()?;

        let storage = Storage::open(config.database_path())?;
        tracing::info!(path = %config.database_path().display(), "Database opened");

        let catalog = ProductCatalog::load(config.catalog_path())?;

        let pix = PixClient::new(config.pix.clone())?;
        if let Some(url) = &config.webhook_url {
            // 注册失败不阻止启动，轮询仍然可用
            if let Err(e) = pix.configure_webhook(url).await {
                tracing::error!(error = %e, webhook_url = %url, "Failed to register Pix webhook");
            }
        }

        Ok(Self::new(config.clone(), storage, catalog, Arc::new(pix)))
    }

    /// 启动后台任务
    ///
    /// 返回任务管理器，关闭时调用 [`BackgroundTasks::shutdown`]
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        register_expiry_sweeper(
            &mut tasks,
            self.coordinator.clone(),
            std::time::Duration::from_secs(self.config.expiry_sweep_secs),
        );
        tasks.log_summary();
        tasks
    }
}
