//! 后台任务管理
//!
//! - [`TaskKind::Worker`] - 长期后台工作者
//! - [`TaskKind::Periodic`] - 定时任务 (过期清扫)

use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::fulfillment::PaymentCoordinator;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Worker,
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Worker => write!(f, "Worker"),
            TaskKind::Periodic => write!(f, "Periodic"),
        }
    }
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
///
/// 任务通过 [`shutdown_token`](Self::shutdown_token) 监听关闭信号；
/// panic 会被捕获并记录，不会拖垮进程。
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 获取取消令牌（用于任务内部监听 shutdown 信号）
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 注册并启动一个后台任务
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        let wrapped_future = async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) if token.is_cancelled() => {
                    tracing::debug!(task = %name, "Background task stopped");
                }
                Ok(()) => {
                    tracing::warn!(task = %name, kind = %kind, "Background task completed unexpectedly");
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(task = %name, kind = %kind, panic = %panic_msg, "Background task panicked");
                }
            }
        };

        let handle = tokio::spawn(wrapped_future);
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn log_summary(&self) {
        let periodic = self
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Periodic)
            .count();
        tracing::info!(
            total = self.tasks.len(),
            periodic,
            worker = self.tasks.len() - periodic,
            "Background tasks registered"
        );
    }

    /// Graceful shutdown - 取消所有任务并等待完成
    pub async fn shutdown(self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());
        self.shutdown.cancel();

        for task in self.tasks {
            match task.handle.await {
                Ok(()) => tracing::debug!(task = %task.name, "Task completed"),
                Err(e) if e.is_cancelled() => tracing::debug!(task = %task.name, "Task cancelled"),
                Err(e) => tracing::error!(task = %task.name, error = ?e, "Task panicked"),
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

/// 注册过期清扫任务
///
/// 与买家是否还在轮询无关，定期把超过 `expires_at` 的收费标记为过期。
pub fn register_expiry_sweeper(
    tasks: &mut BackgroundTasks,
    coordinator: Arc<PaymentCoordinator>,
    every: Duration,
) {
    let token = tasks.shutdown_token();
    tasks.spawn("expiry_sweeper", TaskKind::Periodic, async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    match coordinator.expire_overdue(shared::util::now_millis()).await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(expired = n, "Expiry sweep finished"),
                        Err(e) => tracing::error!(error = %e, "Expiry sweep failed"),
                    }
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn shutdown_cancels_periodic_tasks() {
        let mut tasks = BackgroundTasks::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let token = tasks.shutdown_token();
        let counter = ticks.clone();
        tasks.spawn("ticker", TaskKind::Periodic, async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_millis(5)) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        });
        assert_eq!(tasks.len(), 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        tasks.shutdown().await;
        let after = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after);
    }

    #[tokio::test]
    async fn panicking_task_does_not_poison_shutdown() {
        let mut tasks = BackgroundTasks::new();
        tasks.spawn("boom", TaskKind::Worker, async {
            panic!("boom");
        });
        tasks.shutdown().await;
    }
}
