//! Logging Infrastructure
//!
//! Structured logging via `tracing-subscriber`, with optional daily rolling
//! file output and JSON formatting.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with defaults (stdout, `info`)
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level` when set. File output is only enabled
/// when `log_dir` already exists.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "storefront_server={level},pix_client={level},tower_http={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let file_appender = log_dir
        .map(Path::new)
        .filter(|dir| dir.exists())
        .map(|dir| tracing_appender::rolling::daily(dir, "storefront-server"));

    // 已初始化时忽略 (测试里会多次调用)
    let _ = match (json, file_appender) {
        (true, Some(appender)) => builder.json().with_writer(appender).try_init(),
        (true, None) => builder.json().try_init(),
        (false, Some(appender)) => builder.with_writer(appender).try_init(),
        (false, None) => builder.try_init(),
    };
}
