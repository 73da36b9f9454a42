//! 工具模块
//!
//! - [`extract`] - 请求体提取
//! - [`logger`] - 日志初始化
//! - [`validation`] - 输入校验

pub mod extract;
pub mod logger;
pub mod validation;

pub use extract::ValidJson;
pub use shared::error::{AppError, AppResult, ErrorCode};
