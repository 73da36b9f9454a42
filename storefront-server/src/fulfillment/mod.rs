//! 支付到发货协调器
//!
//! - [`PaymentCoordinator`] - 创建收费、确认支付、一次性发放凭据
//! - [`CoordinatorError`] - 协调器错误及其 HTTP 映射

mod coordinator;
mod error;

pub use coordinator::{ConfirmOutcome, ConfirmTrigger, PaymentCoordinator};
pub use error::{CoordinatorError, CoordinatorResult};
