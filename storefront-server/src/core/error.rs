use pix_client::PixError;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::store::StorageError;

/// 启动与运行期的服务器错误
///
/// 请求级错误走 [`shared::error::AppError`]，这里只覆盖启动/监听失败。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("商品目录错误: {0}")]
    Catalog(#[from] CatalogError),

    #[error("支付方客户端错误: {0}")]
    Provider(#[from] PixError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
