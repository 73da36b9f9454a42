//! Credential records and restock payloads

use serde::{Deserialize, Serialize};

/// Shortest accepted restock line after trimming
pub const MIN_RECORD_LEN: usize = 3;

/// One unused credential (`identifier:secret`) owned by a product
///
/// The payload is opaque to the service; it is only ever written to the
/// download response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub product_id: String,
    pub payload: String,
}

impl CredentialRecord {
    /// Parse one restock line; `None` for malformed lines
    ///
    /// A line is accepted when, after trimming, it contains a `:` and is at
    /// least 3 characters long (`a:b` is the shortest valid record).
    pub fn parse_line(product_id: &str, line: &str) -> Option<Self> {
        let line = line.trim();
        if line.contains(':') && line.chars().count() >= MIN_RECORD_LEN {
            Some(Self {
                product_id: product_id.to_string(),
                payload: line.to_string(),
            })
        } else {
            None
        }
    }
}

// 凭据内容不能出现在日志里
impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("product_id", &self.product_id)
            .field("payload", &"<redacted>")
            .finish()
    }
}

/// `POST /admin/estoque/{productId}` request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestockRequest {
    #[serde(default)]
    pub contas: Vec<String>,
}

/// `POST /admin/estoque/{productId}` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockResponse {
    pub sucesso: bool,
    pub adicionadas: usize,
}

/// `GET /admin/estoque/{productId}` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: String,
    pub disponiveis: u64,
}
