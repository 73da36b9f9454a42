//! Provider client configuration

use crate::error::{PixError, PixResult};

/// Production Efí Pix endpoint
pub const DEFAULT_BASE_URL: &str = "https://pix.api.efipay.com.br";

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Pix provider configuration
///
/// | Variable | Default |
/// |----------|---------|
/// | `EFI_BASE_URL` | `https://pix.api.efipay.com.br` |
/// | `EFI_CLIENT_ID` | (empty) |
/// | `EFI_CLIENT_SECRET` | (empty) |
/// | `EFI_PIX_KEY` | (empty) |
/// | `EFI_CERT_PATH` | none |
/// | `EFI_KEY_PATH` | none |
/// | `EFI_TIMEOUT_SECS` | 10 |
#[derive(Clone)]
pub struct PixConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Receiver Pix key (`chave`)
    pub pix_key: String,
    /// PEM client certificate for mutual TLS
    pub cert_path: Option<String>,
    /// PEM private key matching `cert_path`
    pub key_path: Option<String>,
    pub timeout_secs: u64,
}

impl PixConfig {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        pix_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            pix_key: pix_key.into(),
            cert_path: None,
            key_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("EFI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            client_id: std::env::var("EFI_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("EFI_CLIENT_SECRET").unwrap_or_default(),
            pix_key: std::env::var("EFI_PIX_KEY").unwrap_or_default(),
            cert_path: std::env::var("EFI_CERT_PATH").ok(),
            key_path: std::env::var("EFI_KEY_PATH").ok(),
            timeout_secs: std::env::var("EFI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_client_identity(
        mut self,
        cert_path: impl Into<String>,
        key_path: impl Into<String>,
    ) -> Self {
        self.cert_path = Some(cert_path.into());
        self.key_path = Some(key_path.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Check that credentials and the Pix key are present
    pub fn validate(&self) -> PixResult<()> {
        require_secret("EFI_CLIENT_ID", &self.client_id)?;
        require_secret("EFI_CLIENT_SECRET", &self.client_secret)?;
        require_secret("EFI_PIX_KEY", &self.pix_key)?;
        if self.cert_path.is_some() != self.key_path.is_some() {
            return Err(PixError::Config(
                "EFI_CERT_PATH and EFI_KEY_PATH must be set together".into(),
            ));
        }
        Ok(())
    }
}

fn require_secret(name: &str, value: &str) -> PixResult<()> {
    if value.trim().is_empty() {
        return Err(PixError::Config(format!("{name} must be set")));
    }
    Ok(())
}

impl std::fmt::Debug for PixConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("pix_key", &self.pix_key)
            .field("cert_path", &self.cert_path)
            .field("key_path", &self.key_path)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
