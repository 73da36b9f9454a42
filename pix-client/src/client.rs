//! Pix provider client

use crate::config::PixConfig;
use crate::error::{PixError, PixResult};
use crate::token::TokenCache;
use crate::types::{
    Calendario, ChargeRequest, ChargeResponse, ChargeStatus, ChargeStatusResponse, CreatedCharge,
    QrCode, QrCodeResponse, TokenRequest, TokenResponse, Valor, WebhookConfig, format_amount,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// What the payment coordinator needs from a Pix provider
#[async_trait]
pub trait PixProvider: Send + Sync {
    /// Create an immediate charge (`cob`) for `amount`
    async fn create_charge(
        &self,
        amount: Decimal,
        payer_note: &str,
        expiry_secs: u64,
    ) -> PixResult<CreatedCharge>;

    /// Fetch the copy-and-paste code and QR image for a charge location
    async fn fetch_qr_code(&self, location_id: i64) -> PixResult<QrCode>;

    /// Current status of a charge
    async fn charge_status(&self, txid: &str) -> PixResult<ChargeStatus>;
}

/// Efí Pix API client over mutual TLS
pub struct PixClient {
    http: Client,
    config: PixConfig,
    tokens: TokenCache,
}

impl PixClient {
    /// Build the client; loads the mTLS identity when configured
    pub fn new(config: PixConfig) -> PixResult<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let (Some(cert_path), Some(key_path)) = (&config.cert_path, &config.key_path) {
            let mut identity_pem = std::fs::read(cert_path)
                .map_err(|e| PixError::Config(format!("Failed to read {cert_path}: {e}")))?;
            identity_pem.push(b'\n');
            identity_pem.extend(
                std::fs::read(key_path)
                    .map_err(|e| PixError::Config(format!("Failed to read {key_path}: {e}")))?,
            );
            let identity = reqwest::Identity::from_pem(&identity_pem)
                .map_err(|e| PixError::Config(format!("Failed to create identity: {e}")))?;
            builder = builder.identity(identity);
        }

        let http = builder
            .build()
            .map_err(|e| PixError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            tokens: TokenCache::new(),
        })
    }

    pub fn config(&self) -> &PixConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Current access token, exchanging client credentials when needed
    pub async fn authenticate(&self) -> PixResult<String> {
        self.tokens.get_or_refresh(|| self.request_token()).await
    }

    async fn request_token(&self) -> PixResult<(String, u64)> {
        tracing::debug!("Requesting Pix access token");
        let response = self
            .http
            .post(self.url("/oauth/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .json(&TokenRequest {
                grant_type: "client_credentials",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PixError::Auth(format!("token endpoint returned {status}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PixError::InvalidResponse(format!("token response: {e}")))?;
        Ok((token.access_token, token.expires_in))
    }

    /// Register the URL the provider calls when a Pix is received
    pub async fn configure_webhook(&self, webhook_url: &str) -> PixResult<()> {
        let request = self
            .http
            .put(self.url(&format!("/v2/webhook/{}", self.config.pix_key)))
            .json(&WebhookConfig { webhook_url });
        let _: Value = self.send(request).await?;
        tracing::info!(webhook_url = %webhook_url, "Pix webhook registered");
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PixResult<T> {
        let token = self.authenticate().await?;
        let response = request.bearer_auth(token).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> PixResult<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
            return Err(PixError::Auth("access token rejected".into()));
        }

        if !status.is_success() {
            let text = response.text().await?;
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Err(PixError::Request {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                PixError::Timeout
            } else {
                PixError::InvalidResponse(e.to_string())
            }
        })
    }
}

#[async_trait]
impl PixProvider for PixClient {
    async fn create_charge(
        &self,
        amount: Decimal,
        payer_note: &str,
        expiry_secs: u64,
    ) -> PixResult<CreatedCharge> {
        let body = ChargeRequest {
            calendario: Calendario {
                expiracao: expiry_secs,
            },
            valor: Valor {
                original: format_amount(amount),
            },
            chave: &self.config.pix_key,
            solicitacao_pagador: payer_note,
        };
        let charge: ChargeResponse = self
            .send(self.http.post(self.url("/v2/cob")).json(&body))
            .await?;

        tracing::info!(txid = %charge.txid, location_id = charge.loc.id, "Pix charge created");
        Ok(CreatedCharge {
            txid: charge.txid,
            location_id: charge.loc.id,
            payment_url: charge.loc.location,
        })
    }

    async fn fetch_qr_code(&self, location_id: i64) -> PixResult<QrCode> {
        let qr: QrCodeResponse = self
            .send(self.http.get(self.url(&format!("/v2/loc/{location_id}/qrcode"))))
            .await?;
        Ok(QrCode {
            text: qr.qrcode,
            image: qr.imagem_qrcode,
        })
    }

    async fn charge_status(&self, txid: &str) -> PixResult<ChargeStatus> {
        let charge: ChargeStatusResponse = self
            .send(self.http.get(self.url(&format!("/v2/cob/{txid}"))))
            .await?;
        tracing::debug!(txid = %txid, status = %charge.status, "Pix charge status");
        Ok(ChargeStatus::from_provider(&charge.status))
    }
}
