//! Provider wire types and the status taxonomy

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// ========== Wire DTOs ==========

#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest {
    pub grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_ttl")]
    pub expires_in: u64,
}

fn default_token_ttl() -> u64 {
    3600
}

/// `POST /v2/cob` body
#[derive(Debug, Serialize)]
pub(crate) struct ChargeRequest<'a> {
    pub calendario: Calendario,
    pub valor: Valor,
    pub chave: &'a str,
    #[serde(rename = "solicitacaoPagador")]
    pub solicitacao_pagador: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Calendario {
    pub expiracao: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct Valor {
    pub original: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChargeResponse {
    pub txid: String,
    pub loc: Location,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Location {
    pub id: i64,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QrCodeResponse {
    pub qrcode: String,
    #[serde(rename = "imagemQrcode")]
    pub imagem_qrcode: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChargeStatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct WebhookConfig<'a> {
    #[serde(rename = "webhookUrl")]
    pub webhook_url: &'a str,
}

// ========== Public results ==========

/// Result of `create_charge`
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedCharge {
    pub txid: String,
    pub location_id: i64,
    pub payment_url: String,
}

/// Result of `fetch_qr_code`
#[derive(Debug, Clone, PartialEq)]
pub struct QrCode {
    /// Copy-and-paste Pix code
    pub text: String,
    /// Data URL of the QR image
    pub image: String,
}

/// Charge status as seen by the coordinator
///
/// Only the exact provider string `CONCLUIDA` is [`ChargeStatus::Settled`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeStatus {
    /// `ATIVA`, or any status we do not know
    Awaiting(String),
    /// `CONCLUIDA`
    Settled,
    /// `REMOVIDA_PELO_USUARIO_RECEBEDOR` / `REMOVIDA_PELO_PSP`
    Removed(String),
}

impl ChargeStatus {
    pub fn from_provider(status: &str) -> Self {
        match status {
            "CONCLUIDA" => ChargeStatus::Settled,
            "REMOVIDA_PELO_USUARIO_RECEBEDOR" | "REMOVIDA_PELO_PSP" => {
                ChargeStatus::Removed(status.to_string())
            }
            other => ChargeStatus::Awaiting(other.to_string()),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, ChargeStatus::Settled)
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, ChargeStatus::Removed(_))
    }
}

/// Render an amount the way `valor.original` expects it (`"19.90"`)
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_concluida_is_settled() {
        assert!(ChargeStatus::from_provider("CONCLUIDA").is_settled());
        for s in ["ATIVA", "concluida", "CONCLUIDA ", "EM_PROCESSAMENTO", ""] {
            assert!(!ChargeStatus::from_provider(s).is_settled(), "{s}");
        }
    }

    #[test]
    fn removed_statuses() {
        assert!(ChargeStatus::from_provider("REMOVIDA_PELO_PSP").is_removed());
        assert!(ChargeStatus::from_provider("REMOVIDA_PELO_USUARIO_RECEBEDOR").is_removed());
        assert_eq!(
            ChargeStatus::from_provider("ATIVA"),
            ChargeStatus::Awaiting("ATIVA".into())
        );
    }

    #[test]
    fn amount_has_two_decimals() {
        assert_eq!(format_amount(Decimal::new(199, 1)), "19.90");
        assert_eq!(format_amount(Decimal::from(5)), "5.00");
        assert_eq!(format_amount(Decimal::new(10_005, 3)), "10.01");
    }

    #[test]
    fn charge_request_uses_provider_field_names() {
        let body = ChargeRequest {
            calendario: Calendario { expiracao: 3600 },
            valor: Valor {
                original: "19.90".into(),
            },
            chave: "chave-pix",
            solicitacao_pagador: "Pedido de a@b.co",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["calendario"]["expiracao"], 3600);
        assert_eq!(json["valor"]["original"], "19.90");
        assert_eq!(json["solicitacaoPagador"], "Pedido de a@b.co");
    }
}
