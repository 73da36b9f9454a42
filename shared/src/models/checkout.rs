//! Checkout and webhook payloads

use serde::{Deserialize, Serialize};

/// `POST /create-payment` request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub items: Vec<CartLine>,
}

/// One cart line as sent by the storefront
///
/// The page also sends `nome` and `preco`; both are ignored because the
/// server prices from its own catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    #[serde(default = "default_quantity", alias = "quantidade")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartLine {
    pub fn new(id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
        }
    }
}

/// `POST /create-payment` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCreated {
    /// Provider transaction id (`txid`), used for `/download/{id}`
    pub id: String,
    /// Provider location id of the charge
    pub qr_code_id: i64,
    /// Pix payload location URL
    pub pix_url: String,
    /// Copy-and-paste Pix code
    pub qr_code: String,
    /// QR image as a data URL
    pub qr_image: String,
}

/// `POST /webhook` body as delivered by the Pix provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub pix: Vec<PixNotification>,
}

/// One received Pix in a webhook delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixNotification {
    /// Absent for Pix transfers that were not made against a charge
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default, rename = "endToEndId")]
    pub end_to_end_id: Option<String>,
    #[serde(default)]
    pub valor: Option<String>,
    #[serde(default)]
    pub horario: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_line_accepts_storefront_shape() {
        let body = r#"{
            "email": "buyer@example.com",
            "items": [{ "id": "P1", "nome": "Conta", "preco": 19.9, "quantidade": 1 }]
        }"#;
        let req: CheckoutRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.items, vec![CartLine::new("P1", 1)]);
    }

    #[test]
    fn cart_line_quantity_defaults_to_one() {
        let line: CartLine = serde_json::from_str(r#"{ "id": "P1" }"#).unwrap();
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn missing_fields_deserialize_to_empty() {
        let req: CheckoutRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_empty());
        assert!(req.items.is_empty());
    }

    #[test]
    fn webhook_payload_parses_provider_shape() {
        let body = r#"{
            "pix": [{
                "endToEndId": "E1234",
                "txid": "tx-1",
                "valor": "19.90",
                "horario": "2024-05-01T12:00:00.000Z",
                "infoPagador": "pedido"
            }]
        }"#;
        let payload: WebhookPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.pix.len(), 1);
        assert_eq!(payload.pix[0].txid.as_deref(), Some("tx-1"));
        assert_eq!(payload.pix[0].end_to_end_id.as_deref(), Some("E1234"));
    }
}
