//! 集成测试公共设施: 假支付方 + 临时目录里的完整应用
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use pix_client::{ChargeStatus, CreatedCharge, PixError, PixProvider, PixResult, QrCode};
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::Product;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storefront_server::api::build_app;
use storefront_server::{Config, ProductCatalog, ServerState, Storage};
use tempfile::TempDir;
use tower::ServiceExt;

/// How the fake provider answers `create_charge`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    Ok,
    Rejected,
    Timeout,
}

/// In-memory stand-in for the Pix API
pub struct FakePix {
    statuses: Mutex<HashMap<String, ChargeStatus>>,
    create_mode: Mutex<CreateMode>,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl FakePix {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(HashMap::new()),
            create_mode: Mutex::new(CreateMode::Ok),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn settle(&self, txid: &str) {
        self.set_status(txid, ChargeStatus::Settled);
    }

    pub fn set_status(&self, txid: &str, status: ChargeStatus) {
        self.statuses.lock().unwrap().insert(txid.to_string(), status);
    }

    pub fn set_create_mode(&self, mode: CreateMode) {
        *self.create_mode.lock().unwrap() = mode;
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PixProvider for FakePix {
    async fn create_charge(
        &self,
        _amount: Decimal,
        _payer_note: &str,
        _expiry_secs: u64,
    ) -> PixResult<CreatedCharge> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let mode = *self.create_mode.lock().unwrap();
        match mode {
            CreateMode::Ok => Ok(CreatedCharge {
                txid: format!("txid{n:04}"),
                location_id: n as i64,
                payment_url: format!("qrcodes.example.com/v2/{n}"),
            }),
            CreateMode::Rejected => Err(PixError::Request {
                status: 400,
                body: serde_json::json!({
                    "nome": "valor_invalido",
                    "mensagem": "Campo valor.original inválido",
                }),
            }),
            CreateMode::Timeout => Err(PixError::Timeout),
        }
    }

    async fn fetch_qr_code(&self, location_id: i64) -> PixResult<QrCode> {
        Ok(QrCode {
            text: format!("00020101021226830014BR.GOV.BCB.PIX-{location_id}"),
            image: "data:image/png;base64,iVBORw0KGgo=".into(),
        })
    }

    async fn charge_status(&self, txid: &str) -> PixResult<ChargeStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(txid)
            .cloned()
            .unwrap_or_else(|| ChargeStatus::Awaiting("ATIVA".into())))
    }
}

/// A full application over a temporary redb file
pub struct TestApp {
    pub state: ServerState,
    pub pix: Arc<FakePix>,
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_expiry(3600)
    }

    pub fn with_expiry(charge_expiry_secs: u64) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        config.charge_expiry_secs = charge_expiry_secs;
        config.ensure_work_dir_structure().unwrap();

        let storage = Storage::open(config.database_path()).unwrap();
        let catalog = ProductCatalog::from_products(vec![
            Product {
                id: "P1".into(),
                name: "Conta Streaming".into(),
                price: Decimal::new(1990, 2),
            },
            Product {
                id: "P2".into(),
                name: "Conta Música".into(),
                price: Decimal::new(990, 2),
            },
        ])
        .unwrap();

        let pix = Arc::new(FakePix::new());
        let state = ServerState::new(config, storage, catalog, pix.clone());
        let router = build_app(&state).with_state(state.clone());

        Self {
            state,
            pix,
            router,
            _dir: dir,
        }
    }

    pub fn stock(&self, product_id: &str, lines: &[&str]) {
        self.state.storage.add_many(product_id, lines).unwrap();
    }

    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Bytes) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes)
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.call(Method::GET, uri, None).await;
        (status, parse(&body))
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, _, body) = self.call(Method::POST, uri, Some(body)).await;
        (status, parse(&body))
    }

    /// POST /create-payment for one unit; returns the txid
    pub async fn checkout(&self, product_id: &str) -> String {
        let (status, body) = self
            .post_json(
                "/create-payment",
                serde_json::json!({
                    "email": "comprador@example.com",
                    "items": [{ "id": product_id, "nome": "ignored", "preco": 0.01 }],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "checkout failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn download(&self, txid: &str) -> (StatusCode, HeaderMap, String) {
        let (status, headers, body) = self.call(Method::GET, &format!("/download/{txid}"), None).await;
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }
}

fn parse(body: &[u8]) -> Value {
    if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into()))
    }
}
