//! 库存补充与运营告警

mod common;

use common::TestApp;
use http::StatusCode;
use pix_client::ChargeStatus;
use serde_json::json;
use shared::models::BindingStatus;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn restock_accepts_only_well_formed_lines() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/admin/estoque/P1", json!({ "contas": ["a:b", "bad", "c:d"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "sucesso": true, "adicionadas": 2 }));

    let (status, body) = app.get_json("/admin/estoque/P1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "product_id": "P1", "disponiveis": 2 }));
}

#[tokio::test]
async fn restock_rejects_empty_and_invalid_input() {
    let app = TestApp::new();

    let (status, body) = app.post_json("/admin/estoque/P1", json!({ "contas": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nenhuma conta fornecida");

    let (status, body) = app.post_json("/admin/estoque/P1", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nenhuma conta fornecida");

    let (status, body) = app
        .post_json("/admin/estoque/P1", json!({ "contas": ["semdoispontos", "  "] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6011);

    let (status, body) = app.post_json("/admin/estoque/P404", json!({ "contas": ["a:b"] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6001);

    assert_eq!(app.state.storage.stock_count("P1").unwrap(), 0);
}

#[tokio::test]
async fn restock_with_wrong_body_shape_is_a_bad_request() {
    let app = TestApp::new();

    for body in [json!({ "contas": "a:b" }), json!({ "contas": [1, 2] }), json!(["a:b"])] {
        let (status, reply) = app.post_json("/admin/estoque/P1", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body} answered {reply}");
        assert_eq!(reply["code"], 2);
    }
    assert_eq!(app.state.storage.stock_count("P1").unwrap(), 0);
}

#[tokio::test]
async fn paid_charge_without_stock_is_escalated_and_retried() {
    let app = TestApp::new();
    app.stock("P1", &["u1:p1"]);
    let txid = app.checkout("P1").await;
    // 另一笔订单先拿走了唯一的记录
    app.state.storage.take_one("P1").unwrap();
    app.pix.settle(&txid);

    let (status, _, body) = app.download(&txid).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("5040"));

    let (status, alerts) = app.get_json("/admin/alerts").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["txid"], txid.as_str());
    assert_eq!(alerts[0]["reason"], "out_of_stock_after_payment");
    assert_eq!(alerts[0]["email"], "comprador@example.com");

    let (status, body) = app.post_json(&format!("/admin/alerts/{txid}/retry"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unfulfillable");

    app.post_json("/admin/estoque/P1", json!({ "contas": ["novo:usuario"] })).await;
    let (status, body) = app.post_json(&format!("/admin/alerts/{txid}/retry"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "txid": txid, "status": "fulfilled" }));

    let (status, alerts) = app.get_json("/admin/alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert!(alerts.as_array().unwrap().is_empty());

    let (status, _, body) = app.download(&txid).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "novo:usuario");
}

#[tokio::test]
async fn retry_of_unpaid_charge_conflicts() {
    let app = TestApp::new();
    app.stock("P1", &["u1:p1"]);
    let txid = app.checkout("P1").await;

    let (status, body) = app.post_json(&format!("/admin/alerts/{txid}/retry"), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 5041);
}

#[tokio::test]
async fn expired_charge_refuses_download_and_flags_late_payment() {
    let app = TestApp::with_expiry(60);
    app.stock("P1", &["u1:p1"]);
    let txid = app.checkout("P1").await;

    let later = shared::util::now_millis() + 61_000;
    assert_eq!(app.state.coordinator.expire_overdue(later).await.unwrap(), 1);

    let (status, view) = app.get_json(&format!("/payments/{txid}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], BindingStatus::Expired.as_str());

    app.pix.settle(&txid);
    let (status, _, body) = app.download(&txid).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("5011"));

    let (status, _) = app.post_json("/webhook", json!({ "pix": [{ "txid": txid }] })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, alerts) = app.get_json("/admin/alerts").await;
    assert_eq!(alerts[0]["reason"], "late_payment_on_expired_charge");
    assert_eq!(app.state.storage.stock_count("P1").unwrap(), 1);
}

#[tokio::test]
async fn settled_after_deadline_is_refused_without_a_sweep() {
    let app = TestApp::with_expiry(0);
    app.stock("P1", &["u1:p1"]);
    let txid = app.checkout("P1").await;
    app.pix.settle(&txid);

    let (status, _, body) = app.download(&txid).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], 5011);
    assert_eq!(app.state.storage.stock_count("P1").unwrap(), 1);

    let (status, view) = app.get_json(&format!("/payments/{txid}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], BindingStatus::Expired.as_str());
}

#[tokio::test]
async fn webhook_for_unpaid_expired_charge_is_verified_at_provider() {
    let app = TestApp::with_expiry(0);
    app.stock("P1", &["u1:p1"]);
    let txid = app.checkout("P1").await;

    let before = app.pix.status_calls.load(Ordering::SeqCst);
    let (status, _) = app.post_json("/webhook", json!({ "pix": [{ "txid": txid }] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.pix.status_calls.load(Ordering::SeqCst), before + 1);

    let (_, alerts) = app.get_json("/admin/alerts").await;
    assert!(alerts.as_array().unwrap().is_empty());

    let (_, view) = app.get_json(&format!("/payments/{txid}")).await;
    assert_eq!(view["status"], BindingStatus::Expired.as_str());
    assert_eq!(app.state.storage.stock_count("P1").unwrap(), 1);
}

#[tokio::test]
async fn cancelled_charge_refuses_download() {
    let app = TestApp::new();
    app.stock("P1", &["u1:p1"]);
    let txid = app.checkout("P1").await;
    app.pix
        .set_status(&txid, ChargeStatus::Removed("REMOVIDA_PELO_USUARIO_RECEBEDOR".into()));

    let (status, _, body) = app.download(&txid).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("5012"));
    assert_eq!(app.state.storage.stock_count("P1").unwrap(), 1);
}
