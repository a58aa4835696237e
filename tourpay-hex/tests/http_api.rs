//! Router-level tests: JSON in, JSON out, status codes from the error taxonomy.
//!
//! Runs against an in-memory SQLite repository and a stub gateway.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use tower::ServiceExt;

use tourpay_hex::inbound::{HttpServer, signature};
use tourpay_hex::PaymentService;
use tourpay_repo::SqliteRepo;
use tourpay_types::{
    GatewayCard, GatewayError, OrderIntent, OrderResult, PaymentGateway, PaymentIntent,
    PaymentResult, PixResult, RefundResult,
};

const SECRET: &str = "whsec_test";

/// Approves everything; `get_payment` reports whatever `remote_status` holds.
struct StubGateway {
    remote_status: Mutex<String>,
}

impl StubGateway {
    fn new() -> Self {
        Self {
            remote_status: Mutex::new("approved".into()),
        }
    }

    fn payment(&self, id: &str, status: &str) -> PaymentResult {
        PaymentResult {
            id: id.into(),
            status: status.into(),
            status_detail: Some("accredited".into()),
            amount: None,
            captured: None,
            issuer_id: None,
            card: Some(GatewayCard {
                last_four_digits: Some("4242".into()),
                first_six_digits: Some("424242".into()),
                cardholder_name: None,
            }),
        }
    }

    fn order(&self, id: &str, status: &str) -> OrderResult {
        OrderResult {
            id: id.into(),
            status: "processed".into(),
            status_detail: None,
            payments: vec![self.payment("PAY-1", status)],
        }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(&self, _intent: &OrderIntent) -> Result<OrderResult, GatewayError> {
        Ok(self.order("ORD-1", "approved"))
    }

    async fn get_order(&self, order_id: &str) -> Result<OrderResult, GatewayError> {
        let status = self.remote_status.lock().unwrap().clone();
        Ok(self.order(order_id, &status))
    }

    async fn cancel_order(&self, order_id: &str, _key: &str) -> Result<OrderResult, GatewayError> {
        Ok(self.order(order_id, "cancelled"))
    }

    async fn capture_order(&self, order_id: &str, _key: &str) -> Result<OrderResult, GatewayError> {
        Ok(self.order(order_id, "approved"))
    }

    async fn refund_order(
        &self,
        order_id: &str,
        _amount: Option<Decimal>,
        _key: &str,
    ) -> Result<OrderResult, GatewayError> {
        Ok(self.order(order_id, "refunded"))
    }

    async fn create_payment(&self, _intent: &PaymentIntent) -> Result<PaymentResult, GatewayError> {
        Ok(self.payment("PAY-T", "pending"))
    }

    async fn create_pix_payment(&self, _intent: &PaymentIntent) -> Result<PixResult, GatewayError> {
        Ok(PixResult {
            payment: self.payment("PAY-PIX", "pending"),
            qr_code: Some("00020126580014br.gov.bcb.pix".into()),
            qr_code_base64: None,
            ticket_url: None,
            expires_at: None,
        })
    }

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentResult, GatewayError> {
        let status = self.remote_status.lock().unwrap().clone();
        Ok(self.payment(payment_id, &status))
    }

    async fn cancel_payment(&self, payment_id: &str) -> Result<PaymentResult, GatewayError> {
        Ok(self.payment(payment_id, "cancelled"))
    }

    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Option<Decimal>,
        _key: &str,
    ) -> Result<RefundResult, GatewayError> {
        Ok(RefundResult {
            id: "REF-1".into(),
            payment_id: payment_id.into(),
            amount: amount.unwrap_or_default(),
            status: "approved".into(),
        })
    }
}

async fn create_app() -> axum::Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let service = PaymentService::new(repo, StubGateway::new());
    HttpServer::new(service).with_webhook_secret(SECRET).router()
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn authorize_body() -> serde_json::Value {
    serde_json::json!({
        "client_id": "5b0f5c1e-7d4e-4c4a-9a57-1c1d0e1f2a3b",
        "company_id": "9c7a8e6d-2b1f-4e3a-8c9d-0a1b2c3d4e5f",
        "amount": "150.00",
        "currency": "BRL",
        "payment_method": "credit_card",
        "installment_count": 2,
        "card_token": "tok_123",
        "payer": { "email": "ana@example.com" }
    })
}

#[tokio::test]
async fn test_health() {
    let app = create_app().await;
    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_then_get_payment() {
    let app = create_app().await;

    let (status, created) = send(
        &app,
        json_request(
            Method::POST,
            "/api/payments",
            serde_json::json!({
                "client_id": "5b0f5c1e-7d4e-4c4a-9a57-1c1d0e1f2a3b",
                "company_id": "9c7a8e6d-2b1f-4e3a-8c9d-0a1b2c3d4e5f",
                "amount": "99.90",
                "currency": "BRL",
                "payment_method": "pix"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["amount"], "99.90");

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, empty_request(Method::GET, &format!("/api/payments/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["payment_method_display"], created["payment_method_display"]);

    let (status, list) = send(
        &app,
        empty_request(
            Method::GET,
            "/api/clients/5b0f5c1e-7d4e-4c4a-9a57-1c1d0e1f2a3b/payments",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_error_bodies_follow_taxonomy() {
    let app = create_app().await;

    let (status, body) = send(&app, empty_request(Method::GET, "/api/payments/not-a-uuid")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["code"], 422);

    let (status, body) = send(
        &app,
        empty_request(
            Method::GET,
            "/api/payments/00000000-0000-4000-8000-000000000000",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let mut negative = authorize_body();
    negative["amount"] = serde_json::json!("-5");
    let (status, body) = send(&app, json_request(Method::POST, "/api/payments/authorize", negative)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_authorize_cancel_conflict_and_refund() {
    let app = create_app().await;

    let (status, payment) = send(
        &app,
        json_request(Method::POST, "/api/payments/authorize", authorize_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["status"], "approved");
    assert_eq!(payment["gateway_order_id"], "ORD-1");
    assert_eq!(payment["card"]["last_four_digits"], "4242");

    let id = payment["id"].as_str().unwrap().to_string();

    // A settled payment must be refunded, not cancelled.
    let (status, body) = send(&app, empty_request(Method::POST, &format!("/api/payments/{id}/cancel"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/payments/{id}/refund"),
            serde_json::json!({ "amount": "50.00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["refunded_amount"], "50.00");

    // An empty body refunds the rest.
    let (status, body) = send(&app, empty_request(Method::POST, &format!("/api/payments/{id}/refund"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "refunded");
}

#[tokio::test]
async fn test_pix_checkout_carries_qr_code() {
    let app = create_app().await;
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/payments/pix",
            serde_json::json!({
                "client_id": "5b0f5c1e-7d4e-4c4a-9a57-1c1d0e1f2a3b",
                "company_id": "9c7a8e6d-2b1f-4e3a-8c9d-0a1b2c3d4e5f",
                "amount": "80.00",
                "currency": "BRL",
                "payer": { "email": "ana@example.com" }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment"]["gateway_payment_id"], "PAY-PIX");
    assert_eq!(body["qr_code"], "00020126580014br.gov.bcb.pix");
}

#[tokio::test]
async fn test_webhook_requires_valid_signature() {
    let app = create_app().await;

    // Start a PIX payment so the notification refers to a known payment.
    let (_, checkout) = send(
        &app,
        json_request(
            Method::POST,
            "/api/payments/pix",
            serde_json::json!({
                "client_id": "5b0f5c1e-7d4e-4c4a-9a57-1c1d0e1f2a3b",
                "company_id": "9c7a8e6d-2b1f-4e3a-8c9d-0a1b2c3d4e5f",
                "amount": "80.00",
                "currency": "BRL",
                "payer": { "email": "ana@example.com" }
            }),
        ),
    )
    .await;
    assert_eq!(checkout["payment"]["status"], "pending");

    let notification = serde_json::json!({
        "type": "payment",
        "action": "payment.updated",
        "data": { "id": "PAY-PIX" }
    });

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/notifications/gateway", notification.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let ts = "1704908010";
    let v1 = signature::sign(SECRET, &signature::manifest("PAY-PIX", "req-42", ts)).unwrap();
    let signed = Request::builder()
        .method(Method::POST)
        .uri("/api/notifications/gateway")
        .header("Content-Type", "application/json")
        .header("x-request-id", "req-42")
        .header("x-signature", format!("ts={ts},v1={v1}"))
        .body(Body::from(notification.to_string()))
        .unwrap();

    let (status, body) = send(&app, signed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["from"], "pending");
    assert_eq!(body["to"], "approved");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_app().await;
    let (status, body) = send(&app, empty_request(Method::GET, "/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/payments/{id}/refund"].is_object());
}
