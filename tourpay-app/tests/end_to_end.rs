//! Full stack: client SDK -> HTTP server -> service -> SQLite file + HTTP gateway
//! client -> local stand-in gateway.

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tempfile::tempdir;
use tokio::net::TcpListener;

use tourpay_client::PaymentsClient;
use tourpay_gateway::{GatewayConfig, HttpGateway};
use tourpay_hex::{PaymentService, inbound::HttpServer};
use tourpay_repo::SqliteRepo;
use tourpay_types::{
    AuthorizeCardPaymentRequest, ClientId, CompanyId, Currency, ErrorKind, Payer, PaymentMethod,
    PaymentStatus, PixPaymentRequest, RefundRequest,
};

// ─────────────────────────────────────────────────────────────────────────────
// Stand-in gateway
// ─────────────────────────────────────────────────────────────────────────────

fn order_body(id: &str, payment_status: &str) -> Value {
    json!({
        "id": id,
        "status": "processed",
        "transactions": {
            "payments": [{
                "id": "PAY-E2E",
                "status": payment_status,
                "amount": "150.00",
                "card": {
                    "last_four_digits": "1111",
                    "first_six_digits": "411111",
                    "cardholder": { "name": "BRUNO LIMA" }
                }
            }]
        }
    })
}

async fn create_order(Json(body): Json<Value>) -> impl IntoResponse {
    let status = if body["capture_mode"] == "manual" {
        "authorized"
    } else {
        "approved"
    };
    (StatusCode::CREATED, Json(order_body("ORD-E2E", status)))
}

async fn capture_order(Path(id): Path<String>) -> impl IntoResponse {
    Json(order_body(&id, "approved"))
}

async fn refund_order(Path(id): Path<String>) -> impl IntoResponse {
    Json(order_body(&id, "approved"))
}

async fn create_payment() -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 4242001,
            "status": "pending",
            "transaction_amount": "80.00",
            "point_of_interaction": {
                "transaction_data": { "qr_code": "00020126580014br.gov.bcb.pix" }
            }
        })),
    )
}

async fn get_payment(Path(id): Path<String>) -> impl IntoResponse {
    Json(json!({ "id": id, "status": "pending" }))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn spawn_stack() -> (PaymentsClient, tempfile::TempDir) {
    let gateway_app = Router::new()
        .route("/v1/orders", post(create_order))
        .route("/v1/orders/{id}/capture", post(capture_order))
        .route("/v1/orders/{id}/refund", post(refund_order))
        .route("/v1/payments", post(create_payment))
        .route("/v1/payments/{id}", get(get_payment));
    let gateway_addr = serve(gateway_app).await;

    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("tourpay.db");
    let repo = SqliteRepo::new(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .unwrap();
    let gateway =
        HttpGateway::new(GatewayConfig::new(format!("http://{gateway_addr}"), "TEST-token"))
            .unwrap();

    let router = HttpServer::new(PaymentService::new(repo, gateway)).router();
    let addr = serve(router).await;

    (PaymentsClient::new(format!("http://{addr}")), tmp)
}

fn payer() -> Payer {
    Payer {
        email: "bruno@example.com".into(),
        first_name: Some("Bruno".into()),
        last_name: None,
        identification: None,
    }
}

#[tokio::test]
async fn test_manual_capture_and_partial_refund() {
    let (client, _tmp) = spawn_stack().await;
    assert!(client.health().await.unwrap());

    let client_id = ClientId::new();
    let company_id = CompanyId::new();

    let payment = client
        .authorize_card_payment(&AuthorizeCardPaymentRequest {
            payment_id: None,
            client_id,
            company_id,
            amount: dec!(150.00),
            currency: Currency::BRL,
            payment_method: PaymentMethod::CreditCard,
            installment_count: 1,
            card_token: "tok_e2e".into(),
            issuer_id: None,
            payer: payer(),
            items: vec![],
            description: Some("Ilha Grande day trip".into()),
            capture: false,
        })
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Authorized);
    assert!(!payment.captured);
    assert_eq!(payment.card.as_ref().unwrap().last_four_digits, "1111");

    let captured = client.capture(payment.id).await.unwrap();
    assert_eq!(captured.status, PaymentStatus::Approved);
    assert!(captured.captured);
    assert!(captured.captured_at.is_some());

    let refunded = client
        .refund(
            payment.id,
            &RefundRequest {
                amount: Some(dec!(40.00)),
            },
        )
        .await
        .unwrap();
    assert_eq!(refunded.status, PaymentStatus::Approved);
    assert_eq!(refunded.refunded_amount, dec!(40.00));

    // Already approved: cancelling is a conflict.
    let err = client.cancel(payment.id).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));

    let listed = client.list_client_payments(client_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].version, refunded.version);
}

#[tokio::test]
async fn test_pix_payment_and_sync() {
    let (client, _tmp) = spawn_stack().await;

    let checkout = client
        .start_pix_payment(&PixPaymentRequest {
            payment_id: None,
            client_id: ClientId::new(),
            company_id: CompanyId::new(),
            amount: dec!(80.00),
            currency: Currency::BRL,
            payer: payer(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(checkout.payment.status, PaymentStatus::Pending);
    assert_eq!(
        checkout.payment.gateway_payment_id.as_deref(),
        Some("4242001")
    );
    assert_eq!(
        checkout.qr_code.as_deref(),
        Some("00020126580014br.gov.bcb.pix")
    );

    let synced = client.sync_status(checkout.payment.id).await.unwrap();
    assert_eq!(synced.status, PaymentStatus::Pending);
    assert_eq!(synced.version, checkout.payment.version);
}
