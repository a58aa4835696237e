//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use tourpay_types::domain::{ClientId, CompanyId, Currency, PaymentId, PaymentMethod, PaymentStatus};
use tourpay_types::dto::{
    AuthorizeCardPaymentRequest, CardResponse, CreatePaymentRequest, GatewayNotification,
    NotificationData, NotificationOutcome, PaymentResponse, PixCheckoutResponse,
    PixPaymentRequest, RefundRequest, TicketPaymentRequest, UpdatePaymentRequest,
};
use tourpay_types::{ErrorKind, Identification, LineItem, Payer};
use utoipa::OpenApi;

// Path-only stubs; the real handlers are generic and live in `inbound::handlers`.

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Register a pending payment (no gateway call)
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created", body = PaymentResponse),
        (status = 422, description = "Invalid amount, currency or method")
    )
)]
async fn create_payment() {}

/// Get a payment
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment ID (UUID)")),
    responses(
        (status = 200, description = "Payment details", body = PaymentResponse),
        (status = 404, description = "Payment not found")
    )
)]
async fn get_payment() {}

/// Edit a payment that has not reached the gateway
#[utoipa::path(
    patch,
    path = "/api/payments/{id}",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment ID (UUID)")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment updated", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment can no longer be edited"),
        (status = 422, description = "Invalid patch")
    )
)]
async fn update_payment() {}

/// Authorize a card payment through a gateway order
#[utoipa::path(
    post,
    path = "/api/payments/authorize",
    tag = "payments",
    request_body = AuthorizeCardPaymentRequest,
    responses(
        (status = 200, description = "Order created; status reflects the gateway decision", body = PaymentResponse),
        (status = 409, description = "Payment is not pending"),
        (status = 422, description = "Invalid request"),
        (status = 502, description = "Gateway rejected the order"),
        (status = 503, description = "Gateway unavailable; payment left pending")
    )
)]
async fn authorize_card_payment() {}

/// Start a PIX payment
#[utoipa::path(
    post,
    path = "/api/payments/pix",
    tag = "payments",
    request_body = PixPaymentRequest,
    responses(
        (status = 200, description = "PIX payment created", body = PixCheckoutResponse),
        (status = 422, description = "Invalid request"),
        (status = 502, description = "Gateway rejected the payment"),
        (status = 503, description = "Gateway unavailable")
    )
)]
async fn start_pix_payment() {}

/// Start a boleto or pec payment
#[utoipa::path(
    post,
    path = "/api/payments/ticket",
    tag = "payments",
    request_body = TicketPaymentRequest,
    responses(
        (status = 200, description = "Ticket payment created", body = PaymentResponse),
        (status = 422, description = "Invalid request"),
        (status = 502, description = "Gateway rejected the payment"),
        (status = 503, description = "Gateway unavailable")
    )
)]
async fn start_ticket_payment() {}

/// Capture an authorized payment
#[utoipa::path(
    post,
    path = "/api/payments/{id}/capture",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment ID (UUID)")),
    responses(
        (status = 200, description = "Payment captured", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment is not authorized"),
        (status = 503, description = "Gateway unavailable; run sync before retrying")
    )
)]
async fn capture() {}

/// Cancel a payment that has not settled
#[utoipa::path(
    post,
    path = "/api/payments/{id}/cancel",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment ID (UUID)")),
    responses(
        (status = 200, description = "Payment cancelled", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment cannot be cancelled in its current status"),
        (status = 503, description = "Gateway unavailable; run sync before retrying")
    )
)]
async fn cancel() {}

/// Refund part or all of a settled payment
#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment ID (UUID)")),
    request_body(content = RefundRequest, description = "Omit the body or the amount to refund everything still refundable"),
    responses(
        (status = 200, description = "Refund recorded", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment cannot be refunded in its current status"),
        (status = 422, description = "Amount exceeds what is left to refund"),
        (status = 503, description = "Gateway unavailable; run sync before retrying")
    )
)]
async fn refund() {}

/// Re-read the gateway status of a payment
#[utoipa::path(
    post,
    path = "/api/payments/{id}/sync",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment ID (UUID)")),
    responses(
        (status = 200, description = "Payment synchronized", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Gateway status not reachable from the local one")
    )
)]
async fn sync_status() {}

/// List a client's payments, newest first
#[utoipa::path(
    get,
    path = "/api/clients/{id}/payments",
    tag = "payments",
    params(("id" = ClientId, Path, description = "Client ID (UUID)")),
    responses((status = 200, description = "Payments", body = Vec<PaymentResponse>))
)]
async fn list_client_payments() {}

/// List a company's payments, newest first
#[utoipa::path(
    get,
    path = "/api/companies/{id}/payments",
    tag = "payments",
    params(("id" = CompanyId, Path, description = "Company ID (UUID)")),
    responses((status = 200, description = "Payments", body = Vec<PaymentResponse>))
)]
async fn list_company_payments() {}

/// Gateway webhook
#[utoipa::path(
    post,
    path = "/api/notifications/gateway",
    tag = "notifications",
    request_body = GatewayNotification,
    params(
        ("x-signature" = Option<String>, Header, description = "ts=..,v1=.. HMAC-SHA256 signature"),
        ("x-request-id" = Option<String>, Header, description = "Gateway request id, part of the signed manifest")
    ),
    responses(
        (status = 200, description = "What the notification did", body = NotificationOutcome),
        (status = 401, description = "Missing or invalid signature")
    )
)]
async fn gateway_notification() {}

/// OpenAPI documentation for the payments API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tour Payments API",
        version = "0.1.0",
        description = "Payments for tour bookings: card orders, PIX, boleto and pec, with capture, cancel, refund and gateway notifications.",
    ),
    paths(
        health,
        create_payment,
        get_payment,
        update_payment,
        authorize_card_payment,
        start_pix_payment,
        start_ticket_payment,
        capture,
        cancel,
        refund,
        sync_status,
        list_client_payments,
        list_company_payments,
        gateway_notification,
    ),
    components(
        schemas(
            CreatePaymentRequest,
            AuthorizeCardPaymentRequest,
            PixPaymentRequest,
            TicketPaymentRequest,
            RefundRequest,
            UpdatePaymentRequest,
            PaymentResponse,
            PixCheckoutResponse,
            CardResponse,
            GatewayNotification,
            NotificationData,
            NotificationOutcome,
            Payer,
            Identification,
            LineItem,
            PaymentStatus,
            PaymentMethod,
            Currency,
            PaymentId,
            ClientId,
            CompanyId,
            ErrorKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Payment lifecycle operations"),
        (name = "notifications", description = "Asynchronous gateway status pushes"),
    )
)]
pub struct ApiDoc;
