//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use tourpay_types::{
    AppError, AuthorizeCardPaymentRequest, ClientId, CompanyId, CreatePaymentRequest,
    GatewayNotification, PaymentGateway, PaymentId, PaymentRepository, PaymentResponse,
    PixCheckoutResponse, PixPaymentRequest, RefundRequest, TicketPaymentRequest,
    UpdatePaymentRequest,
};

use super::signature;
use crate::PaymentService;

/// Application state shared across handlers.
pub struct AppState<R: PaymentRepository, G: PaymentGateway> {
    pub service: PaymentService<R, G>,
    /// When set, gateway notifications must carry a valid `x-signature`.
    pub webhook_secret: Option<String>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::GatewayRejected { .. } => StatusCode::BAD_GATEWAY,
            AppError::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            AppError::GatewayRejected { message, .. } => message.clone(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %self.0, "request failed");
        }

        let body = serde_json::json!({
            "error": message,
            "kind": self.0.kind(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(AppError::Validation(format!("Invalid {what} ID"))))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(client_id = %req.client_id))]
pub async fn create_payment<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.service.create_payment(req).await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PaymentId = parse_id(&id, "payment")?;
    let payment = state.service.get_payment(id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

#[tracing::instrument(skip(state, patch), fields(payment_id = %id))]
pub async fn update_payment<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Path(id): Path<String>,
    Json(patch): Json<UpdatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PaymentId = parse_id(&id, "payment")?;
    let payment = state.service.update_payment(id, patch).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

#[tracing::instrument(skip(state, req), fields(client_id = %req.client_id, method = %req.payment_method))]
pub async fn authorize_card_payment<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Json(req): Json<AuthorizeCardPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.service.authorize_card_payment(req).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

#[tracing::instrument(skip(state, req), fields(client_id = %req.client_id))]
pub async fn start_pix_payment<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Json(req): Json<PixPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let checkout = state.service.start_pix_payment(req).await?;
    Ok(Json(PixCheckoutResponse {
        payment: PaymentResponse::from(checkout.payment),
        qr_code: checkout.qr_code,
        qr_code_base64: checkout.qr_code_base64,
        ticket_url: checkout.ticket_url,
        expires_at: checkout.expires_at,
    }))
}

#[tracing::instrument(skip(state, req), fields(client_id = %req.client_id, method = %req.payment_method))]
pub async fn start_ticket_payment<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Json(req): Json<TicketPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.service.start_ticket_payment(req).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn capture<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PaymentId = parse_id(&id, "payment")?;
    let payment = state.service.capture(id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn cancel<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PaymentId = parse_id(&id, "payment")?;
    let payment = state.service.cancel(id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// Refund; an empty body refunds everything still refundable.
#[tracing::instrument(skip(state, body), fields(payment_id = %id))]
pub async fn refund<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id: PaymentId = parse_id(&id, "payment")?;
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        RefundRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid refund request: {e}")))?
    };

    let payment = state.service.refund(id, req).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn sync_status<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: PaymentId = parse_id(&id, "payment")?;
    let payment = state.service.sync_status(id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

#[tracing::instrument(skip(state), fields(client_id = %id))]
pub async fn list_client_payments<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let client_id: ClientId = parse_id(&id, "client")?;
    let payments = state.service.list_by_client(client_id).await?;
    Ok(Json(
        payments
            .iter()
            .map(PaymentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[tracing::instrument(skip(state), fields(company_id = %id))]
pub async fn list_company_payments<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let company_id: CompanyId = parse_id(&id, "company")?;
    let payments = state.service.list_by_company(company_id).await?;
    Ok(Json(
        payments
            .iter()
            .map(PaymentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway notifications
// ─────────────────────────────────────────────────────────────────────────────

/// Gateway webhook. The body is read raw so the signature can be checked
/// before anything is parsed into domain types.
#[tracing::instrument(skip(state, headers, body))]
pub async fn gateway_notification<R: PaymentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let notification: GatewayNotification = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid notification: {e}")))?;

    if let Some(secret) = state.webhook_secret.as_deref() {
        let header = headers
            .get("x-signature")
            .and_then(|v| v.to_str().ok());
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if let Err(e) = signature::verify(secret, header, &notification.data.id, request_id) {
            tracing::warn!(error = %e, gateway_payment_id = %notification.data.id, "rejected unsigned notification");
            let body = serde_json::json!({
                "error": e.to_string(),
                "kind": "unauthorized",
                "code": StatusCode::UNAUTHORIZED.as_u16()
            });
            return Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response());
        }
    }

    let outcome = state.service.handle_notification(notification).await?;
    Ok(Json(outcome).into_response())
}
