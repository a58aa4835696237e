//! `PaymentGateway` implementation over reqwest.

use std::time::Instant;

use anyhow::Context;
use reqwest::{Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use tourpay_types::{
    GatewayError, OrderIntent, OrderResult, PaymentGateway, PaymentIntent, PaymentMethod,
    PaymentResult, PixResult, RefundResult,
};

use crate::config::GatewayConfig;
use crate::wire::{
    ErrorBody, ErrorCause, OrderRequest, OrderResponse, PaymentRequest, PaymentResponse,
    RefundRequest, RefundResponse, StatusUpdateRequest,
};

const IDEMPOTENCY_HEADER: &str = "X-Idempotency-Key";

/// Longest slice of a raw body copied into error messages and logs.
const BODY_SNIPPET: usize = 200;

/// Stateless gateway client. Cheap to clone; the inner reqwest client pools connections.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build gateway HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str, idempotency_key: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let mut req = self
            .http
            .request(method, url)
            .bearer_auth(&self.config.access_token);
        if let Some(key) = idempotency_key {
            req = req.header(IDEMPOTENCY_HEADER, key);
        }
        req
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        req: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let started = Instant::now();

        let response = req
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        tracing::debug!(
            operation,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "gateway responded"
        );

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                tracing::error!(
                    operation,
                    error = %e,
                    body = %snippet(&body),
                    "gateway response does not match the expected schema"
                );
                GatewayError::Decode {
                    cause: format!("{operation}: {e}"),
                }
            });
        }

        Err(classify_failure(operation, status, &body))
    }

    fn transport_error(&self, operation: &'static str, err: reqwest::Error) -> GatewayError {
        let cause = if err.is_timeout() {
            format!(
                "{operation} timed out after {}s",
                self.config.timeout.as_secs_f32()
            )
        } else {
            format!("{operation}: {err}")
        };
        tracing::warn!(operation, error = %err, "gateway transport failure");
        GatewayError::Unavailable { cause }
    }
}

/// Sorts a non-2xx answer into rejection (the gateway declined) or
/// unavailability (worth retrying later).
fn classify_failure(operation: &'static str, status: StatusCode, body: &str) -> GatewayError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone().or_else(|| b.error.clone()))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let raw = snippet(body);
            if raw.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown gateway error")
                    .to_string()
            } else {
                raw
            }
        });

    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        tracing::warn!(operation, status = status.as_u16(), %message, "gateway unavailable");
        return GatewayError::Unavailable {
            cause: format!("{operation}: HTTP {}: {message}", status.as_u16()),
        };
    }

    let causes = parsed
        .map(|b| b.cause.into_iter().map(ErrorCause::into_cause).collect())
        .unwrap_or_default();

    tracing::warn!(operation, status = status.as_u16(), %message, "gateway rejected request");
    GatewayError::Rejected {
        status: status.as_u16(),
        message,
        causes,
    }
}

fn snippet(body: &str) -> String {
    body.trim().chars().take(BODY_SNIPPET).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Local validation (nothing is sent when these fail)
// ─────────────────────────────────────────────────────────────────────────────

/// Ids are interpolated into URL paths, so only url-safe characters pass.
fn require_id(field: &str, value: &str) -> Result<(), GatewayError> {
    if value.is_empty() {
        return Err(GatewayError::Validation(format!("{field} must not be empty")));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(GatewayError::Validation(format!(
            "{field} contains invalid characters: {value}"
        )));
    }
    Ok(())
}

fn require_key(idempotency_key: &str) -> Result<(), GatewayError> {
    if idempotency_key.trim().is_empty() {
        return Err(GatewayError::Validation(
            "idempotency key must not be empty".into(),
        ));
    }
    Ok(())
}

fn require_positive(field: &str, amount: Decimal) -> Result<(), GatewayError> {
    if amount <= Decimal::ZERO {
        return Err(GatewayError::Validation(format!(
            "{field} must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn require_refund_amount(amount: Option<Decimal>) -> Result<(), GatewayError> {
    match amount {
        Some(a) => require_positive("refund amount", a),
        None => Ok(()),
    }
}

fn validate_order(intent: &OrderIntent) -> Result<(), GatewayError> {
    require_key(&intent.idempotency_key)?;
    require_positive("amount", intent.amount)?;
    if intent.external_reference.is_empty() {
        return Err(GatewayError::Validation(
            "external reference must not be empty".into(),
        ));
    }
    if !intent.payment_method.is_card() {
        return Err(GatewayError::Validation(format!(
            "orders only carry card payments, got {}",
            intent.payment_method
        )));
    }
    if intent.card_token.trim().is_empty() {
        return Err(GatewayError::Validation("card token is required".into()));
    }
    if intent.installments == 0 {
        return Err(GatewayError::Validation(
            "installments must be at least 1".into(),
        ));
    }
    if intent.payer.email.trim().is_empty() {
        return Err(GatewayError::Validation("payer email is required".into()));
    }
    Ok(())
}

fn validate_payment(intent: &PaymentIntent) -> Result<(), GatewayError> {
    require_key(&intent.idempotency_key)?;
    require_positive("amount", intent.amount)?;
    if intent.external_reference.is_empty() {
        return Err(GatewayError::Validation(
            "external reference must not be empty".into(),
        ));
    }
    if intent.payment_method.is_card() {
        return Err(GatewayError::Validation(
            "card payments must be created through an order".into(),
        ));
    }
    if intent.payer.email.trim().is_empty() {
        return Err(GatewayError::Validation("payer email is required".into()));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl PaymentGateway for HttpGateway {
    #[tracing::instrument(skip(self, intent), fields(reference = %intent.external_reference))]
    async fn create_order(&self, intent: &OrderIntent) -> Result<OrderResult, GatewayError> {
        validate_order(intent)?;
        let req = self
            .request(Method::POST, "/v1/orders", Some(&intent.idempotency_key))
            .json(&OrderRequest::from_intent(intent));
        let order: OrderResponse = self.send("create_order", req).await?;
        Ok(order.into())
    }

    #[tracing::instrument(skip(self))]
    async fn get_order(&self, order_id: &str) -> Result<OrderResult, GatewayError> {
        require_id("order id", order_id)?;
        let req = self.request(Method::GET, &format!("/v1/orders/{order_id}"), None);
        let order: OrderResponse = self.send("get_order", req).await?;
        Ok(order.into())
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_order(
        &self,
        order_id: &str,
        idempotency_key: &str,
    ) -> Result<OrderResult, GatewayError> {
        require_id("order id", order_id)?;
        require_key(idempotency_key)?;
        let req = self.request(
            Method::POST,
            &format!("/v1/orders/{order_id}/cancel"),
            Some(idempotency_key),
        );
        let order: OrderResponse = self.send("cancel_order", req).await?;
        Ok(order.into())
    }

    #[tracing::instrument(skip(self))]
    async fn capture_order(
        &self,
        order_id: &str,
        idempotency_key: &str,
    ) -> Result<OrderResult, GatewayError> {
        require_id("order id", order_id)?;
        require_key(idempotency_key)?;
        let req = self.request(
            Method::POST,
            &format!("/v1/orders/{order_id}/capture"),
            Some(idempotency_key),
        );
        let order: OrderResponse = self.send("capture_order", req).await?;
        Ok(order.into())
    }

    #[tracing::instrument(skip(self))]
    async fn refund_order(
        &self,
        order_id: &str,
        amount: Option<Decimal>,
        idempotency_key: &str,
    ) -> Result<OrderResult, GatewayError> {
        require_id("order id", order_id)?;
        require_key(idempotency_key)?;
        require_refund_amount(amount)?;
        let req = self
            .request(
                Method::POST,
                &format!("/v1/orders/{order_id}/refund"),
                Some(idempotency_key),
            )
            .json(&RefundRequest { amount });
        let order: OrderResponse = self.send("refund_order", req).await?;
        Ok(order.into())
    }

    #[tracing::instrument(skip(self, intent), fields(reference = %intent.external_reference, method = %intent.payment_method))]
    async fn create_payment(&self, intent: &PaymentIntent) -> Result<PaymentResult, GatewayError> {
        validate_payment(intent)?;
        let req = self
            .request(Method::POST, "/v1/payments", Some(&intent.idempotency_key))
            .json(&PaymentRequest::from_intent(intent));
        let payment: PaymentResponse = self.send("create_payment", req).await?;
        Ok(payment.into())
    }

    #[tracing::instrument(skip(self, intent), fields(reference = %intent.external_reference))]
    async fn create_pix_payment(&self, intent: &PaymentIntent) -> Result<PixResult, GatewayError> {
        if intent.payment_method != PaymentMethod::Pix {
            return Err(GatewayError::Validation(format!(
                "expected a pix intent, got {}",
                intent.payment_method
            )));
        }
        validate_payment(intent)?;
        let req = self
            .request(Method::POST, "/v1/payments", Some(&intent.idempotency_key))
            .json(&PaymentRequest::from_intent(intent));
        let payment: PaymentResponse = self.send("create_pix_payment", req).await?;
        Ok(payment.into())
    }

    #[tracing::instrument(skip(self))]
    async fn get_payment(&self, payment_id: &str) -> Result<PaymentResult, GatewayError> {
        require_id("payment id", payment_id)?;
        let req = self.request(Method::GET, &format!("/v1/payments/{payment_id}"), None);
        let payment: PaymentResponse = self.send("get_payment", req).await?;
        Ok(payment.into())
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_payment(&self, payment_id: &str) -> Result<PaymentResult, GatewayError> {
        require_id("payment id", payment_id)?;
        let req = self
            .request(Method::PUT, &format!("/v1/payments/{payment_id}"), None)
            .json(&StatusUpdateRequest {
                status: "cancelled",
            });
        let payment: PaymentResponse = self.send("cancel_payment", req).await?;
        Ok(payment.into())
    }

    #[tracing::instrument(skip(self))]
    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Option<Decimal>,
        idempotency_key: &str,
    ) -> Result<RefundResult, GatewayError> {
        require_id("payment id", payment_id)?;
        require_key(idempotency_key)?;
        require_refund_amount(amount)?;
        let req = self
            .request(
                Method::POST,
                &format!("/v1/payments/{payment_id}/refunds"),
                Some(idempotency_key),
            )
            .json(&RefundRequest { amount });
        let refund: RefundResponse = self.send("refund_payment", req).await?;
        Ok(refund.into())
    }
}
