//! Payment gateway port.
//!
//! Implementations translate these calls into gateway HTTP requests.
//! They hold no business logic and never mutate local state.

use rust_decimal::Decimal;

use crate::error::GatewayError;
use crate::gateway::{OrderIntent, OrderResult, PaymentIntent, PaymentResult, PixResult, RefundResult};

/// Port trait for the external payment gateway.
///
/// `get_*` calls are safe to retry. `cancel_*`, `capture_order` and
/// `refund_*` are not idempotent at the gateway and must be invoked at most
/// once per legal transition; the idempotency key lets the gateway collapse
/// transport-level retries of the same logical request.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_order(&self, intent: &OrderIntent) -> Result<OrderResult, GatewayError>;

    async fn get_order(&self, order_id: &str) -> Result<OrderResult, GatewayError>;

    async fn cancel_order(
        &self,
        order_id: &str,
        idempotency_key: &str,
    ) -> Result<OrderResult, GatewayError>;

    async fn capture_order(
        &self,
        order_id: &str,
        idempotency_key: &str,
    ) -> Result<OrderResult, GatewayError>;

    /// `amount = None` refunds the whole order.
    async fn refund_order(
        &self,
        order_id: &str,
        amount: Option<Decimal>,
        idempotency_key: &str,
    ) -> Result<OrderResult, GatewayError>;

    async fn create_payment(&self, intent: &PaymentIntent) -> Result<PaymentResult, GatewayError>;

    async fn create_pix_payment(&self, intent: &PaymentIntent) -> Result<PixResult, GatewayError>;

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentResult, GatewayError>;

    async fn cancel_payment(&self, payment_id: &str) -> Result<PaymentResult, GatewayError>;

    /// `amount = None` refunds the whole payment.
    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Option<Decimal>,
        idempotency_key: &str,
    ) -> Result<RefundResult, GatewayError>;
}
