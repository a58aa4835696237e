//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ClientId, CompanyId, Currency, Payment, PaymentId, PaymentMethod, PaymentStatus,
};
use crate::gateway::{LineItem, Payer};

fn default_installments() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment requests
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register a pending payment without contacting the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub client_id: ClientId,
    pub company_id: CompanyId,
    /// Decimal amount in major units (e.g. `"150.00"`)
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    #[serde(default = "default_installments")]
    #[schema(example = 1)]
    pub installment_count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request to authorize a card payment through a gateway order.
///
/// `payment_id` retries an existing local payment; without it a new
/// pending payment is created first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorizeCardPaymentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
    pub client_id: ClientId,
    pub company_id: CompanyId,
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    #[serde(default = "default_installments")]
    #[schema(example = 3)]
    pub installment_count: u8,
    /// Card token produced by the gateway's client-side SDK
    pub card_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    pub payer: Payer,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `false` only reserves the funds; the payment must be captured later
    #[serde(default = "default_true")]
    pub capture: bool,
}

/// Request to start a PIX payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PixPaymentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
    pub client_id: ClientId,
    pub company_id: CompanyId,
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
    pub currency: Currency,
    pub payer: Payer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request to start a boleto or pec payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketPaymentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
    pub client_id: ClientId,
    pub company_id: CompanyId,
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub payer: Payer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request to refund part or all of a settled payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RefundRequest {
    /// Omit to refund everything that has not been refunded yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "50.00")]
    pub amount: Option<Decimal>,
}

/// Typed partial update. Absent fields are left untouched; status is never patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_count: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
}

impl UpdatePaymentRequest {
    pub fn is_empty(&self) -> bool {
        self.installment_count.is_none()
            && self.description.is_none()
            && self.cardholder_name.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway notifications
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationData {
    /// Gateway payment id
    #[schema(example = "1234567890")]
    pub id: String,
}

/// Asynchronous status push from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GatewayNotification {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "payment")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "payment.updated")]
    pub action: Option<String>,
    pub data: NotificationData,
}

impl GatewayNotification {
    /// Only payment notifications carry a status change we track.
    pub fn is_payment_event(&self) -> bool {
        match (&self.topic, &self.action) {
            (Some(topic), _) => topic == "payment",
            (None, Some(action)) => action.starts_with("payment."),
            (None, None) => true,
        }
    }
}

/// What a notification did to the local payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// No local payment references the gateway id (or the topic is not tracked).
    Ignored,
    /// The gateway reports the status the payment already has.
    Unchanged {
        payment_id: PaymentId,
        status: PaymentStatus,
    },
    /// The reported status was a legal transition and has been stored.
    Applied {
        payment_id: PaymentId,
        from: PaymentStatus,
        to: PaymentStatus,
    },
    /// The reported status is not reachable from the current one; nothing changed.
    Rejected {
        payment_id: PaymentId,
        current: PaymentStatus,
        reported: PaymentStatus,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CardResponse {
    #[schema(example = "4242")]
    pub last_four_digits: String,
    #[schema(example = "424242")]
    pub first_six_digits: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
}

/// A payment as exposed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub client_id: ClientId,
    pub company_id: CompanyId,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub status: PaymentStatus,
    #[schema(example = "Approved")]
    pub status_display: String,
    pub status_detail: Option<String>,
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    #[schema(example = "Credit card")]
    pub payment_method_display: String,
    pub installment_count: u8,
    pub card: Option<CardResponse>,
    pub captured: bool,
    #[schema(value_type = String, example = "0")]
    pub refunded_amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub authorized_at: Option<DateTime<Utc>>,
    pub captured_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl From<&Payment> for PaymentResponse {
    fn from(p: &Payment) -> Self {
        Self {
            id: p.id(),
            client_id: p.client_id(),
            company_id: p.company_id(),
            gateway_order_id: p.gateway_order_id().map(String::from),
            gateway_payment_id: p.gateway_payment_id().map(String::from),
            status: p.status(),
            status_display: p.status().display_label().to_string(),
            status_detail: p.status_detail.clone(),
            amount: p.amount().amount(),
            currency: p.amount().currency(),
            payment_method: p.payment_method(),
            payment_method_display: p.payment_method().display_label().to_string(),
            installment_count: p.installment_count(),
            card: p.card().map(|c| CardResponse {
                last_four_digits: c.last_four_digits().to_string(),
                first_six_digits: c.first_six_digits().to_string(),
                issuer_id: c.issuer_id.clone(),
                cardholder_name: c.cardholder_name.clone(),
            }),
            captured: p.captured(),
            refunded_amount: p.refunded_amount(),
            description: p.description.clone(),
            created_at: p.created_at(),
            updated_at: p.updated_at(),
            approved_at: p.approved_at(),
            authorized_at: p.authorized_at(),
            captured_at: p.captured_at(),
            cancelled_at: p.cancelled_at(),
            version: p.version(),
        }
    }
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        PaymentResponse::from(&p)
    }
}

/// A PIX payment together with what the client needs to pay it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PixCheckoutResponse {
    pub payment: PaymentResponse,
    /// Copy-and-paste PIX payload
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Money, NewPayment};
    use rust_decimal_macros::dec;

    #[test]
    fn test_response_carries_display_labels() {
        let payment = Payment::new(NewPayment {
            client_id: ClientId::new(),
            company_id: CompanyId::new(),
            amount: Money::new(dec!(120), Currency::BRL).unwrap(),
            payment_method: PaymentMethod::Boleto,
            installment_count: 1,
            description: None,
        })
        .unwrap();

        let response = PaymentResponse::from(&payment);
        assert_eq!(response.status_display, "Pending");
        assert_eq!(response.payment_method_display, "Boleto");
        assert_eq!(response.amount, dec!(120));
    }

    #[test]
    fn test_request_rejects_unknown_currency() {
        let body = serde_json::json!({
            "client_id": ClientId::new(),
            "company_id": CompanyId::new(),
            "amount": "10.00",
            "currency": "DOGE",
            "payment_method": "pix"
        });
        assert!(serde_json::from_value::<CreatePaymentRequest>(body).is_err());
    }

    #[test]
    fn test_request_defaults() {
        let body = serde_json::json!({
            "client_id": ClientId::new(),
            "company_id": CompanyId::new(),
            "amount": "10.00",
            "currency": "BRL",
            "payment_method": "credit_card"
        });
        let req: CreatePaymentRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.installment_count, 1);
        assert_eq!(req.amount, dec!(10.00));
    }

    #[test]
    fn test_notification_topics() {
        let note: GatewayNotification = serde_json::from_value(serde_json::json!({
            "action": "payment.updated",
            "type": "payment",
            "data": { "id": "987" }
        }))
        .unwrap();
        assert!(note.is_payment_event());

        let other: GatewayNotification = serde_json::from_value(serde_json::json!({
            "type": "merchant_order",
            "data": { "id": "1" }
        }))
        .unwrap();
        assert!(!other.is_payment_event());
    }
}
