//! Gateway intents and results.
//!
//! These are the typed values exchanged with the `PaymentGateway` port.
//! Status fields stay as the raw strings the gateway reported; the payment
//! service maps them through `PaymentStatus::from_gateway`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Currency, PaymentMethod, PaymentStatus};

/// Identification document of the payer (e.g. CPF in Brazil).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identification {
    #[serde(rename = "type")]
    #[schema(example = "CPF")]
    pub kind: String,
    #[schema(example = "12345678909")]
    pub number: String,
}

/// Who pays, as sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Payer {
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<Identification>,
}

/// A purchased item (one tour booking line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    #[schema(example = "Sugarloaf Mountain sunset tour")]
    pub title: String,
    #[schema(example = 2)]
    pub quantity: u32,
    #[schema(value_type = String, example = "75.00")]
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LineItem {
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Whether the gateway settles immediately or only reserves the funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    Automatic,
    Manual,
}

/// Request to create a gateway order for a card payment.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    /// Local payment id, echoed back by the gateway.
    pub external_reference: String,
    pub idempotency_key: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub installments: u8,
    pub card_token: String,
    pub issuer_id: Option<String>,
    pub payer: Payer,
    pub items: Vec<LineItem>,
    pub capture_mode: CaptureMode,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Request to create a gateway payment directly (PIX, boleto, pec).
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub external_reference: String,
    pub idempotency_key: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub installments: u8,
    pub payer: Payer,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Card snapshot as reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayCard {
    pub last_four_digits: Option<String>,
    pub first_six_digits: Option<String>,
    pub cardholder_name: Option<String>,
}

/// A gateway payment (one charge attempt).
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub status_detail: Option<String>,
    pub amount: Option<Decimal>,
    pub captured: Option<bool>,
    pub issuer_id: Option<String>,
    pub card: Option<GatewayCard>,
}

impl PaymentResult {
    pub fn mapped_status(&self) -> PaymentStatus {
        PaymentStatus::from_gateway(&self.status)
    }
}

/// A gateway order and the payments attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderResult {
    pub id: String,
    pub status: String,
    pub status_detail: Option<String>,
    pub payments: Vec<PaymentResult>,
}

impl OrderResult {
    /// The charge attempt that represents the order (the first one).
    pub fn primary_payment(&self) -> Option<&PaymentResult> {
        self.payments.first()
    }

    /// Payment-level status when the order carries a payment, order-level otherwise.
    pub fn effective_status(&self) -> &str {
        self.primary_payment()
            .map(|p| p.status.as_str())
            .unwrap_or(self.status.as_str())
    }

    pub fn effective_status_detail(&self) -> Option<&str> {
        self.primary_payment()
            .and_then(|p| p.status_detail.as_deref())
            .or(self.status_detail.as_deref())
    }

    pub fn mapped_status(&self) -> PaymentStatus {
        PaymentStatus::from_gateway(self.effective_status())
    }
}

/// A PIX payment with its point-of-interaction data.
#[derive(Debug, Clone, PartialEq)]
pub struct PixResult {
    pub payment: PaymentResult,
    /// Copy-and-paste PIX payload.
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub ticket_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A refund issued against a direct gateway payment.
#[derive(Debug, Clone, PartialEq)]
pub struct RefundResult {
    pub id: String,
    pub payment_id: String,
    pub amount: Decimal,
    pub status: String,
}
