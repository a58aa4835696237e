//! JSON bodies exchanged with the gateway, and their conversion to port types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tourpay_types::{
    CaptureMode, GatewayCard, GatewayCause, LineItem, OrderIntent, OrderResult, Payer,
    PaymentIntent, PaymentResult, PixResult, RefundResult,
};

/// The gateway sends some identifiers as JSON numbers and others as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Ident {
    Text(String),
    Number(i64),
}

impl Ident {
    fn into_string(self) -> String {
        match self {
            Ident::Text(s) => s,
            Ident::Number(n) => n.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct OrderRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    external_reference: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    total_amount: Decimal,
    currency: &'static str,
    capture_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    payer: &'a Payer,
    items: Vec<ItemRequest<'a>>,
    transactions: OrderTransactions<'a>,
    metadata: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct OrderTransactions<'a> {
    payments: Vec<OrderPaymentRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct OrderPaymentRequest<'a> {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    payment_method: PaymentMethodRequest<'a>,
}

#[derive(Debug, Serialize)]
struct PaymentMethodRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    token: &'a str,
    installments: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ItemRequest<'a> {
    title: &'a str,
    quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a LineItem> for ItemRequest<'a> {
    fn from(item: &'a LineItem) -> Self {
        Self {
            title: &item.title,
            quantity: item.quantity,
            unit_price: item.unit_price,
            description: item.description.as_deref(),
        }
    }
}

impl<'a> OrderRequest<'a> {
    pub(crate) fn from_intent(intent: &'a OrderIntent) -> Self {
        // A booking without explicit lines is billed as a single item.
        let items = if intent.items.is_empty() {
            vec![ItemRequest {
                title: intent.description.as_deref().unwrap_or("Tour booking"),
                quantity: 1,
                unit_price: intent.amount,
                description: None,
            }]
        } else {
            intent.items.iter().map(ItemRequest::from).collect()
        };

        Self {
            kind: "online",
            external_reference: &intent.external_reference,
            total_amount: intent.amount,
            currency: intent.currency.code(),
            capture_mode: match intent.capture_mode {
                CaptureMode::Automatic => "automatic",
                CaptureMode::Manual => "manual",
            },
            description: intent.description.as_deref(),
            payer: &intent.payer,
            items,
            transactions: OrderTransactions {
                payments: vec![OrderPaymentRequest {
                    amount: intent.amount,
                    payment_method: PaymentMethodRequest {
                        kind: intent.payment_method.code(),
                        token: &intent.card_token,
                        installments: intent.installments,
                        issuer_id: intent.issuer_id.as_deref(),
                    },
                }],
            },
            metadata: &intent.metadata,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentRequest<'a> {
    #[serde(with = "rust_decimal::serde::float")]
    transaction_amount: Decimal,
    currency_id: &'static str,
    payment_method_id: &'static str,
    installments: u8,
    external_reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    payer: &'a Payer,
    metadata: &'a BTreeMap<String, String>,
}

impl<'a> PaymentRequest<'a> {
    pub(crate) fn from_intent(intent: &'a PaymentIntent) -> Self {
        Self {
            transaction_amount: intent.amount,
            currency_id: intent.currency.code(),
            payment_method_id: intent.payment_method.code(),
            installments: intent.installments,
            external_reference: &intent.external_reference,
            description: intent.description.as_deref(),
            payer: &intent.payer,
            metadata: &intent.metadata,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RefundRequest {
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdateRequest {
    pub status: &'static str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct OrderResponse {
    id: Ident,
    status: String,
    #[serde(default)]
    status_detail: Option<String>,
    #[serde(default)]
    transactions: Option<OrderTransactionsResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct OrderTransactionsResponse {
    #[serde(default)]
    payments: Vec<PaymentResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentResponse {
    id: Ident,
    status: String,
    #[serde(default)]
    status_detail: Option<String>,
    #[serde(default, alias = "transaction_amount")]
    amount: Option<Decimal>,
    #[serde(default)]
    captured: Option<bool>,
    #[serde(default)]
    issuer_id: Option<Ident>,
    #[serde(default)]
    card: Option<CardResponse>,
    #[serde(default)]
    point_of_interaction: Option<PointOfInteraction>,
    #[serde(default)]
    date_of_expiration: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CardResponse {
    #[serde(default)]
    last_four_digits: Option<String>,
    #[serde(default)]
    first_six_digits: Option<String>,
    #[serde(default)]
    cardholder: Option<Cardholder>,
}

#[derive(Debug, Deserialize)]
struct Cardholder {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PointOfInteraction {
    #[serde(default)]
    transaction_data: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    #[serde(default)]
    qr_code: Option<String>,
    #[serde(default)]
    qr_code_base64: Option<String>,
    #[serde(default)]
    ticket_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefundResponse {
    id: Ident,
    payment_id: Ident,
    amount: Decimal,
    #[serde(default = "approved")]
    status: String,
}

fn approved() -> String {
    "approved".to_string()
}

/// Structured error body: `{message, error, status, cause: [{code, description}]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub cause: Vec<ErrorCause>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorCause {
    #[serde(default)]
    code: Option<Ident>,
    #[serde(default)]
    description: Option<String>,
}

impl ErrorCause {
    pub(crate) fn into_cause(self) -> GatewayCause {
        GatewayCause {
            code: self.code.map(Ident::into_string).unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

impl From<PaymentResponse> for PaymentResult {
    fn from(r: PaymentResponse) -> Self {
        PaymentResult {
            id: r.id.into_string(),
            status: r.status,
            status_detail: r.status_detail,
            amount: r.amount,
            captured: r.captured,
            issuer_id: r.issuer_id.map(Ident::into_string),
            card: r.card.map(|c| GatewayCard {
                last_four_digits: c.last_four_digits,
                first_six_digits: c.first_six_digits,
                cardholder_name: c.cardholder.and_then(|h| h.name),
            }),
        }
    }
}

impl From<OrderResponse> for OrderResult {
    fn from(r: OrderResponse) -> Self {
        OrderResult {
            id: r.id.into_string(),
            status: r.status,
            status_detail: r.status_detail,
            payments: r
                .transactions
                .unwrap_or_default()
                .payments
                .into_iter()
                .map(PaymentResult::from)
                .collect(),
        }
    }
}

impl From<PaymentResponse> for PixResult {
    fn from(mut r: PaymentResponse) -> Self {
        let data = r
            .point_of_interaction
            .take()
            .and_then(|poi| poi.transaction_data);
        let expires_at = r.date_of_expiration;

        let (qr_code, qr_code_base64, ticket_url) = match data {
            Some(d) => (d.qr_code, d.qr_code_base64, d.ticket_url),
            None => (None, None, None),
        };

        PixResult {
            payment: r.into(),
            qr_code,
            qr_code_base64,
            ticket_url,
            expires_at,
        }
    }
}

impl From<RefundResponse> for RefundResult {
    fn from(r: RefundResponse) -> Self {
        RefundResult {
            id: r.id.into_string(),
            payment_id: r.payment_id.into_string(),
            amount: r.amount,
            status: r.status,
        }
    }
}
