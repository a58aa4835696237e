//! Error types for the payment service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Currency, PaymentMethod, PaymentStatus};

/// Domain-level errors (business rule violations).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Amount {amount} has more decimal places than {currency} allows")]
    PrecisionExceeded { amount: Decimal, currency: Currency },

    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: Currency, got: Currency },

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),

    #[error("Unknown payment status: {0}")]
    UnknownStatus(String),

    #[error("Installment count must be between 1 and 12, got {0}")]
    InvalidInstallments(u8),

    #[error("Invalid card details: {0}")]
    InvalidCardDetails(String),

    #[error("Card details are not allowed for {0} payments")]
    CardDetailsOnNonCardMethod(PaymentMethod),

    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Status {from} -> {to} is only reachable through {operation}")]
    TransitionNeedsOperation {
        from: PaymentStatus,
        to: PaymentStatus,
        operation: &'static str,
    },

    #[error("Refund of {requested} exceeds refundable amount {remaining}")]
    RefundExceedsAmount { requested: Decimal, remaining: Decimal },

    #[error("{field} is already {existing}, refusing to overwrite with {received}")]
    GatewayReferenceChanged {
        field: &'static str,
        existing: String,
        received: String,
    },

    #[error("Payment can no longer be edited (status {0})")]
    NotEditable(PaymentStatus),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    /// Stale version or unique-key collision.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// One entry of the gateway's `cause` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GatewayCause {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

/// Errors returned by the gateway client.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// The request was malformed and never sent.
    #[error("Invalid gateway request: {0}")]
    Validation(String),

    /// The gateway understood the request and declined it.
    #[error("Gateway rejected the request ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        causes: Vec<GatewayCause>,
    },

    /// Transport failure, timeout or 5xx.
    #[error("Gateway unavailable: {cause}")]
    Unavailable { cause: String },

    /// The gateway answered with a body that does not match the expected schema.
    #[error("Could not decode gateway response: {cause}")]
    Decode { cause: String },
}

impl GatewayError {
    /// Whether the same request may be sent again without intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Unavailable { .. } | GatewayError::Decode { .. }
        )
    }
}

/// Transport-agnostic classification of application errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    GatewayRejected,
    GatewayUnavailable,
    Internal,
}

/// Application-level errors returned by the payment service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Gateway rejected the request ({status}): {message}")]
    GatewayRejected { status: u16, message: String },

    #[error("Gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::GatewayRejected { .. } => ErrorKind::GatewayRejected,
            AppError::GatewayUnavailable(_) => ErrorKind::GatewayUnavailable,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::IllegalTransition { .. }
            | DomainError::TransitionNeedsOperation { .. }
            | DomainError::GatewayReferenceChanged { .. }
            | DomainError::NotEditable(_) => AppError::Conflict(err.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Conflict(e) => AppError::Conflict(e),
            RepoError::Database(e) => AppError::Internal(e),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation(msg) => AppError::Validation(msg),
            GatewayError::Rejected {
                status, message, ..
            } => AppError::GatewayRejected { status, message },
            GatewayError::Unavailable { cause } => AppError::GatewayUnavailable(cause),
            GatewayError::Decode { cause } => AppError::GatewayUnavailable(cause),
        }
    }
}
