//! Row types shared by the SQL adapters and their mapping back to `Payment`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use tourpay_types::{
    CardDetails, ClientId, CompanyId, Currency, DomainError, Money, Payment, PaymentId,
    PaymentMethod, PaymentRecord, PaymentStatus, RepoError,
};

/// Column list shared by every `SELECT`, in table order.
pub const PAYMENT_COLUMNS: &str = "id, client_id, company_id, gateway_order_id, gateway_payment_id, \
     status, status_detail, amount, currency, payment_method, installment_count, \
     card_last_four, card_first_six, card_issuer_id, cardholder_name, captured, refunded_amount, \
     description, created_at, updated_at, approved_at, authorized_at, captured_at, cancelled_at, version";

// ─────────────────────────────────────────────────────────────────────────────
// Typed row (Postgres decodes straight into it; SQLite goes through text)
// ─────────────────────────────────────────────────────────────────────────────

/// A `payments` row with native column types.
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct PaymentRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub company_id: Uuid,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub status: String,
    pub status_detail: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub installment_count: i32,
    pub card_last_four: Option<String>,
    pub card_first_six: Option<String>,
    pub card_issuer_id: Option<String>,
    pub cardholder_name: Option<String>,
    pub captured: bool,
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

impl PaymentRow {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        let currency = Currency::from_str(&self.currency)?;
        let payment_method = PaymentMethod::from_str(&self.payment_method)?;
        let status = PaymentStatus::from_str(&self.status)?;
        let installment_count = u8::try_from(self.installment_count).map_err(|_| {
            DomainError::ValidationError(format!(
                "stored installment count out of range: {}",
                self.installment_count
            ))
        })?;

        let card = match (self.card_last_four, self.card_first_six) {
            (Some(last_four), Some(first_six)) => Some(CardDetails::new(
                last_four,
                first_six,
                self.card_issuer_id,
                self.cardholder_name,
            )?),
            _ => None,
        };

        let record = PaymentRecord {
            id: PaymentId::from_uuid(self.id),
            client_id: ClientId::from_uuid(self.client_id),
            company_id: CompanyId::from_uuid(self.company_id),
            gateway_order_id: self.gateway_order_id,
            gateway_payment_id: self.gateway_payment_id,
            status,
            status_detail: self.status_detail,
            amount: Money::new(self.amount, currency)?,
            payment_method,
            installment_count,
            card,
            captured: self.captured,
            refunded_amount: self.refunded_amount,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            approved_at: self.approved_at,
            authorized_at: self.authorized_at,
            captured_at: self.captured_at,
            cancelled_at: self.cancelled_at,
            version: self.version,
        };

        Ok(Payment::from_record(record)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite row (uuids, decimals and timestamps stored as text)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
#[derive(sqlx::FromRow)]
pub struct SqlitePaymentRow {
    pub id: String,
    pub client_id: String,
    pub company_id: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub status: String,
    pub status_detail: Option<String>,
    pub amount: String,
    pub currency: String,
    pub payment_method: String,
    pub installment_count: i32,
    pub card_last_four: Option<String>,
    pub card_first_six: Option<String>,
    pub card_issuer_id: Option<String>,
    pub cardholder_name: Option<String>,
    pub captured: bool,
    pub refunded_amount: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub approved_at: Option<String>,
    pub authorized_at: Option<String>,
    pub captured_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub version: i64,
}

#[cfg(feature = "sqlite")]
impl SqlitePaymentRow {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        PaymentRow {
            id: parse_uuid(&self.id)?,
            client_id: parse_uuid(&self.client_id)?,
            company_id: parse_uuid(&self.company_id)?,
            gateway_order_id: self.gateway_order_id,
            gateway_payment_id: self.gateway_payment_id,
            status: self.status,
            status_detail: self.status_detail,
            amount: parse_decimal(&self.amount)?,
            currency: self.currency,
            payment_method: self.payment_method,
            installment_count: self.installment_count,
            card_last_four: self.card_last_four,
            card_first_six: self.card_first_six,
            card_issuer_id: self.card_issuer_id,
            cardholder_name: self.cardholder_name,
            captured: self.captured,
            refunded_amount: parse_decimal(&self.refunded_amount)?,
            description: self.description,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            approved_at: parse_optional_timestamp(self.approved_at.as_deref())?,
            authorized_at: parse_optional_timestamp(self.authorized_at.as_deref())?,
            captured_at: parse_optional_timestamp(self.captured_at.as_deref())?,
            cancelled_at: parse_optional_timestamp(self.cancelled_at.as_deref())?,
            version: self.version,
        }
        .into_domain()
    }
}

#[cfg(feature = "sqlite")]
fn parse_uuid(raw: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(raw).map_err(|e| RepoError::Database(format!("invalid uuid {raw}: {e}")))
}

#[cfg(feature = "sqlite")]
fn parse_decimal(raw: &str) -> Result<Decimal, RepoError> {
    Decimal::from_str(raw).map_err(|e| RepoError::Database(format!("invalid decimal {raw}: {e}")))
}

#[cfg(feature = "sqlite")]
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(format!("invalid timestamp {raw}: {e}")))
}

#[cfg(feature = "sqlite")]
fn parse_optional_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, RepoError> {
    raw.map(parse_timestamp).transpose()
}

/// Fixed-width RFC 3339 so text timestamps sort chronologically.
#[cfg(feature = "sqlite")]
pub fn timestamp_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

// ─────────────────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Unique-key collisions become `Conflict`; everything else is a database error.
pub fn map_write_error(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return RepoError::Conflict(db.message().to_string());
        }
    }
    RepoError::Database(err.to_string())
}

pub fn stale_version(id: PaymentId, expected: i64) -> RepoError {
    RepoError::Conflict(format!(
        "payment {id} was modified concurrently (expected version {expected})"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row() -> PaymentRow {
        let now = Utc::now();
        PaymentRow {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            gateway_order_id: Some("ORD-1".into()),
            gateway_payment_id: Some("PAY-1".into()),
            status: "authorized".into(),
            status_detail: None,
            amount: dec!(150.00),
            currency: "BRL".into(),
            payment_method: "credit_card".into(),
            installment_count: 3,
            card_last_four: Some("4242".into()),
            card_first_six: Some("424242".into()),
            card_issuer_id: None,
            cardholder_name: Some("ANA SOUZA".into()),
            captured: false,
            refunded_amount: Decimal::ZERO,
            description: None,
            created_at: now,
            updated_at: now,
            approved_at: None,
            authorized_at: Some(now),
            captured_at: None,
            cancelled_at: None,
            version: 4,
        }
    }

    #[test]
    fn test_row_into_domain() {
        let payment = row().into_domain().unwrap();
        assert_eq!(payment.status(), PaymentStatus::Authorized);
        assert_eq!(payment.installment_count(), 3);
        assert_eq!(payment.card().unwrap().last_four_digits(), "4242");
        assert_eq!(payment.version(), 4);
    }

    #[test]
    fn test_corrupt_row_is_rejected() {
        let mut bad = row();
        bad.refunded_amount = dec!(200.00);
        assert!(matches!(bad.into_domain(), Err(RepoError::Domain(_))));

        let mut bad = row();
        bad.status = "teleported".into();
        assert!(matches!(bad.into_domain(), Err(RepoError::Domain(_))));
    }
}
