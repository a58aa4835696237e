//! SQLite repository adapter.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use tourpay_types::{
    ClientId, CompanyId, Payment, PaymentId, PaymentRepository, RepoError,
};

use crate::types::{
    PAYMENT_COLUMNS, SqlitePaymentRow, map_write_error, stale_version, timestamp_text,
};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `:memory:` opens a separate database, so keep exactly one alive.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        value: String,
    ) -> Result<Option<Payment>, RepoError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE {clause}");
        let row: Option<SqlitePaymentRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(SqlitePaymentRow::into_domain).transpose()
    }

    async fn fetch_all_where(&self, clause: &str, value: String) -> Result<Vec<Payment>, RepoError> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE {clause} ORDER BY created_at DESC"
        );
        let rows: Vec<SqlitePaymentRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(SqlitePaymentRow::into_domain).collect()
    }
}

async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let ddl = include_str!("../migrations/0001_create_payments.sql");
    for statement in ddl.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration 0001 failed: {}", e))?;
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for SqliteRepo {
    async fn create(&self, payment: &Payment) -> Result<Payment, RepoError> {
        let card = payment.card();

        sqlx::query(
            r#"INSERT INTO payments (
                id, client_id, company_id, gateway_order_id, gateway_payment_id,
                status, status_detail, amount, currency, payment_method, installment_count,
                card_last_four, card_first_six, card_issuer_id, cardholder_name,
                captured, refunded_amount, description,
                created_at, updated_at, approved_at, authorized_at, captured_at, cancelled_at,
                version
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.id().to_string())
        .bind(payment.client_id().to_string())
        .bind(payment.company_id().to_string())
        .bind(payment.gateway_order_id())
        .bind(payment.gateway_payment_id())
        .bind(payment.status().code())
        .bind(payment.status_detail.as_deref())
        .bind(payment.amount().amount().to_string())
        .bind(payment.amount().currency().code())
        .bind(payment.payment_method().code())
        .bind(i32::from(payment.installment_count()))
        .bind(card.map(|c| c.last_four_digits()))
        .bind(card.map(|c| c.first_six_digits()))
        .bind(card.and_then(|c| c.issuer_id.as_deref()))
        .bind(card.and_then(|c| c.cardholder_name.as_deref()))
        .bind(payment.captured())
        .bind(payment.refunded_amount().to_string())
        .bind(payment.description.as_deref())
        .bind(timestamp_text(payment.created_at()))
        .bind(timestamp_text(payment.updated_at()))
        .bind(payment.approved_at().map(timestamp_text))
        .bind(payment.authorized_at().map(timestamp_text))
        .bind(payment.captured_at().map(timestamp_text))
        .bind(payment.cancelled_at().map(timestamp_text))
        .bind(payment.version())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(payment.clone())
    }

    async fn update(&self, payment: &Payment) -> Result<Payment, RepoError> {
        let card = payment.card();
        let expected = payment.version();

        let result = sqlx::query(
            r#"UPDATE payments SET
                gateway_order_id = ?, gateway_payment_id = ?, status = ?, status_detail = ?,
                installment_count = ?, card_last_four = ?, card_first_six = ?,
                card_issuer_id = ?, cardholder_name = ?, captured = ?, refunded_amount = ?,
                description = ?, updated_at = ?, approved_at = ?, authorized_at = ?,
                captured_at = ?, cancelled_at = ?, version = version + 1
               WHERE id = ? AND version = ?"#,
        )
        .bind(payment.gateway_order_id())
        .bind(payment.gateway_payment_id())
        .bind(payment.status().code())
        .bind(payment.status_detail.as_deref())
        .bind(i32::from(payment.installment_count()))
        .bind(card.map(|c| c.last_four_digits()))
        .bind(card.map(|c| c.first_six_digits()))
        .bind(card.and_then(|c| c.issuer_id.as_deref()))
        .bind(card.and_then(|c| c.cardholder_name.as_deref()))
        .bind(payment.captured())
        .bind(payment.refunded_amount().to_string())
        .bind(payment.description.as_deref())
        .bind(timestamp_text(payment.updated_at()))
        .bind(payment.approved_at().map(timestamp_text))
        .bind(payment.authorized_at().map(timestamp_text))
        .bind(payment.captured_at().map(timestamp_text))
        .bind(payment.cancelled_at().map(timestamp_text))
        .bind(payment.id().to_string())
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(payment.id()).await? {
                Some(_) => Err(stale_version(payment.id(), expected)),
                None => Err(RepoError::NotFound),
            };
        }

        Ok(payment.clone().persisted(expected + 1))
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        self.fetch_one_where("id = ?", id.to_string()).await
    }

    async fn find_by_gateway_payment_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<Payment>, RepoError> {
        self.fetch_one_where("gateway_payment_id = ?", gateway_payment_id.to_string())
            .await
    }

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, RepoError> {
        self.fetch_one_where("gateway_order_id = ?", gateway_order_id.to_string())
            .await
    }

    async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Payment>, RepoError> {
        self.fetch_all_where("client_id = ?", client_id.to_string())
            .await
    }

    async fn list_by_company(&self, company_id: CompanyId) -> Result<Vec<Payment>, RepoError> {
        self.fetch_all_where("company_id = ?", company_id.to_string())
            .await
    }
}
