//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::PgPool;

use tourpay_types::{
    ClientId, CompanyId, Payment, PaymentId, PaymentRepository, RepoError,
};

use crate::types::{PAYMENT_COLUMNS, PaymentRow, map_write_error, stale_version};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository with optimistic version checks.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_payments_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentRepository for PostgresRepo {
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
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                      $17, $18, $19, $20, $21, $22, $23, $24, $25)"#,
        )
        .bind(payment.id().into_uuid())
        .bind(payment.client_id().into_uuid())
        .bind(payment.company_id().into_uuid())
        .bind(payment.gateway_order_id())
        .bind(payment.gateway_payment_id())
        .bind(payment.status().code())
        .bind(payment.status_detail.as_deref())
        .bind(payment.amount().amount())
        .bind(payment.amount().currency().code())
        .bind(payment.payment_method().code())
        .bind(i32::from(payment.installment_count()))
        .bind(card.map(|c| c.last_four_digits()))
        .bind(card.map(|c| c.first_six_digits()))
        .bind(card.and_then(|c| c.issuer_id.as_deref()))
        .bind(card.and_then(|c| c.cardholder_name.as_deref()))
        .bind(payment.captured())
        .bind(payment.refunded_amount())
        .bind(payment.description.as_deref())
        .bind(payment.created_at())
        .bind(payment.updated_at())
        .bind(payment.approved_at())
        .bind(payment.authorized_at())
        .bind(payment.captured_at())
        .bind(payment.cancelled_at())
        .bind(payment.version())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(payment.clone())
    }

    async fn update(&self, payment: &Payment) -> Result<Payment, RepoError> {
        let card = payment.card();
        let expected = payment.version();

        let new_version: Option<i64> = sqlx::query_scalar(
            r#"UPDATE payments SET
                gateway_order_id = $1, gateway_payment_id = $2, status = $3, status_detail = $4,
                installment_count = $5, card_last_four = $6, card_first_six = $7,
                card_issuer_id = $8, cardholder_name = $9, captured = $10, refunded_amount = $11,
                description = $12, updated_at = $13, approved_at = $14, authorized_at = $15,
                captured_at = $16, cancelled_at = $17, version = version + 1
               WHERE id = $18 AND version = $19
               RETURNING version"#,
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
        .bind(payment.refunded_amount())
        .bind(payment.description.as_deref())
        .bind(payment.updated_at())
        .bind(payment.approved_at())
        .bind(payment.authorized_at())
        .bind(payment.captured_at())
        .bind(payment.cancelled_at())
        .bind(payment.id().into_uuid())
        .bind(expected)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        match new_version {
            Some(version) => Ok(payment.clone().persisted(version)),
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payments WHERE id = $1)")
                        .bind(payment.id().into_uuid())
                        .fetch_one(&self.pool)
                        .await
                        .map_err(|e| RepoError::Database(e.to_string()))?;
                if exists {
                    Err(stale_version(payment.id(), expected))
                } else {
                    Err(RepoError::NotFound)
                }
            }
        }
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(PaymentRow::into_domain).transpose()
    }

    async fn find_by_gateway_payment_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<Payment>, RepoError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE gateway_payment_id = $1");
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(gateway_payment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(PaymentRow::into_domain).transpose()
    }

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, RepoError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE gateway_order_id = $1");
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(gateway_order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(PaymentRow::into_domain).transpose()
    }

    async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Payment>, RepoError> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE client_id = $1 ORDER BY created_at DESC"
        );
        let rows: Vec<PaymentRow> = sqlx::query_as(&sql)
            .bind(client_id.into_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(PaymentRow::into_domain).collect()
    }

    async fn list_by_company(&self, company_id: CompanyId) -> Result<Vec<Payment>, RepoError> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE company_id = $1 ORDER BY created_at DESC"
        );
        let rows: Vec<PaymentRow> = sqlx::query_as(&sql)
            .bind(company_id.into_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(PaymentRow::into_domain).collect()
    }
}
