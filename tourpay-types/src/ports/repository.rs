//! Repository port trait.
//!
//! Adapters (Postgres, SQLite, in-memory test doubles) implement this trait.

use crate::domain::{ClientId, CompanyId, Payment, PaymentId};
use crate::error::RepoError;

/// Persistence boundary for payments.
///
/// `update` is optimistic: it must only succeed when the stored version equals
/// `payment.version()`, and it returns the stored payment carrying the new
/// version. A stale write yields `RepoError::Conflict`.
#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    /// Inserts a new payment. Fails with `Conflict` on a duplicate gateway order id.
    async fn create(&self, payment: &Payment) -> Result<Payment, RepoError>;

    /// Writes a modified payment with a version check.
    async fn update(&self, payment: &Payment) -> Result<Payment, RepoError>;

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Lookup used by gateway notifications.
    async fn find_by_gateway_payment_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<Payment>, RepoError>;

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Payment>, RepoError>;

    /// Payments made by a client, newest first.
    async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Payment>, RepoError>;

    /// Payments received by a company, newest first.
    async fn list_by_company(&self, company_id: CompanyId) -> Result<Vec<Payment>, RepoError>;
}
