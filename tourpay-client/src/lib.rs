//! # Tourpay Client SDK
//!
//! A typed Rust client for the tour payments API.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use tourpay_types::{
    AuthorizeCardPaymentRequest, ClientId, CompanyId, CreatePaymentRequest, ErrorKind,
    PaymentId, PaymentResponse, PixCheckoutResponse, PixPaymentRequest, RefundRequest,
    TicketPaymentRequest, UpdatePaymentRequest,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        kind: Option<ErrorKind>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The server-side error kind, when the response carried one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Api { kind, .. } => *kind,
            _ => None,
        }
    }
}

/// Tour payments API client.
pub struct PaymentsClient {
    base_url: String,
    http: Client,
}

impl PaymentsClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Registers a pending payment.
    pub async fn create_payment(
        &self,
        req: &CreatePaymentRequest,
    ) -> Result<PaymentResponse, ClientError> {
        self.send(Method::POST, "/api/payments", Some(req)).await
    }

    pub async fn get_payment(&self, id: PaymentId) -> Result<PaymentResponse, ClientError> {
        self.send::<_, ()>(Method::GET, &format!("/api/payments/{id}"), None)
            .await
    }

    pub async fn update_payment(
        &self,
        id: PaymentId,
        patch: &UpdatePaymentRequest,
    ) -> Result<PaymentResponse, ClientError> {
        self.send(Method::PATCH, &format!("/api/payments/{id}"), Some(patch))
            .await
    }

    /// Authorizes a card payment through a gateway order.
    pub async fn authorize_card_payment(
        &self,
        req: &AuthorizeCardPaymentRequest,
    ) -> Result<PaymentResponse, ClientError> {
        self.send(Method::POST, "/api/payments/authorize", Some(req))
            .await
    }

    /// Starts a PIX payment and returns the QR payload.
    pub async fn start_pix_payment(
        &self,
        req: &PixPaymentRequest,
    ) -> Result<PixCheckoutResponse, ClientError> {
        self.send(Method::POST, "/api/payments/pix", Some(req)).await
    }

    /// Starts a boleto or pec payment.
    pub async fn start_ticket_payment(
        &self,
        req: &TicketPaymentRequest,
    ) -> Result<PaymentResponse, ClientError> {
        self.send(Method::POST, "/api/payments/ticket", Some(req))
            .await
    }

    pub async fn capture(&self, id: PaymentId) -> Result<PaymentResponse, ClientError> {
        self.send::<_, ()>(Method::POST, &format!("/api/payments/{id}/capture"), None)
            .await
    }

    pub async fn cancel(&self, id: PaymentId) -> Result<PaymentResponse, ClientError> {
        self.send::<_, ()>(Method::POST, &format!("/api/payments/{id}/cancel"), None)
            .await
    }

    /// Refunds `req.amount`, or everything still refundable when it is `None`.
    pub async fn refund(
        &self,
        id: PaymentId,
        req: &RefundRequest,
    ) -> Result<PaymentResponse, ClientError> {
        self.send(Method::POST, &format!("/api/payments/{id}/refund"), Some(req))
            .await
    }

    /// Re-reads the payment's status from the gateway.
    pub async fn sync_status(&self, id: PaymentId) -> Result<PaymentResponse, ClientError> {
        self.send::<_, ()>(Method::POST, &format!("/api/payments/{id}/sync"), None)
            .await
    }

    pub async fn list_client_payments(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<PaymentResponse>, ClientError> {
        self.send::<_, ()>(
            Method::GET,
            &format!("/api/clients/{client_id}/payments"),
            None,
        )
        .await
    }

    pub async fn list_company_payments(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<PaymentResponse>, ClientError> {
        self.send::<_, ()>(
            Method::GET,
            &format!("/api/companies/{company_id}/payments"),
            None,
        )
        .await
    }

    async fn send<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
            let kind = parsed
                .as_ref()
                .and_then(|v| v.get("kind"))
                .and_then(|k| serde_json::from_value(k.clone()).ok());
            let message = parsed
                .as_ref()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                kind,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PaymentsClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = PaymentsClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_error_kind_is_exposed() {
        let err = ClientError::Api {
            status: 409,
            kind: Some(ErrorKind::Conflict),
            message: "payment cannot be cancelled".into(),
        };
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
        assert_eq!(
            err.to_string(),
            "API error: 409 - payment cannot be cancelled"
        );
    }
}
