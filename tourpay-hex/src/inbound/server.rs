//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tourpay_types::{PaymentGateway, PaymentRepository};

use super::handlers::{self, AppState};
use crate::PaymentService;
use crate::openapi::ApiDoc;

/// HTTP Server for the payments API.
pub struct HttpServer<R: PaymentRepository, G: PaymentGateway> {
    service: PaymentService<R, G>,
    webhook_secret: Option<String>,
}

impl<R: PaymentRepository, G: PaymentGateway> HttpServer<R, G> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: PaymentService<R, G>) -> Self {
        Self {
            service,
            webhook_secret: None,
        }
    }

    /// Requires a valid `x-signature` on gateway notifications.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(self) -> Router {
        if self.webhook_secret.is_none() {
            tracing::warn!("no webhook secret configured, gateway notifications are not verified");
        }

        let state = Arc::new(AppState {
            service: self.service,
            webhook_secret: self.webhook_secret,
        });

        // Uses the globally installed MeterProvider.
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/payments", post(handlers::create_payment::<R, G>))
            .route(
                "/api/payments/authorize",
                post(handlers::authorize_card_payment::<R, G>),
            )
            .route("/api/payments/pix", post(handlers::start_pix_payment::<R, G>))
            .route(
                "/api/payments/ticket",
                post(handlers::start_ticket_payment::<R, G>),
            )
            .route(
                "/api/payments/{id}",
                get(handlers::get_payment::<R, G>).patch(handlers::update_payment::<R, G>),
            )
            .route("/api/payments/{id}/capture", post(handlers::capture::<R, G>))
            .route("/api/payments/{id}/cancel", post(handlers::cancel::<R, G>))
            .route("/api/payments/{id}/refund", post(handlers::refund::<R, G>))
            .route("/api/payments/{id}/sync", post(handlers::sync_status::<R, G>))
            .route(
                "/api/clients/{id}/payments",
                get(handlers::list_client_payments::<R, G>),
            )
            .route(
                "/api/companies/{id}/payments",
                get(handlers::list_company_payments::<R, G>),
            )
            .route(
                "/api/notifications/gateway",
                post(handlers::gateway_notification::<R, G>),
            )
            .with_state(state)
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
