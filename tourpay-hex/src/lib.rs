//! # Tourpay Hex
//!
//! Application service layer and HTTP adapter for the tour payments service.
//!
//! ## Architecture
//!
//! - `service/` - Payment service (the only place a payment's status changes)
//! - `inbound/` - HTTP adapter (Axum server, webhook signature check)
//! - `openapi/` - OpenAPI document served under `/swagger-ui`
//!
//! The service is generic over `R: PaymentRepository` and `G: PaymentGateway`,
//! so storage and gateway adapters are injected by the binary.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{PaymentService, PixCheckout};
