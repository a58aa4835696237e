//! # TourPay Gateway
//!
//! HTTP implementation of the `PaymentGateway` port. Talks to the external
//! processor's `/v1/orders` and `/v1/payments` APIs and classifies every
//! failure into a `GatewayError`.

mod client;
mod config;
mod wire;

pub use client::HttpGateway;
pub use config::{GatewayConfig, DEFAULT_TIMEOUT};
