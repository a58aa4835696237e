//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod handlers;
mod server;
pub mod signature;

pub use handlers::ApiError;
pub use server::HttpServer;
