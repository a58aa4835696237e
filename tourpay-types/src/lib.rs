//! # Tourpay Types
//!
//! Domain types and port traits for the tour marketplace payment subsystem.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Money, Payment aggregate and its status state machine
//! - `gateway/` - Typed intents and results exchanged with the gateway port
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, repository, gateway and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod gateway;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CardDetails, ClientId, CompanyId, Currency, Money, NewPayment, Payment, PaymentId,
    PaymentMethod, PaymentRecord, PaymentStatus, is_legal_transition,
};
pub use dto::*;
pub use error::{AppError, DomainError, ErrorKind, GatewayCause, GatewayError, RepoError};
pub use gateway::{
    CaptureMode, GatewayCard, Identification, LineItem, OrderIntent, OrderResult, Payer,
    PaymentIntent, PaymentResult, PixResult, RefundResult,
};
pub use ports::{PaymentGateway, PaymentRepository};
