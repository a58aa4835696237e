//! Domain models for the payment service.

pub mod ids;
pub mod money;
pub mod payment;
pub mod state_machine;
pub mod status;

pub use ids::{ClientId, CompanyId, PaymentId};
pub use money::{Currency, Money, PaymentMethod};
pub use payment::{CardDetails, MAX_INSTALLMENTS, MIN_INSTALLMENTS, NewPayment, Payment, PaymentRecord};
pub use state_machine::{can_cancel, can_capture, can_refund, is_legal_transition};
pub use status::PaymentStatus;
