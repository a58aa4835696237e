//! Payment aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ids::{ClientId, CompanyId, PaymentId};
use super::money::{Money, PaymentMethod};
use super::state_machine::{can_capture, can_refund, is_legal_transition};
use super::status::PaymentStatus;
use crate::error::DomainError;

pub const MIN_INSTALLMENTS: u8 = 1;
pub const MAX_INSTALLMENTS: u8 = 12;

/// Non-sensitive card snapshot returned by the gateway.
///
/// Never holds the PAN or the CVV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    last_four_digits: String,
    first_six_digits: String,
    pub issuer_id: Option<String>,
    pub cardholder_name: Option<String>,
}

impl CardDetails {
    pub fn new(
        last_four_digits: impl Into<String>,
        first_six_digits: impl Into<String>,
        issuer_id: Option<String>,
        cardholder_name: Option<String>,
    ) -> Result<Self, DomainError> {
        let last_four_digits = last_four_digits.into();
        let first_six_digits = first_six_digits.into();

        if !is_digits(&last_four_digits, 4) {
            return Err(DomainError::InvalidCardDetails(
                "last four digits must be exactly 4 digits".into(),
            ));
        }
        if !is_digits(&first_six_digits, 6) {
            return Err(DomainError::InvalidCardDetails(
                "first six digits must be exactly 6 digits".into(),
            ));
        }

        Ok(Self {
            last_four_digits,
            first_six_digits,
            issuer_id,
            cardholder_name,
        })
    }

    pub fn last_four_digits(&self) -> &str {
        &self.last_four_digits
    }

    pub fn first_six_digits(&self) -> &str {
        &self.first_six_digits
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Input for a freshly accepted payment intent.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub client_id: ClientId,
    pub company_id: CompanyId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub installment_count: u8,
    pub description: Option<String>,
}

/// Every stored field of a Payment, used by repository adapters to rebuild one.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub client_id: ClientId,
    pub company_id: CompanyId,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub status: PaymentStatus,
    pub status_detail: Option<String>,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub installment_count: u8,
    pub card: Option<CardDetails>,
    pub captured: bool,
    pub refunded_amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub authorized_at: Option<DateTime<Utc>>,
    pub captured_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub version: i64,
}

/// A client's payment for a tour.
///
/// Status, gateway references, capture and refund state can only change
/// through the methods below, which enforce the state machine and the
/// monetary invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    id: PaymentId,
    client_id: ClientId,
    company_id: CompanyId,
    gateway_order_id: Option<String>,
    gateway_payment_id: Option<String>,
    status: PaymentStatus,
    /// Free-text diagnostic from the gateway; never drives logic.
    pub status_detail: Option<String>,
    amount: Money,
    payment_method: PaymentMethod,
    installment_count: u8,
    card: Option<CardDetails>,
    captured: bool,
    refunded_amount: Decimal,
    pub description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    authorized_at: Option<DateTime<Utc>>,
    captured_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    version: i64,
}

impl Payment {
    /// Creates a new `pending` payment.
    pub fn new(input: NewPayment) -> Result<Self, DomainError> {
        validate_installments(input.installment_count)?;

        let now = Utc::now();
        Ok(Self {
            id: PaymentId::new(),
            client_id: input.client_id,
            company_id: input.company_id,
            gateway_order_id: None,
            gateway_payment_id: None,
            status: PaymentStatus::Pending,
            status_detail: None,
            amount: input.amount,
            payment_method: input.payment_method,
            installment_count: input.installment_count,
            card: None,
            captured: false,
            refunded_amount: Decimal::ZERO,
            description: input.description,
            created_at: now,
            updated_at: now,
            approved_at: None,
            authorized_at: None,
            captured_at: None,
            cancelled_at: None,
            version: 0,
        })
    }

    /// Rebuilds a payment from storage, re-checking the invariants that a
    /// single row can violate.
    pub fn from_record(record: PaymentRecord) -> Result<Self, DomainError> {
        validate_installments(record.installment_count)?;

        if record.card.is_some() && !record.payment_method.is_card() {
            return Err(DomainError::CardDetailsOnNonCardMethod(
                record.payment_method,
            ));
        }
        if record.refunded_amount < Decimal::ZERO
            || record.refunded_amount > record.amount.amount()
        {
            return Err(DomainError::RefundExceedsAmount {
                requested: record.refunded_amount,
                remaining: record.amount.amount(),
            });
        }
        if record.captured && record.captured_at.is_none() {
            return Err(DomainError::ValidationError(
                "captured payment without capture timestamp".into(),
            ));
        }

        Ok(Self {
            id: record.id,
            client_id: record.client_id,
            company_id: record.company_id,
            gateway_order_id: record.gateway_order_id,
            gateway_payment_id: record.gateway_payment_id,
            status: record.status,
            status_detail: record.status_detail,
            amount: record.amount,
            payment_method: record.payment_method,
            installment_count: record.installment_count,
            card: record.card,
            captured: record.captured,
            refunded_amount: record.refunded_amount,
            description: record.description,
            created_at: record.created_at,
            updated_at: record.updated_at,
            approved_at: record.approved_at,
            authorized_at: record.authorized_at,
            captured_at: record.captured_at,
            cancelled_at: record.cancelled_at,
            version: record.version,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn gateway_order_id(&self) -> Option<&str> {
        self.gateway_order_id.as_deref()
    }

    pub fn gateway_payment_id(&self) -> Option<&str> {
        self.gateway_payment_id.as_deref()
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn installment_count(&self) -> u8 {
        self.installment_count
    }

    pub fn card(&self) -> Option<&CardDetails> {
        self.card.as_ref()
    }

    pub fn captured(&self) -> bool {
        self.captured
    }

    pub fn refunded_amount(&self) -> Decimal {
        self.refunded_amount
    }

    /// Amount still available for refunds.
    pub fn refundable_amount(&self) -> Decimal {
        self.amount.amount() - self.refunded_amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn authorized_at(&self) -> Option<DateTime<Utc>> {
        self.authorized_at
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// Optimistic concurrency counter owned by the repository.
    pub fn version(&self) -> i64 {
        self.version
    }

    /// True once any gateway object references this payment.
    pub fn has_reached_gateway(&self) -> bool {
        self.gateway_order_id.is_some() || self.gateway_payment_id.is_some()
    }

    /// Method-specific fields may only change before the gateway saw the payment.
    pub fn is_editable(&self) -> bool {
        self.status == PaymentStatus::Pending && !self.has_reached_gateway()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Status transitions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Moves the payment to `to` if the state machine allows it.
    ///
    /// Returns `Ok(false)` when the payment is already in `to`. Settling an
    /// authorization and refunding move money, so those two edges are only
    /// reachable through `capture` and `record_refund`.
    pub fn transition_to(
        &mut self,
        to: PaymentStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        if self.status == to {
            return Ok(false);
        }
        if !is_legal_transition(self.status, to) {
            return Err(DomainError::IllegalTransition {
                from: self.status,
                to,
            });
        }
        let operation = match (self.status, to) {
            (PaymentStatus::Authorized, PaymentStatus::Approved) => Some("capture"),
            (_, PaymentStatus::Refunded) => Some("refund"),
            _ => None,
        };
        if let Some(operation) = operation {
            return Err(DomainError::TransitionNeedsOperation {
                from: self.status,
                to,
                operation,
            });
        }
        self.enter(to, at)
    }

    /// Applies a status the gateway reports for money it already moved.
    ///
    /// `authorized -> approved` captures, `approved -> refunded` refunds
    /// whatever is left. Everything else is a plain transition.
    pub fn apply_gateway_status(
        &mut self,
        reported: PaymentStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        match (self.status, reported) {
            (current, reported) if current == reported => Ok(false),
            (PaymentStatus::Authorized, PaymentStatus::Approved) => self.capture(at),
            (PaymentStatus::Approved, PaymentStatus::Refunded) => {
                self.record_refund(self.refundable_amount(), at)?;
                Ok(true)
            }
            _ => self.transition_to(reported, at),
        }
    }

    /// Writes the status and its milestone. Callers have checked legality.
    fn enter(&mut self, to: PaymentStatus, at: DateTime<Utc>) -> Result<bool, DomainError> {
        if !is_legal_transition(self.status, to) {
            return Err(DomainError::IllegalTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        let milestone = match to {
            PaymentStatus::Approved => Some(&mut self.approved_at),
            PaymentStatus::Authorized => Some(&mut self.authorized_at),
            PaymentStatus::Cancelled => Some(&mut self.cancelled_at),
            _ => None,
        };
        if let Some(slot) = milestone {
            slot.get_or_insert(at);
        }
        self.updated_at = at;
        Ok(true)
    }

    /// Settles an authorized payment.
    ///
    /// Returns `Ok(false)` without touching anything when already captured.
    pub fn capture(&mut self, at: DateTime<Utc>) -> Result<bool, DomainError> {
        if self.captured {
            return Ok(false);
        }
        if !can_capture(self.status) {
            return Err(DomainError::IllegalTransition {
                from: self.status,
                to: PaymentStatus::Approved,
            });
        }

        self.enter(PaymentStatus::Approved, at)?;
        self.captured = true;
        self.captured_at.get_or_insert(at);
        Ok(true)
    }

    /// Adds a (possibly partial) refund. The payment becomes `refunded` once
    /// the whole amount has been returned.
    pub fn record_refund(&mut self, refund: Decimal, at: DateTime<Utc>) -> Result<(), DomainError> {
        if !can_refund(self.status) {
            return Err(DomainError::IllegalTransition {
                from: self.status,
                to: PaymentStatus::Refunded,
            });
        }
        if refund <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount(refund));
        }
        Money::check_precision(refund, self.amount.currency())?;

        let remaining = self.refundable_amount();
        if refund > remaining {
            return Err(DomainError::RefundExceedsAmount {
                requested: refund,
                remaining,
            });
        }

        self.refunded_amount += refund;
        self.updated_at = at;
        if self.refunded_amount == self.amount.amount() {
            self.enter(PaymentStatus::Refunded, at)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Gateway references
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records the gateway order. Set once; re-assigning the same id is a no-op.
    pub fn assign_gateway_order(&mut self, order_id: &str) -> Result<(), DomainError> {
        assign_once(&mut self.gateway_order_id, "gateway_order_id", order_id)
    }

    /// Records the gateway payment. Set once; re-assigning the same id is a no-op.
    pub fn assign_gateway_payment(&mut self, payment_id: &str) -> Result<(), DomainError> {
        assign_once(&mut self.gateway_payment_id, "gateway_payment_id", payment_id)
    }

    /// Stores the card snapshot returned by the gateway.
    pub fn record_card(&mut self, card: CardDetails) -> Result<(), DomainError> {
        if !self.payment_method.is_card() {
            return Err(DomainError::CardDetailsOnNonCardMethod(self.payment_method));
        }
        self.card = Some(card);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Editable fields
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn set_installment_count(&mut self, count: u8) -> Result<(), DomainError> {
        if !self.is_editable() {
            return Err(DomainError::NotEditable(self.status));
        }
        validate_installments(count)?;
        self.installment_count = count;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_cardholder_name(&mut self, name: String) -> Result<(), DomainError> {
        match self.card.as_mut() {
            Some(card) => {
                card.cardholder_name = Some(name);
                self.updated_at = Utc::now();
                Ok(())
            }
            None => Err(DomainError::ValidationError(
                "payment has no card details".into(),
            )),
        }
    }

    /// Called by repository adapters after a successful write.
    pub fn persisted(mut self, version: i64) -> Self {
        self.version = version;
        self
    }
}

fn validate_installments(count: u8) -> Result<(), DomainError> {
    if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&count) {
        return Err(DomainError::InvalidInstallments(count));
    }
    Ok(())
}

fn assign_once(
    slot: &mut Option<String>,
    field: &'static str,
    value: &str,
) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::ValidationError(format!("{field} cannot be empty")));
    }
    match slot {
        Some(existing) if existing == value => Ok(()),
        Some(existing) => Err(DomainError::GatewayReferenceChanged {
            field,
            existing: existing.clone(),
            received: value.to_string(),
        }),
        None => {
            *slot = Some(value.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn new_payment(amount: Decimal, method: PaymentMethod) -> Payment {
        Payment::new(NewPayment {
            client_id: ClientId::new(),
            company_id: CompanyId::new(),
            amount: Money::new(amount, Currency::BRL).unwrap(),
            payment_method: method,
            installment_count: 1,
            description: Some("Sugarloaf Mountain tour".into()),
        })
        .unwrap()
    }

    fn approved_payment(amount: Decimal) -> Payment {
        let mut payment = new_payment(amount, PaymentMethod::CreditCard);
        payment
            .transition_to(PaymentStatus::Approved, Utc::now())
            .unwrap();
        payment
    }

    #[test]
    fn test_new_payment_is_pending() {
        let payment = new_payment(dec!(100), PaymentMethod::Pix);
        assert_eq!(payment.status(), PaymentStatus::Pending);
        assert!(!payment.captured());
        assert_eq!(payment.refunded_amount(), Decimal::ZERO);
        assert!(payment.approved_at().is_none());
        assert_eq!(payment.version(), 0);
    }

    #[test]
    fn test_installments_out_of_range_fail() {
        for count in [0u8, 13] {
            let result = Payment::new(NewPayment {
                client_id: ClientId::new(),
                company_id: CompanyId::new(),
                amount: Money::new(dec!(10), Currency::BRL).unwrap(),
                payment_method: PaymentMethod::CreditCard,
                installment_count: count,
                description: None,
            });
            assert!(matches!(result, Err(DomainError::InvalidInstallments(_))));
        }
    }

    #[test]
    fn test_milestone_is_set_once() {
        let mut payment = new_payment(dec!(100), PaymentMethod::CreditCard);
        let first = Utc::now();
        payment
            .transition_to(PaymentStatus::InProcess, first)
            .unwrap();
        payment
            .transition_to(PaymentStatus::Approved, first)
            .unwrap();
        assert_eq!(payment.approved_at(), Some(first));
        assert!(payment.authorized_at().is_none());
        assert!(payment.cancelled_at().is_none());
    }

    #[test]
    fn test_illegal_transition_leaves_payment_untouched() {
        let mut payment = approved_payment(dec!(100));
        let before = payment.clone();
        let result = payment.transition_to(PaymentStatus::Pending, Utc::now());
        assert!(matches!(result, Err(DomainError::IllegalTransition { .. })));
        assert_eq!(payment, before);
    }

    #[test]
    fn test_same_status_is_noop() {
        let mut payment = new_payment(dec!(100), PaymentMethod::Pix);
        assert!(!payment
            .transition_to(PaymentStatus::Pending, Utc::now())
            .unwrap());
    }

    #[test]
    fn test_capture_from_authorized() {
        let mut payment = new_payment(dec!(100), PaymentMethod::CreditCard);
        payment
            .transition_to(PaymentStatus::Authorized, Utc::now())
            .unwrap();

        assert!(payment.capture(Utc::now()).unwrap());
        assert_eq!(payment.status(), PaymentStatus::Approved);
        assert!(payment.captured());
        assert!(payment.captured_at().is_some());
        assert!(payment.approved_at().is_some());
        assert!(payment.authorized_at().is_some());

        let before = payment.clone();
        assert!(!payment.capture(Utc::now()).unwrap());
        assert_eq!(payment, before);
    }

    #[test]
    fn test_capture_requires_authorized() {
        let mut payment = new_payment(dec!(100), PaymentMethod::CreditCard);
        assert!(matches!(
            payment.capture(Utc::now()),
            Err(DomainError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_partial_then_full_refund() {
        let mut payment = approved_payment(dec!(100));
        payment.record_refund(dec!(40), Utc::now()).unwrap();
        assert_eq!(payment.status(), PaymentStatus::Approved);
        assert_eq!(payment.refundable_amount(), dec!(60));

        payment.record_refund(dec!(60), Utc::now()).unwrap();
        assert_eq!(payment.status(), PaymentStatus::Refunded);
        assert_eq!(payment.refunded_amount(), dec!(100));
    }

    #[test]
    fn test_refund_cannot_exceed_amount() {
        let mut payment = approved_payment(dec!(100));
        let result = payment.record_refund(dec!(100.01), Utc::now());
        assert!(matches!(result, Err(DomainError::RefundExceedsAmount { .. })));
        assert_eq!(payment.refunded_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_refund_requires_approved() {
        let mut payment = new_payment(dec!(100), PaymentMethod::CreditCard);
        assert!(matches!(
            payment.record_refund(dec!(10), Utc::now()),
            Err(DomainError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_money_moving_edges_need_their_operation() {
        let mut refundable = approved_payment(dec!(100));
        assert!(matches!(
            refundable.transition_to(PaymentStatus::Refunded, Utc::now()),
            Err(DomainError::TransitionNeedsOperation { operation: "refund", .. })
        ));
        assert_eq!(refundable.status(), PaymentStatus::Approved);

        let mut authorized = new_payment(dec!(100), PaymentMethod::CreditCard);
        authorized
            .transition_to(PaymentStatus::Authorized, Utc::now())
            .unwrap();
        assert!(matches!(
            authorized.transition_to(PaymentStatus::Approved, Utc::now()),
            Err(DomainError::TransitionNeedsOperation { operation: "capture", .. })
        ));
        assert!(!authorized.captured());
    }

    #[test]
    fn test_gateway_refund_returns_the_remainder() {
        let mut payment = approved_payment(dec!(150.00));
        payment.record_refund(dec!(50.00), Utc::now()).unwrap();

        assert!(payment
            .apply_gateway_status(PaymentStatus::Refunded, Utc::now())
            .unwrap());
        assert_eq!(payment.status(), PaymentStatus::Refunded);
        assert_eq!(payment.refunded_amount(), dec!(150.00));
        assert_eq!(payment.refundable_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_gateway_approval_of_authorization_captures() {
        let mut payment = new_payment(dec!(100), PaymentMethod::CreditCard);
        payment
            .transition_to(PaymentStatus::Authorized, Utc::now())
            .unwrap();

        assert!(payment
            .apply_gateway_status(PaymentStatus::Approved, Utc::now())
            .unwrap());
        assert!(payment.captured());
        assert!(payment.captured_at().is_some());
        assert!(!payment
            .apply_gateway_status(PaymentStatus::Approved, Utc::now())
            .unwrap());
    }

    #[test]
    fn test_gateway_order_is_set_once() {
        let mut payment = new_payment(dec!(100), PaymentMethod::CreditCard);
        payment.assign_gateway_order("ORD-1").unwrap();
        payment.assign_gateway_order("ORD-1").unwrap();
        assert!(matches!(
            payment.assign_gateway_order("ORD-2"),
            Err(DomainError::GatewayReferenceChanged { .. })
        ));
        assert_eq!(payment.gateway_order_id(), Some("ORD-1"));
    }

    #[test]
    fn test_card_details_only_on_card_methods() {
        let card = CardDetails::new("4242", "424242", None, Some("ANA SOUZA".into())).unwrap();
        let mut pix = new_payment(dec!(10), PaymentMethod::Pix);
        assert!(matches!(
            pix.record_card(card.clone()),
            Err(DomainError::CardDetailsOnNonCardMethod(_))
        ));

        let mut credit = new_payment(dec!(10), PaymentMethod::CreditCard);
        credit.record_card(card).unwrap();
        assert_eq!(credit.card().unwrap().last_four_digits(), "4242");
    }

    #[test]
    fn test_card_digits_are_validated() {
        assert!(CardDetails::new("42a2", "424242", None, None).is_err());
        assert!(CardDetails::new("4242", "4242", None, None).is_err());
    }

    #[test]
    fn test_installments_locked_after_gateway() {
        let mut payment = new_payment(dec!(100), PaymentMethod::CreditCard);
        payment.set_installment_count(6).unwrap();
        payment.assign_gateway_order("ORD-9").unwrap();
        assert!(matches!(
            payment.set_installment_count(3),
            Err(DomainError::NotEditable(_))
        ));
        assert_eq!(payment.installment_count(), 6);
    }

    proptest! {
        #[test]
        fn refunded_never_exceeds_amount(
            amount_cents in 1i64..1_000_000,
            refunds in prop::collection::vec(1i64..500_000, 1..12),
        ) {
            let mut payment = approved_payment(Decimal::new(amount_cents, 2));
            let mut previous = payment.refunded_amount();

            for cents in refunds {
                let _ = payment.record_refund(Decimal::new(cents, 2), Utc::now());
                prop_assert!(payment.refunded_amount() <= payment.amount().amount());
                prop_assert!(payment.refunded_amount() >= previous);
                previous = payment.refunded_amount();
            }
        }

        #[test]
        fn random_walk_only_follows_edges(steps in prop::collection::vec(0usize..9, 1..20)) {
            let mut payment = new_payment(dec!(50), PaymentMethod::CreditCard);
            for index in steps {
                let from = payment.status();
                let to = PaymentStatus::ALL[index];
                match payment.apply_gateway_status(to, Utc::now()) {
                    Ok(true) => prop_assert!(is_legal_transition(from, to)),
                    Ok(false) => prop_assert_eq!(from, to),
                    Err(_) => prop_assert_eq!(payment.status(), from),
                }
                if payment.status() == PaymentStatus::Refunded {
                    prop_assert_eq!(payment.refunded_amount(), payment.amount().amount());
                }
            }
        }
    }
}
