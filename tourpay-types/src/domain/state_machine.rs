//! Legal status transitions of a Payment.
//!
//! Pure functions only: nothing here holds state or talks to the gateway.
//! Backward edges (e.g. `approved -> pending`) do not exist, so a duplicate
//! or out-of-order notification cannot regress a settled payment.

use super::status::PaymentStatus;

/// Returns true when `requested` is an outgoing edge of `current`.
///
/// Staying in the same status is not an edge.
pub fn is_legal_transition(current: PaymentStatus, requested: PaymentStatus) -> bool {
    use PaymentStatus::*;

    match current {
        Pending => matches!(
            requested,
            Approved | Authorized | InProcess | Rejected | Cancelled
        ),
        Authorized => matches!(requested, Approved | Cancelled),
        Approved => matches!(requested, Refunded | ChargedBack),
        InProcess => matches!(requested, Approved | InMediation | Rejected | Cancelled),
        InMediation => matches!(requested, Approved | Rejected | ChargedBack),
        Rejected | Cancelled | Refunded | ChargedBack => false,
    }
}

/// A payment that has not settled yet can be cancelled; a settled one must be refunded.
pub fn can_cancel(status: PaymentStatus) -> bool {
    is_legal_transition(status, PaymentStatus::Cancelled)
}

/// Only an authorized (reserved, not yet charged) payment can be captured.
pub fn can_capture(status: PaymentStatus) -> bool {
    status == PaymentStatus::Authorized
}

/// Refunds apply to settled payments.
pub fn can_refund(status: PaymentStatus) -> bool {
    is_legal_transition(status, PaymentStatus::Refunded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PaymentStatus::*;

    const EDGES: &[(PaymentStatus, PaymentStatus)] = &[
        (Pending, Approved),
        (Pending, Authorized),
        (Pending, InProcess),
        (Pending, Rejected),
        (Pending, Cancelled),
        (Authorized, Approved),
        (Authorized, Cancelled),
        (Approved, Refunded),
        (Approved, ChargedBack),
        (InProcess, Approved),
        (InProcess, InMediation),
        (InProcess, Rejected),
        (InProcess, Cancelled),
        (InMediation, Approved),
        (InMediation, Rejected),
        (InMediation, ChargedBack),
    ];

    #[test]
    fn test_legality_matches_edge_set_exactly() {
        for from in PaymentStatus::ALL {
            for to in PaymentStatus::ALL {
                assert_eq!(
                    is_legal_transition(from, to),
                    EDGES.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_edges() {
        for from in PaymentStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(PaymentStatus::ALL.iter().all(|to| !is_legal_transition(from, *to)));
        }
    }

    #[test]
    fn test_cancellable_states() {
        let cancellable: Vec<_> = PaymentStatus::ALL
            .into_iter()
            .filter(|s| can_cancel(*s))
            .collect();
        assert_eq!(cancellable, vec![Pending, Authorized, InProcess]);
    }

    #[test]
    fn test_capture_and_refund_sources() {
        assert!(can_capture(Authorized));
        assert!(!can_capture(Pending));
        assert!(!can_capture(Approved));
        assert!(can_refund(Approved));
        assert!(!can_refund(Authorized));
    }

    #[test]
    fn test_settled_payment_cannot_regress() {
        assert!(!is_legal_transition(Approved, Pending));
        assert!(!is_legal_transition(Approved, InMediation));
        assert!(!is_legal_transition(Approved, Approved));
    }
}
