//! Payment status codes and the gateway status lookup table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Lifecycle status of a Payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Authorized,
    InProcess,
    InMediation,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 9] = [
        PaymentStatus::Pending,
        PaymentStatus::Approved,
        PaymentStatus::Authorized,
        PaymentStatus::InProcess,
        PaymentStatus::InMediation,
        PaymentStatus::Rejected,
        PaymentStatus::Cancelled,
        PaymentStatus::Refunded,
        PaymentStatus::ChargedBack,
    ];

    /// Storage and API code.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::InProcess => "in_process",
            PaymentStatus::InMediation => "in_mediation",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::ChargedBack => "charged_back",
        }
    }

    /// Terminal statuses have no outgoing edges.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Rejected
                | PaymentStatus::Cancelled
                | PaymentStatus::Refunded
                | PaymentStatus::ChargedBack
        )
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Approved => "Approved",
            PaymentStatus::Authorized => "Authorized",
            PaymentStatus::InProcess => "In process",
            PaymentStatus::InMediation => "In mediation",
            PaymentStatus::Rejected => "Rejected",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::Refunded => "Refunded",
            PaymentStatus::ChargedBack => "Charged back",
        }
    }

    /// Maps a status string reported by the gateway to an internal status.
    ///
    /// Covers both payment-level and order-level vocabularies. Anything not in
    /// the table is treated as `InProcess`: a provisional state that can still
    /// settle either way, never a terminal one.
    pub fn from_gateway(raw: &str) -> PaymentStatus {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "created" | "action_required" => PaymentStatus::Pending,
            "approved" | "processed" | "accredited" => PaymentStatus::Approved,
            "authorized" => PaymentStatus::Authorized,
            "in_process" | "processing" => PaymentStatus::InProcess,
            "in_mediation" => PaymentStatus::InMediation,
            "rejected" | "failed" => PaymentStatus::Rejected,
            "cancelled" | "canceled" | "expired" => PaymentStatus::Cancelled,
            "refunded" => PaymentStatus::Refunded,
            "charged_back" => PaymentStatus::ChargedBack,
            other => {
                tracing::warn!(
                    gateway_status = other,
                    "unrecognized gateway status, treating as in_process"
                );
                PaymentStatus::InProcess
            }
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_roundtrip() {
        for status in PaymentStatus::ALL {
            assert_eq!(status.code().parse::<PaymentStatus>().unwrap(), status);
        }
        assert!("settled".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_gateway_lookup_table() {
        assert_eq!(PaymentStatus::from_gateway("approved"), PaymentStatus::Approved);
        assert_eq!(PaymentStatus::from_gateway("canceled"), PaymentStatus::Cancelled);
        assert_eq!(PaymentStatus::from_gateway("processed"), PaymentStatus::Approved);
        assert_eq!(
            PaymentStatus::from_gateway("in_mediation"),
            PaymentStatus::InMediation
        );
        assert_eq!(PaymentStatus::from_gateway("AUTHORIZED"), PaymentStatus::Authorized);
    }

    #[test]
    fn test_unknown_gateway_status_is_provisional() {
        let status = PaymentStatus::from_gateway("waiting_for_godot");
        assert_eq!(status, PaymentStatus::InProcess);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(PaymentStatus::ChargedBack.display_label(), "Charged back");
        assert_eq!(PaymentStatus::InProcess.display_label(), "In process");
    }
}
