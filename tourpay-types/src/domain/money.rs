//! Type-safe monetary value with embedded currency, plus the payment method codes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Currencies accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    BRL,
    USD,
    EUR,
    ARS,
    CLP,
    MXN,
}

impl Currency {
    /// Returns the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::CLP => 0,
            Currency::BRL | Currency::USD | Currency::EUR | Currency::ARS | Currency::MXN => 2,
        }
    }

    /// Returns the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BRL => "R$",
            Currency::USD | Currency::ARS | Currency::CLP | Currency::MXN => "$",
            Currency::EUR => "€",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::BRL => "BRL",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::ARS => "ARS",
            Currency::CLP => "CLP",
            Currency::MXN => "MXN",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Currency::BRL),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "ARS" => Ok(Currency::ARS),
            "CLP" => Ok(Currency::CLP),
            "MXN" => Ok(Currency::MXN),
            _ => Err(DomainError::UnsupportedCurrency(s.to_string())),
        }
    }
}

/// How the client pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Pix,
    Boleto,
    Pec,
}

impl PaymentMethod {
    /// Card methods carry card snapshot fields and go through the order API.
    pub fn is_card(&self) -> bool {
        matches!(self, PaymentMethod::CreditCard | PaymentMethod::DebitCard)
    }

    /// Cash-ticket methods settle asynchronously after the client pays the slip.
    pub fn is_ticket(&self) -> bool {
        matches!(self, PaymentMethod::Boleto | PaymentMethod::Pec)
    }

    /// Wire code used by the gateway and the storage layer.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Boleto => "boleto",
            PaymentMethod::Pec => "pec",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit card",
            PaymentMethod::DebitCard => "Debit card",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Boleto => "Boleto",
            PaymentMethod::Pec => "Lottery payment slip (PEC)",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "pix" => Ok(PaymentMethod::Pix),
            "boleto" => Ok(PaymentMethod::Boleto),
            "pec" => Ok(PaymentMethod::Pec),
            _ => Err(DomainError::UnsupportedPaymentMethod(s.to_string())),
        }
    }
}

/// Type-safe money representation with embedded currency.
///
/// The amount is a decimal bounded to the currency's minor-unit precision,
/// so `10.005 BRL` is rejected instead of being rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a positive Money value.
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount(amount));
        }
        Self::check_precision(amount, currency)?;
        Ok(Self { amount, currency })
    }

    /// Rejects amounts carrying more fractional digits than the currency allows.
    pub fn check_precision(amount: Decimal, currency: Currency) -> Result<(), DomainError> {
        if amount.normalize().scale() > currency.decimal_places() {
            return Err(DomainError::PrecisionExceeded { amount, currency });
        }
        Ok(())
    }

    /// Returns the decimal amount.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Checked addition - returns error if currencies don't match.
    pub fn checked_add(&self, other: Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                expected: self.currency,
                got: other.currency,
            });
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.currency.decimal_places() as usize;
        write!(
            f,
            "{}{:.*}",
            self.currency.symbol(),
            places,
            self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_creation() {
        let money = Money::new(dec!(150.50), Currency::BRL).unwrap();
        assert_eq!(money.amount(), dec!(150.50));
        assert_eq!(money.currency(), Currency::BRL);
    }

    #[test]
    fn test_non_positive_money_fails() {
        assert!(matches!(
            Money::new(dec!(-5), Currency::BRL),
            Err(DomainError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            Money::new(Decimal::ZERO, Currency::BRL),
            Err(DomainError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_precision_is_bounded_by_currency() {
        assert!(Money::new(dec!(10.00), Currency::BRL).is_ok());
        assert!(matches!(
            Money::new(dec!(10.005), Currency::BRL),
            Err(DomainError::PrecisionExceeded { .. })
        ));
        assert!(Money::new(dec!(1500), Currency::CLP).is_ok());
        assert!(Money::new(dec!(1500.5), Currency::CLP).is_err());
    }

    #[test]
    fn test_currency_mismatch() {
        let brl = Money::new(dec!(100), Currency::BRL).unwrap();
        let usd = Money::new(dec!(50), Currency::USD).unwrap();
        assert!(matches!(
            brl.checked_add(usd),
            Err(DomainError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_money_display() {
        let money = Money::new(dec!(10.5), Currency::BRL).unwrap();
        assert_eq!(money.to_string(), "R$10.50");
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!("brl".parse::<Currency>().unwrap(), Currency::BRL);
        assert!("XYZ".parse::<Currency>().is_err());
        assert_eq!(
            "debit_card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::DebitCard
        );
        assert!(matches!(
            "cash".parse::<PaymentMethod>(),
            Err(DomainError::UnsupportedPaymentMethod(_))
        ));
    }

    #[test]
    fn test_method_labels() {
        assert_eq!(PaymentMethod::Pix.display_label(), "PIX");
        assert!(PaymentMethod::CreditCard.is_card());
        assert!(!PaymentMethod::Pix.is_card());
        assert!(PaymentMethod::Pec.is_ticket());
    }
}
