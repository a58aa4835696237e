//! Tourpay CLI
//!
//! Command-line interface for the tour payments API.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use tourpay_client::PaymentsClient;
use tourpay_types::{
    AuthorizeCardPaymentRequest, ClientId, CompanyId, CreatePaymentRequest, Currency, Payer,
    PaymentId, PaymentMethod, PixPaymentRequest, RefundRequest, TicketPaymentRequest,
    UpdatePaymentRequest,
};

#[derive(Parser)]
#[command(name = "tourpay")]
#[command(author, version, about = "Tour payments API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the payments API
    #[arg(long, env = "TOURPAY_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Check API health
    Health,
}

/// Who pays and for what; shared by every command that creates a payment.
#[derive(Args)]
struct Owner {
    /// Client ID (UUID)
    #[arg(long)]
    client: ClientId,
    /// Company ID (UUID)
    #[arg(long)]
    company: CompanyId,
    /// Amount in major units, e.g. 150.00
    #[arg(long)]
    amount: Decimal,
    #[arg(long, default_value = "BRL")]
    currency: Currency,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Register a pending payment (no gateway call)
    Create {
        #[command(flatten)]
        owner: Owner,
        /// credit_card, debit_card, pix, boleto or pec
        #[arg(long)]
        method: PaymentMethod,
        #[arg(long, default_value_t = 1)]
        installments: u8,
    },
    /// Authorize a card payment
    Authorize {
        #[command(flatten)]
        owner: Owner,
        /// Retry an existing local payment
        #[arg(long)]
        payment: Option<PaymentId>,
        #[arg(long, default_value = "credit_card")]
        method: PaymentMethod,
        #[arg(long, default_value_t = 1)]
        installments: u8,
        /// Card token from the gateway's client-side SDK
        #[arg(long)]
        token: String,
        #[arg(long)]
        issuer: Option<String>,
        #[arg(long)]
        email: String,
        /// Only reserve the funds; capture later
        #[arg(long)]
        manual_capture: bool,
    },
    /// Start a PIX payment and print the QR payload
    Pix {
        #[command(flatten)]
        owner: Owner,
        #[arg(long)]
        payment: Option<PaymentId>,
        #[arg(long)]
        email: String,
    },
    /// Start a boleto or pec payment
    Ticket {
        #[command(flatten)]
        owner: Owner,
        #[arg(long)]
        payment: Option<PaymentId>,
        #[arg(long, default_value = "boleto")]
        method: PaymentMethod,
        #[arg(long)]
        email: String,
    },
    /// Get payment details
    Get { id: PaymentId },
    /// Edit a payment before it reaches the gateway
    Update {
        id: PaymentId,
        #[arg(long)]
        installments: Option<u8>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        cardholder_name: Option<String>,
    },
    /// Capture an authorized payment
    Capture { id: PaymentId },
    /// Cancel a payment that has not settled
    Cancel { id: PaymentId },
    /// Refund a settled payment (everything left when no amount is given)
    Refund {
        id: PaymentId,
        #[arg(long)]
        amount: Option<Decimal>,
    },
    /// Re-read the payment status from the gateway
    Sync { id: PaymentId },
    /// List payments of a client or a company
    List {
        #[arg(long, conflicts_with = "company", required_unless_present = "company")]
        client: Option<ClientId>,
        #[arg(long)]
        company: Option<CompanyId>,
    },
}

fn payer(email: String) -> Payer {
    Payer {
        email,
        first_name: None,
        last_name: None,
        identification: None,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = PaymentsClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                owner,
                method,
                installments,
            } => {
                let payment = client
                    .create_payment(&CreatePaymentRequest {
                        client_id: owner.client,
                        company_id: owner.company,
                        amount: owner.amount,
                        currency: owner.currency,
                        payment_method: method,
                        installment_count: installments,
                        description: owner.description,
                    })
                    .await?;
                print_json(&payment)?;
            }
            PaymentCommands::Authorize {
                owner,
                payment,
                method,
                installments,
                token,
                issuer,
                email,
                manual_capture,
            } => {
                let payment = client
                    .authorize_card_payment(&AuthorizeCardPaymentRequest {
                        payment_id: payment,
                        client_id: owner.client,
                        company_id: owner.company,
                        amount: owner.amount,
                        currency: owner.currency,
                        payment_method: method,
                        installment_count: installments,
                        card_token: token,
                        issuer_id: issuer,
                        payer: payer(email),
                        items: vec![],
                        description: owner.description,
                        capture: !manual_capture,
                    })
                    .await?;
                print_json(&payment)?;
            }
            PaymentCommands::Pix {
                owner,
                payment,
                email,
            } => {
                let checkout = client
                    .start_pix_payment(&PixPaymentRequest {
                        payment_id: payment,
                        client_id: owner.client,
                        company_id: owner.company,
                        amount: owner.amount,
                        currency: owner.currency,
                        payer: payer(email),
                        description: owner.description,
                    })
                    .await?;
                print_json(&checkout)?;
            }
            PaymentCommands::Ticket {
                owner,
                payment,
                method,
                email,
            } => {
                let payment = client
                    .start_ticket_payment(&TicketPaymentRequest {
                        payment_id: payment,
                        client_id: owner.client,
                        company_id: owner.company,
                        amount: owner.amount,
                        currency: owner.currency,
                        payment_method: method,
                        payer: payer(email),
                        description: owner.description,
                    })
                    .await?;
                print_json(&payment)?;
            }
            PaymentCommands::Get { id } => print_json(&client.get_payment(id).await?)?,
            PaymentCommands::Update {
                id,
                installments,
                description,
                cardholder_name,
            } => {
                let patch = UpdatePaymentRequest {
                    installment_count: installments,
                    description,
                    cardholder_name,
                };
                if patch.is_empty() {
                    anyhow::bail!(
                        "nothing to update: pass --installments, --description or --cardholder-name"
                    );
                }
                print_json(&client.update_payment(id, &patch).await?)?;
            }
            PaymentCommands::Capture { id } => print_json(&client.capture(id).await?)?,
            PaymentCommands::Cancel { id } => print_json(&client.cancel(id).await?)?,
            PaymentCommands::Refund { id, amount } => {
                print_json(&client.refund(id, &RefundRequest { amount }).await?)?
            }
            PaymentCommands::Sync { id } => print_json(&client.sync_status(id).await?)?,
            PaymentCommands::List { client: owner, company } => {
                let payments = match (owner, company) {
                    (Some(client_id), _) => client.list_client_payments(client_id).await?,
                    (None, Some(company_id)) => client.list_company_payments(company_id).await?,
                    (None, None) => anyhow::bail!("pass --client or --company"),
                };
                print_json(&payments)?;
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_refund_with_amount() {
        let cli = Cli::try_parse_from([
            "tourpay",
            "payment",
            "refund",
            "5b0f5c1e-7d4e-4c4a-9a57-1c1d0e1f2a3b",
            "--amount",
            "49.90",
        ])
        .unwrap();
        match cli.command {
            Commands::Payment {
                action: PaymentCommands::Refund { amount, .. },
            } => assert_eq!(amount, Some(Decimal::new(4990, 2))),
            _ => panic!("expected refund command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_method() {
        let result = Cli::try_parse_from([
            "tourpay",
            "payment",
            "create",
            "--client",
            "5b0f5c1e-7d4e-4c4a-9a57-1c1d0e1f2a3b",
            "--company",
            "9c7a8e6d-2b1f-4e3a-8c9d-0a1b2c3d4e5f",
            "--amount",
            "10.00",
            "--method",
            "bitcoin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_requires_an_owner() {
        assert!(Cli::try_parse_from(["tourpay", "payment", "list"]).is_err());
    }
}
