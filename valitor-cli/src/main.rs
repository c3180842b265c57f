//! Command-line driver for the Valitor gateways.
//!
//! # Usage
//!
//! ```bash
//! # Issue a virtual card number through the corporate payments service
//! valitor corporate virtual-number --number 5304259906522887 --exp-month 11 --exp-year 30 --cvc 749
//!
//! # Charge a virtual card through the pay API
//! valitor pay virtual-card-payment --virtual-number 4999993986001010 \
//!     --amount 1000 --currency ISK --reference order-1
//!
//! # Use another configuration file and log request bodies
//! CONFIG=/etc/valitor.toml RUST_LOG=debug valitor --log-payloads pay dcc ...
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to the TOML configuration file (default: `valitor.toml`)
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use valitor::pay::{CardPayment, CardVerification, VirtualCardOptions, VirtualCardPayment};
use valitor::Card;
use valitor_cli::config::{CliConfig, DEFAULT_CONFIG_PATH};
use valitor_http::{corporate_client, pay_client};

#[derive(Parser)]
#[command(name = "valitor")]
#[command(about = "Drive the Valitor corporate payments and pay gateways", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log request and response bodies at debug level
    #[arg(long)]
    log_payloads: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Corporate payments (SOAP) operations
    #[command(subcommand)]
    Corporate(CorporateCommand),

    /// Pay API (JSON) operations
    #[command(subcommand)]
    Pay(PayCommand),
}

#[derive(Args)]
struct CardArgs {
    /// Card number
    #[arg(long, default_value = "")]
    number: String,

    /// Expiry month, 1-12
    #[arg(long)]
    exp_month: Option<u8>,

    /// Expiry year, two or four digits
    #[arg(long)]
    exp_year: Option<u16>,

    /// Card security code
    #[arg(long, default_value = "")]
    cvc: String,

    /// Virtual card number issued by the gateway
    #[arg(long)]
    virtual_number: Option<String>,

    /// Treat the card as a test card and send the request to UAT
    #[arg(long)]
    test: bool,
}

impl CardArgs {
    fn card(&self) -> Card {
        Card {
            number: self.number.clone(),
            exp_month: self.exp_month,
            exp_year: self.exp_year,
            cvc: self.cvc.clone(),
            virtual_number: self.virtual_number.clone(),
            test: self.test,
        }
    }
}

#[derive(Args)]
struct ChargeArgs {
    #[command(flatten)]
    card: CardArgs,

    /// Amount in minor units
    #[arg(long, default_value_t = 0)]
    amount: u64,

    /// ISO 4217 currency code
    #[arg(long, default_value = "")]
    currency: String,
}

#[derive(Subcommand)]
enum CorporateCommand {
    /// Issue a virtual card number
    VirtualNumber(CardArgs),
    /// Authorize and capture an amount
    Authorize(ChargeArgs),
    /// Authorize an amount without capturing it
    AuthorizeOnly(ChargeArgs),
    /// Capture a previous authorization
    UseAuthorization {
        #[command(flatten)]
        card: CardArgs,
        /// Authorization (transaction) number
        #[arg(long, default_value = "")]
        authorization_number: String,
    },
    /// Refund an amount
    Refund(ChargeArgs),
    /// Invalidate a transaction
    Invalidate {
        #[command(flatten)]
        card: CardArgs,
        /// ISO 4217 currency code
        #[arg(long, default_value = "")]
        currency: String,
        /// Authorization (transaction) number
        #[arg(long, default_value = "")]
        authorization_number: String,
    },
    /// Update the expiry date behind a virtual number
    UpdateExpiration(CardArgs),
    /// Look up the last four digits behind a virtual number
    LastFourDigits(CardArgs),
}

#[derive(Subcommand)]
enum PayCommand {
    /// Store a card and receive a virtual card number
    CreateVirtualCard {
        #[command(flatten)]
        card: CardArgs,
        /// Intended use of the stored card
        #[arg(long, default_value = "CardholderInitiatedCredentialOnFile")]
        subsequent_transaction_type: String,
        /// Transaction channel
        #[arg(long, default_value = "ECommerceWithCvc")]
        transaction_type: String,
        /// Lifecycle id to send instead of a generated one
        #[arg(long)]
        lifecycle_id: Option<String>,
    },
    /// Update the expiry date of a virtual card
    UpdateExpirationDate {
        #[command(flatten)]
        card: CardArgs,
        /// Transaction channel
        #[arg(long, default_value = "ECommerceWithCvc")]
        transaction_type: String,
    },
    /// Charge a card
    CardPayment {
        #[command(flatten)]
        charge: ChargeArgs,
        /// Payment operation
        #[arg(long, default_value = "Sale")]
        operation: String,
        /// Transaction channel
        #[arg(long, default_value = "ECommerceWithCvc")]
        transaction_type: String,
        /// Merchant reference
        #[arg(long, default_value = "")]
        reference: String,
    },
    /// Charge a virtual card
    VirtualCardPayment {
        #[command(flatten)]
        charge: ChargeArgs,
        /// Payment operation
        #[arg(long, default_value = "Sale")]
        operation: String,
        /// Merchant reference
        #[arg(long, default_value = "")]
        reference: String,
        /// Reason for a merchant-initiated payment
        #[arg(long)]
        initiation_reason: Option<String>,
    },
    /// Request a dynamic currency conversion offer
    Dcc(ChargeArgs),
    /// Start 3-D Secure card verification
    CardVerification {
        #[command(flatten)]
        charge: ChargeArgs,
        /// Card brand
        #[arg(long, default_value = "")]
        card_type: String,
        /// Cardholder device type
        #[arg(long, default_value = "Browser")]
        device_type: String,
        /// Redirect target after successful verification
        #[arg(long, default_value = "")]
        success_url: String,
        /// Redirect target after failed verification
        #[arg(long, default_value = "")]
        failed_url: String,
        /// Data echoed back to the redirect targets
        #[arg(long, default_value = "")]
        merchant_data: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("valitor failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::load_from(&cli.config)?;
    tracing::debug!(path = %cli.config.display(), "loaded configuration");

    match cli.command {
        Command::Corporate(command) => {
            let mut settings = config.corporate()?;
            settings.log_payloads |= cli.log_payloads;
            run_corporate(command, settings).await
        }
        Command::Pay(command) => {
            let mut settings = config.pay()?;
            settings.log_payloads |= cli.log_payloads;
            run_pay(command, settings).await
        }
    }
}

async fn run_corporate(
    command: CorporateCommand,
    settings: valitor::CorporateSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = corporate_client(settings);
    match command {
        CorporateCommand::VirtualNumber(card) => {
            let virtual_number = client.virtual_number(&card.card()).await?;
            emit(&json!({ "virtualNumber": virtual_number }))
        }
        CorporateCommand::Authorize(charge) => {
            let receipt = client
                .authorize(&charge.card.card(), charge.amount, &charge.currency)
                .await?;
            emit(&receipt)
        }
        CorporateCommand::AuthorizeOnly(charge) => {
            let receipt = client
                .authorize_only(&charge.card.card(), charge.amount, &charge.currency)
                .await?;
            emit(&receipt)
        }
        CorporateCommand::UseAuthorization {
            card,
            authorization_number,
        } => {
            client
                .use_authorization(&card.card(), &authorization_number)
                .await?;
            emit(&json!({ "ok": true }))
        }
        CorporateCommand::Refund(charge) => {
            let receipt = client
                .refund(&charge.card.card(), charge.amount, &charge.currency)
                .await?;
            emit(&receipt)
        }
        CorporateCommand::Invalidate {
            card,
            currency,
            authorization_number,
        } => {
            let receipt = client
                .invalidate(&card.card(), &currency, &authorization_number)
                .await?;
            emit(&receipt)
        }
        CorporateCommand::UpdateExpiration(card) => {
            client.update_expiration(&card.card()).await?;
            emit(&json!({ "ok": true }))
        }
        CorporateCommand::LastFourDigits(card) => {
            let last_four = client.last_four_digits(&card.card()).await?;
            emit(&json!({ "lastFourDigits": last_four }))
        }
    }
}

async fn run_pay(
    command: PayCommand,
    settings: valitor::PaySettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = pay_client(settings);
    match command {
        PayCommand::CreateVirtualCard {
            card,
            subsequent_transaction_type,
            transaction_type,
            lifecycle_id,
        } => {
            let mut options = VirtualCardOptions::new(subsequent_transaction_type, transaction_type);
            options.transaction_lifecycle_id = lifecycle_id;
            emit(&client.create_virtual_card(&card.card(), &options).await?)
        }
        PayCommand::UpdateExpirationDate {
            card,
            transaction_type,
        } => emit(
            &client
                .update_expiration_date(&card.card(), &transaction_type, None)
                .await?,
        ),
        PayCommand::CardPayment {
            charge,
            operation,
            transaction_type,
            reference,
        } => {
            let payment = CardPayment {
                operation,
                transaction_type,
                amount: charge.amount,
                currency: charge.currency,
                reference_number: reference,
                ..CardPayment::default()
            };
            emit(&client.card_payment(&charge.card.card(), &payment).await?)
        }
        PayCommand::VirtualCardPayment {
            charge,
            operation,
            reference,
            initiation_reason,
        } => {
            let payment = VirtualCardPayment {
                operation,
                amount: charge.amount,
                currency: charge.currency,
                reference_number: reference,
                initiation_reason,
            };
            emit(
                &client
                    .virtual_card_payment(&charge.card.card(), &payment)
                    .await?,
            )
        }
        PayCommand::Dcc(charge) => emit(
            &client
                .dcc_offer(&charge.card.card(), charge.amount, &charge.currency)
                .await?,
        ),
        PayCommand::CardVerification {
            charge,
            card_type,
            device_type,
            success_url,
            failed_url,
            merchant_data,
        } => {
            let verification = CardVerification {
                card_type,
                cardholder_device_type: device_type,
                amount: charge.amount,
                currency: charge.currency,
                authorization_success_url: success_url,
                authorization_failed_url: failed_url,
                merchant_data,
            };
            emit(
                &client
                    .card_verification(&charge.card.card(), &verification)
                    .await?,
            )
        }
    }
}

#[allow(clippy::print_stdout)]
fn emit(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
