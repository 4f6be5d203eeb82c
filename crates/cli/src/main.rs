//! Atelier CLI - database migrations and store management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! atelier-cli migrate
//!
//! # Load the demo catalog, orders, promos, certificates and admin account
//! atelier-cli seed
//!
//! # Create a customer account
//! atelier-cli user create -e jane@example.com -n "Jane Doe" -p hunter22
//!
//! # Add a promo code
//! atelier-cli promo create SPRING25 --discount 25
//! ```
//!
//! All commands read `DATABASE_URL` (a `.env` file is honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "atelier-cli")]
#[command(author, version, about = "Atelier CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert fixture data, skipping records that already exist
    Seed,
    /// Manage customer accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage promo codes
    Promo {
        #[command(subcommand)]
        action: PromoAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Plaintext password (stored hashed)
        #[arg(short, long)]
        password: String,

        /// Phone number
        #[arg(long, default_value = "")]
        phone: String,
    },
}

#[derive(Subcommand)]
enum PromoAction {
    /// Create a promo code
    Create {
        /// Code customers type at checkout
        name: String,

        /// Percentage taken off the order
        #[arg(short, long)]
        discount: Decimal,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "atelier_cli=info,atelier_server=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
                phone,
            } => {
                commands::manage::create_user(&email, &name, &password, &phone).await?;
            }
        },
        Commands::Promo { action } => match action {
            PromoAction::Create { name, discount } => {
                commands::manage::create_promo(&name, discount).await?;
            }
        },
    }
    Ok(())
}
