//! Landscape Supply CLI - Database migrations and pricing tools.
//!
//! # Usage
//!
//! ```bash
//! # Run catalog database migrations
//! ls-cli migrate
//!
//! # Price a cart for a contractor delivering to 89052
//! ls-cli quote --tier contractor --zip 89052 \
//!     0b0f3c9e-6a8e-4a57-9a43-2f1f3d9f8f11:3 5e1a7d44-91c2-4f0b-8d6e-3c9a0b7e2f55:1
//!
//! # Check which products can be delivered to a zip code
//! ls-cli availability --zip 89052 0b0f3c9e-6a8e-4a57-9a43-2f1f3d9f8f11
//!
//! # List active delivery groups
//! ls-cli delivery-groups
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `quote` - Compute checkout totals for a cart
//! - `availability` - Check per-zip availability
//! - `delivery-groups` - List active delivery groups

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use landscape_supply_core::{AccountTier, ProductId, UserId, ZipCode};

mod commands;

#[derive(Parser)]
#[command(name = "ls-cli")]
#[command(author, version, about = "Landscape Supply CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Compute subtotal, delivery fee, tax and total for a cart
    Quote {
        /// Account tier (`retail`, `contractor`, `wholesale`)
        #[arg(short, long, conflicts_with = "user")]
        tier: Option<AccountTier>,

        /// Look the tier up from this user's profile instead
        #[arg(short, long)]
        user: Option<UserId>,

        /// Delivery zip code (enables zip restrictions and fee overrides)
        #[arg(short, long)]
        zip: Option<ZipCode>,

        /// Cart lines as `<product_id>:<quantity>`
        #[arg(required = true, value_parser = commands::quote::parse_line)]
        lines: Vec<landscape_supply_core::CartLine>,
    },
    /// Check product availability at a zip code
    Availability {
        /// Delivery zip code
        #[arg(short, long)]
        zip: ZipCode,

        /// Product IDs to check
        #[arg(required = true)]
        products: Vec<ProductId>,
    },
    /// List active delivery groups, cheapest first
    DeliveryGroups,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "landscape_supply_cli=info,landscape_supply_storefront=info".into());

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

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
        Commands::Quote {
            tier,
            user,
            zip,
            lines,
        } => commands::quote::quote(&lines, tier, user, zip.as_ref()).await?,
        Commands::Availability { zip, products } => {
            commands::quote::availability(&products, &zip).await?;
        }
        Commands::DeliveryGroups => commands::quote::delivery_groups().await?,
    }
    Ok(())
}
