//! QuickBite CLI - Drive a diner's cart against the QuickBite backend.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! qb-cli cart show
//!
//! # Add two large pizzas from a restaurant
//! qb-cli cart add --item m-42 --name "Margherita" --price 12.50 \
//!     --restaurant r-7 --restaurant-name "Slice House" -q 2 -c '{"size":"large"}'
//!
//! # Apply a coupon
//! qb-cli coupon apply SAVE10
//!
//! # Place the order
//! qb-cli checkout --address "12 Curry Lane" --payment upi
//!
//! # Price a saved cart without touching the backend
//! qb-cli quote cart.json
//! ```
//!
//! # Commands
//!
//! - `cart` - Show, add, update, remove, clear
//! - `coupon` - Apply or remove a coupon
//! - `pricing` - Fetch server-computed totals
//! - `checkout` - Place an order from the cart
//! - `quote` - Compute totals for a cart file offline

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickbite_client::{ClientConfig, ConfigError};

mod commands;

#[derive(Parser)]
#[command(name = "qb-cli")]
#[command(author, version, about = "QuickBite cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Apply or remove a coupon
    Coupon {
        #[command(subcommand)]
        action: CouponAction,
    },
    /// Fetch server-computed totals
    Pricing,
    /// Place an order from the current cart
    Checkout {
        /// Delivery address
        #[arg(short, long)]
        address: String,

        /// Payment method (`cod`, `card`, `upi`, `wallet`)
        #[arg(short, long, default_value = "cod")]
        payment: String,

        /// Notes for the restaurant
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Compute totals for a cart JSON file without the backend
    Quote {
        /// Path to a cart JSON file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add an item
    Add {
        /// Menu item ID
        #[arg(short, long)]
        item: String,

        /// Item name
        #[arg(short, long)]
        name: String,

        /// Unit price (e.g. 12.50)
        #[arg(short, long)]
        price: String,

        /// Restaurant ID
        #[arg(short, long)]
        restaurant: String,

        /// Restaurant name
        #[arg(long)]
        restaurant_name: String,

        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Customization as JSON (e.g. '{"size":"large"}')
        #[arg(short, long)]
        customization: Option<String>,

        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Set the quantity of a line (0 removes it)
    Update {
        /// Menu item ID
        item: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,

        /// Customization of the line, as added
        #[arg(short, long)]
        customization: Option<String>,
    },
    /// Remove a line
    Remove {
        /// Menu item ID
        item: String,

        /// Customization of the line, as added
        #[arg(short, long)]
        customization: Option<String>,
    },
    /// Remove everything
    Clear,
}

#[derive(Subcommand)]
enum CouponAction {
    /// Apply a coupon code
    Apply {
        /// Coupon code
        code: String,
    },
    /// Remove the applied coupon
    Remove,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Map tracing levels to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Offline commands still run without a backend URL
    let config = ClientConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quickbite_cli=info,quickbite_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(
    cli: Cli,
    config: Result<ClientConfig, ConfigError>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Quote { file } = &cli.command {
        commands::quote::run(file).await?;
        return Ok(());
    }

    let config = config?;
    let session = commands::connect(&config).await?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session).await,
            CartAction::Add {
                item,
                name,
                price,
                restaurant,
                restaurant_name,
                quantity,
                customization,
                image,
            } => {
                let line = commands::cart::NewLine {
                    item,
                    name,
                    price,
                    quantity,
                    customization,
                    image,
                };
                commands::cart::add(&session, line, &restaurant, &restaurant_name).await?;
            }
            CartAction::Update {
                item,
                quantity,
                customization,
            } => {
                commands::cart::update(&session, &item, quantity, customization.as_deref())
                    .await?;
            }
            CartAction::Remove {
                item,
                customization,
            } => commands::cart::remove(&session, &item, customization.as_deref()).await?,
            CartAction::Clear => commands::cart::clear(&session).await?,
        },
        Commands::Coupon { action } => match action {
            CouponAction::Apply { code } => commands::coupon::apply(&session, &code).await?,
            CouponAction::Remove => commands::coupon::remove(&session).await?,
        },
        Commands::Pricing => commands::cart::pricing(&session).await?,
        Commands::Checkout {
            address,
            payment,
            notes,
        } => commands::checkout::run(&session, address, &payment, notes).await?,
        Commands::Quote { .. } => {}
    }

    Ok(())
}
