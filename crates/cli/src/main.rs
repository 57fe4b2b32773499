//! Shopfront CLI - storefront session and admin console from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shopfront catalog --search pixel --category Phones --sort price-asc
//!
//! # Place an order as the configured identity
//! shopfront checkout p1:2 p3 --address 1741348800000
//!
//! # Advance an order to its next status
//! shopfront admin advance o12
//!
//! # Follow the order list until Ctrl-C
//! shopfront admin watch
//! ```
//!
//! # Commands
//!
//! - `catalog` - List products with search, category and sort options
//! - `checkout` - Fill a cart and place an order
//! - `address add` - Add a delivery address to the profile
//! - `wishlist toggle` - Add or remove a product from the wishlist
//! - `dashboard` - Show the profile, wishlist and order history
//! - `admin orders|advance|watch|product` - Operator console
//!
//! Signed-in commands use the identity from `SHOPFRONT_IDENTITY_*`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_admin::AdminConfig;
use shopfront_storefront::config::StorefrontConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;
use commands::admin::AdminAction;
use commands::storefront::StorefrontCommand;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront and admin console")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Storefront(StorefrontCommand),
    /// Operator console
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(dsn: Option<&str>) -> Option<sentry::ClientInitGuard> {
    let guard = sentry::init((
        dsn?,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the subscriber; output goes to stderr so stdout stays clean.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "shopfront=info,shopfront_storefront=info,shopfront_admin=info,shopfront_api=warn".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Storefront(command) => match StorefrontConfig::from_env() {
            Ok(config) => {
                // Sentry must be initialized before the tracing subscriber
                let _sentry_guard = init_sentry(config.sentry_dsn.as_deref());
                init_tracing();
                commands::storefront::run(command, config).await
            }
            Err(e) => Err(CliError::from(e)),
        },
        Command::Admin { action } => match AdminConfig::from_env() {
            Ok(config) => {
                let _sentry_guard = init_sentry(config.sentry_dsn.as_deref());
                init_tracing();
                commands::admin::run(action, config).await
            }
            Err(e) => Err(CliError::from(e)),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::report_failure(&e);
            ExitCode::FAILURE
        }
    }
}
