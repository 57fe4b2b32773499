//! Operator commands.
//!
//! # Usage
//!
//! ```bash
//! # Print the order list
//! shopfront admin orders
//!
//! # Move an order to its next status
//! shopfront admin advance o12
//!
//! # Refresh every SHOPFRONT_POLL_INTERVAL_SECS until Ctrl-C
//! shopfront admin watch
//!
//! # Create a product, then edit its stock
//! shopfront admin product save -n "Pixel 8" -c Phones -p 699.00 -s 12
//! shopfront admin product save --id p4 -s 0
//! ```

use std::sync::Arc;

use clap::Subcommand;
use rust_decimal::Decimal;
use shopfront_admin::{
    AdminConfig, OrderBoard, OrdersConsole, ProductForm, ProductsConsole, available_action,
    start_polling,
};
use shopfront_api::{DataApi, RestClient};
use shopfront_core::{OrderId, Price, ProductId};

use super::CliError;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Print every order, newest first
    Orders,
    /// Move an order to its next status
    Advance { order_id: String },
    /// Re-print the order list on every poll until Ctrl-C
    Watch,
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// Create a product, or edit one with `--id`
    Save {
        /// Product to edit; omitted fields keep their current value
        #[arg(long)]
        id: Option<String>,

        #[arg(short, long)]
        name: Option<String>,

        /// Category name
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        price: Option<Decimal>,

        #[arg(short, long)]
        stock: Option<u32>,

        #[arg(short, long)]
        description: Option<String>,

        /// Image URL
        #[arg(short, long)]
        image: Option<String>,
    },
    /// Delete a product
    Delete { id: String },
}

/// Run an operator command.
///
/// # Errors
///
/// Returns the first failure. `watch` only fails if the client cannot be
/// built; refresh failures are shown and polling continues.
pub async fn run(action: AdminAction, config: AdminConfig) -> Result<(), CliError> {
    let api: Arc<dyn DataApi> = Arc::new(RestClient::new(&config.api)?);

    match action {
        AdminAction::Orders => {
            let console = OrdersConsole::new(api);
            console.refresh().await?;
            print_board(&console.board());
            Ok(())
        }
        AdminAction::Advance { order_id } => advance(OrdersConsole::new(api), order_id).await,
        AdminAction::Watch => watch(OrdersConsole::new(api), &config).await,
        AdminAction::Product { action } => product(ProductsConsole::new(api), action).await,
    }
}

#[allow(clippy::print_stdout)]
async fn advance(console: OrdersConsole, order_id: String) -> Result<(), CliError> {
    console.refresh().await?;
    let updated = console.advance(&OrderId::new(order_id)).await?;
    println!("Order {} is now {}", updated.id, updated.status);
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn watch(console: OrdersConsole, config: &AdminConfig) -> Result<(), CliError> {
    let mut board = console.subscribe();
    let handle = start_polling(console, config.poll_interval);
    tracing::info!(interval = ?config.poll_interval, "Watching orders, Ctrl-C to stop");

    loop {
        tokio::select! {
            changed = board.changed() => {
                if changed.is_err() {
                    break;
                }
                print_board(&board.borrow_and_update());
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    handle.cancel();
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn product(mut console: ProductsConsole, action: ProductAction) -> Result<(), CliError> {
    console.load().await?;

    match action {
        ProductAction::Save {
            id,
            name,
            category,
            price,
            stock,
            description,
            image,
        } => {
            let id = id.map(ProductId::new);
            let mut form = match &id {
                Some(id) => console
                    .products()
                    .iter()
                    .find(|p| &p.id == id)
                    .map(ProductForm::from_product)
                    .ok_or_else(|| CliError::InvalidArgument(format!("unknown product: {id}")))?,
                None => ProductForm::default(),
            };

            if let Some(name) = name {
                form.name = name;
            }
            if let Some(category) = category {
                form.category = category;
            }
            if let Some(price) = price {
                form.price = Price::new(price);
            }
            if let Some(stock) = stock {
                form.stock = stock;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(image) = image {
                form.image = image;
            }

            let saved = console.save_product(id.as_ref(), form).await?;
            println!("Saved {} ({}, {})", saved.id, saved.name, saved.price);
        }
        ProductAction::Delete { id } => {
            let id = ProductId::new(id);
            console.delete_product(&id).await?;
            println!("Deleted {id}");
        }
    }

    println!("{} products", console.products().len());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_board(board: &OrderBoard) {
    if let Some(error) = &board.last_error {
        println!("! {error}");
    }
    if !board.loaded {
        return;
    }

    let counts: Vec<String> = board
        .counts()
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect();
    println!("{} orders ({})", board.orders.len(), counts.join(", "));

    for order in &board.orders {
        let action = available_action(order).map_or_else(String::new, |next| format!("-> {next}"));
        println!(
            "  {:<12} {}  {:<12} {:<11} {:>10}  {action}",
            order.id,
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.user_id,
            order.status,
            order.total
        );
    }
}
