//! Storefront commands.
//!
//! Each command opens a fresh [`Session`] against the configured data store.
//! Commands that need a profile sign in with the preset identity first.
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_API_URL` - Base URL of the REST data store
//! - `SHOPFRONT_IDENTITY_ID` - Subject id used for signed-in commands

use std::str::FromStr;
use std::sync::Arc;

use clap::Subcommand;
use shopfront_api::RestClient;
use shopfront_core::{AddressId, NewAddress, Product, ProductId, WishlistChange};
use shopfront_storefront::catalog::{CatalogQuery, SortKey};
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::{AppError, CartStore, PresetIdentityProvider, Session};

use super::CliError;

#[derive(Subcommand)]
pub enum StorefrontCommand {
    /// List the catalog
    Catalog {
        /// Case-insensitive substring of the product name
        #[arg(short, long, default_value = "")]
        search: String,

        /// Category name, or "all"
        #[arg(short, long, default_value = "all")]
        category: String,

        /// Sort order (`name`, `price-asc`, `price-desc`)
        #[arg(long, default_value = "name")]
        sort: SortKey,
    },
    /// Fill a cart and place an order
    Checkout {
        /// Cart items as `product_id[:quantity]`
        #[arg(required = true)]
        items: Vec<CartItem>,

        /// Delivery address id from the profile
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Manage delivery addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Show the profile, wishlist and order history
    Dashboard,
}

#[derive(Subcommand)]
pub enum AddressAction {
    /// Add a delivery address to the profile
    Add {
        /// Short name, e.g. "Home"
        #[arg(short, long)]
        label: String,

        #[arg(long)]
        street: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        state: String,

        #[arg(long)]
        zip: String,

        #[arg(long)]
        country: String,
    },
}

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Add the product if absent, remove it if present
    Toggle { product_id: String },
    /// Remove the product
    Remove { product_id: String },
}

/// A `product_id[:quantity]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl FromStr for CartItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = match s.split_once(':') {
            Some((id, qty)) => {
                let quantity = qty
                    .parse::<u32>()
                    .map_err(|_| format!("invalid quantity in {s:?}"))?;
                (id, quantity)
            }
            None => (s, 1),
        };

        if id.is_empty() {
            return Err(format!("missing product id in {s:?}"));
        }
        if quantity == 0 {
            return Err(format!("quantity must be at least 1 in {s:?}"));
        }

        Ok(Self {
            product_id: ProductId::new(id),
            quantity,
        })
    }
}

/// Run a storefront command.
///
/// # Errors
///
/// Returns the first failure; nothing is retried.
pub async fn run(command: StorefrontCommand, config: StorefrontConfig) -> Result<(), CliError> {
    let session = open_session(&config)?;

    match command {
        StorefrontCommand::Catalog {
            search,
            category,
            sort,
        } => catalog(&session, search, &category, sort).await,
        StorefrontCommand::Checkout { items, address } => {
            checkout(session, &items, address.map(AddressId::new)).await
        }
        StorefrontCommand::Address { action } => match action {
            AddressAction::Add {
                label,
                street,
                city,
                state,
                zip,
                country,
            } => {
                let address = NewAddress {
                    label,
                    street,
                    city,
                    state,
                    zip_code: zip,
                    country,
                };
                add_address(&session, address).await
            }
        },
        StorefrontCommand::Wishlist { action } => wishlist(&session, action).await,
        StorefrontCommand::Dashboard => dashboard(&session).await,
    }
}

fn open_session(config: &StorefrontConfig) -> Result<Session, CliError> {
    let api = RestClient::new(&config.api)?;
    let provider = PresetIdentityProvider::new(config.identity.clone());
    Ok(Session::new(Arc::new(api), Arc::new(provider)))
}

#[allow(clippy::print_stdout)]
async fn catalog(
    session: &Session,
    search: String,
    category: &str,
    sort: SortKey,
) -> Result<(), CliError> {
    let catalog = session.load_catalog().await?;
    let query = CatalogQuery::new()
        .search(search)
        .category(category)
        .sort(sort);

    println!("Categories: {}", catalog.category_names().join(", "));
    for product in catalog.query(&query) {
        let stock = if product.is_purchasable() {
            format!("{} in stock", product.stock)
        } else {
            "out of stock".to_string()
        };
        println!(
            "{:<12} {:<32} {:<16} {:>10}  {stock}",
            product.id, product.name, product.category, product.price
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn checkout(
    mut session: Session,
    items: &[CartItem],
    address: Option<AddressId>,
) -> Result<(), CliError> {
    session.binding().sign_in().await?;
    let catalog = session.load_catalog().await?;
    fill_cart(session.cart_mut(), &catalog.products, items)?;

    for line in session.cart().lines() {
        println!("{:>4} x {:<32} {:>10}", line.quantity, line.name, line.subtotal());
    }

    let placed = session.place_order(address.as_ref()).await?;
    println!(
        "Order {} placed: {} items, total {} ({})",
        placed.order.id,
        placed.order.item_count(),
        placed.order.total,
        placed.order.status
    );
    Ok(())
}

/// Add each item to the cart once, then set the line to its full quantity.
///
/// Repeated ids accumulate, saturating at `u32::MAX`.
fn fill_cart(
    cart: &mut CartStore,
    products: &[Product],
    items: &[CartItem],
) -> Result<(), CliError> {
    for item in items {
        let product = products
            .iter()
            .find(|p| p.id == item.product_id)
            .ok_or_else(|| {
                CliError::InvalidArgument(format!("unknown product: {}", item.product_id))
            })?;

        let added = cart.add_to_cart(product).map_err(AppError::from)?;
        let quantity = added.saturating_add(item.quantity.saturating_sub(1));
        if quantity != added {
            cart.update_quantity(&product.id, i64::from(quantity));
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn add_address(session: &Session, address: NewAddress) -> Result<(), CliError> {
    session.binding().sign_in().await?;
    let profile = session.add_address(address).await?;

    if let Some(added) = profile.addresses.last() {
        println!("Added address {} ({})", added.id, added.label);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn wishlist(session: &Session, action: WishlistAction) -> Result<(), CliError> {
    session.binding().sign_in().await?;

    match action {
        WishlistAction::Toggle { product_id } => {
            let product_id = ProductId::new(product_id);
            match session.toggle_wishlist(&product_id).await? {
                WishlistChange::Added => println!("Added {product_id} to the wishlist"),
                WishlistChange::Removed => println!("Removed {product_id} from the wishlist"),
            }
        }
        WishlistAction::Remove { product_id } => {
            let product_id = ProductId::new(product_id);
            session.remove_from_wishlist(&product_id).await?;
            println!("Removed {product_id} from the wishlist");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn dashboard(session: &Session) -> Result<(), CliError> {
    session.binding().sign_in().await?;
    let dashboard = session.load_dashboard().await?;
    let profile = &dashboard.profile;

    println!("{} <{}>", profile.name, profile.email);

    println!("\nAddresses");
    for address in &profile.addresses {
        println!(
            "  {:<16} {:<10} {}, {}, {} {}, {}",
            address.id,
            address.label,
            address.street,
            address.city,
            address.state,
            address.zip_code,
            address.country
        );
    }

    println!("\nWishlist");
    for product in &dashboard.wishlist {
        println!("  {:<12} {:<32} {:>10}", product.id, product.name, product.price);
    }

    println!("\nOrders");
    for order in &dashboard.orders {
        println!(
            "  {:<12} {}  {:<11} {:>3} items {:>10}",
            order.id,
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.status,
            order.item_count(),
            order.total
        );
    }
    Ok(())
}
