//! The session cart.
//!
//! Lines are keyed by product id and kept in insertion order. Each line pins
//! the product's name and price as they were when first added; later catalog
//! changes do not reach the cart. Mutations are synchronous and never touch
//! the network.

use serde::Serialize;

use shopfront_core::{OrderLine, Price, Product, ProductId};

use crate::error::{Precondition, add_breadcrumb};

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

impl CartLine {
    /// `price × quantity` at the pinned price.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Snapshot this line for an order.
    #[must_use]
    pub fn to_order_line(&self) -> OrderLine {
        OrderLine {
            product_id: self.product_id.clone(),
            quantity: self.quantity,
            price: self.price,
            name: self.name.clone(),
        }
    }
}

/// In-memory cart, independent of identity.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|l| &l.product_id == product_id)
    }

    /// Add one unit of `product`, returning the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`Precondition::OutOfStock`] when the product has no stock.
    /// The cart is unchanged.
    pub fn add_to_cart(&mut self, product: &Product) -> Result<u32, Precondition> {
        if !product.is_purchasable() {
            return Err(Precondition::OutOfStock(product.id.clone()));
        }

        let quantity = if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
        {
            line.quantity = line.quantity.saturating_add(1);
            line.quantity
        } else {
            self.lines.push(CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                quantity: 1,
            });
            1
        };

        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));
        Ok(quantity)
    }

    /// Remove the line for `product_id`, whatever its quantity.
    ///
    /// Returns the removed line, if there was one.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> Option<CartLine> {
        let index = self.position(product_id)?;
        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", product_id.as_str())]));
        Some(self.lines.remove(index))
    }

    /// Set the quantity of an existing line. Zero or less removes it.
    ///
    /// Unknown products are ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == product_id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of `price × quantity` across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Phones".to_string(),
            price: Price::from_cents(cents),
            stock,
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_repeated_adds_increment_one_line() {
        let mut cart = CartStore::new();
        let p1 = product("p1", 1000, 5);
        for expected in 1..=4 {
            assert_eq!(cart.add_to_cart(&p1).unwrap(), expected);
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 4);
    }

    #[test]
    fn test_out_of_stock_is_rejected() {
        let mut cart = CartStore::new();
        let result = cart.add_to_cart(&product("p1", 1000, 0));
        assert_eq!(result, Err(Precondition::OutOfStock(ProductId::new("p1"))));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_to_zero_equals_remove() {
        let p1 = product("p1", 1000, 5);
        let p2 = product("p2", 500, 5);

        let mut updated = CartStore::new();
        updated.add_to_cart(&p1).unwrap();
        updated.add_to_cart(&p2).unwrap();
        let mut removed = updated.clone();

        updated.update_quantity(&p1.id, 0);
        removed.remove_from_cart(&p1.id);
        assert_eq!(updated.lines(), removed.lines());

        updated.update_quantity(&p2.id, -3);
        assert!(updated.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_directly() {
        let mut cart = CartStore::new();
        let p1 = product("p1", 1000, 5);
        cart.add_to_cart(&p1).unwrap();
        cart.update_quantity(&p1.id, 7);
        assert_eq!(cart.get(&p1.id).unwrap().quantity, 7);

        cart.update_quantity(&ProductId::new("missing"), 3);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_total_price_uses_pinned_price() {
        let mut cart = CartStore::new();
        let mut p1 = product("p1", 1000, 5);
        cart.add_to_cart(&p1).unwrap();
        cart.add_to_cart(&p1).unwrap();
        cart.add_to_cart(&product("p2", 500, 5)).unwrap();

        p1.price = Price::from_cents(9900);
        cart.add_to_cart(&p1).unwrap();

        assert_eq!(cart.get(&p1.id).unwrap().price, Price::from_cents(1000));
        assert_eq!(cart.total_price(), Price::from_cents(3500));
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = CartStore::new();
        cart.add_to_cart(&product("p2", 500, 1)).unwrap();
        cart.add_to_cart(&product("p1", 1000, 1)).unwrap();
        cart.add_to_cart(&product("p2", 500, 1)).unwrap();
        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, ["p2", "p1"]);
    }

    #[test]
    fn test_total_items_beyond_u32() {
        let mut cart = CartStore::new();
        let p1 = product("p1", 1000, 1);
        let p2 = product("p2", 500, 1);
        cart.add_to_cart(&p1).unwrap();
        cart.add_to_cart(&p2).unwrap();

        cart.update_quantity(&p1.id, i64::from(u32::MAX));
        cart.update_quantity(&p2.id, 1);

        assert_eq!(cart.total_items(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_clear() {
        let mut cart = CartStore::new();
        cart.add_to_cart(&product("p1", 1000, 1)).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
    }
}
