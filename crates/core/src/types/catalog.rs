//! Catalog records: products and categories.
//!
//! Both are owned by the remote store and read-mostly on the client.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A product as listed by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Category name (not id); matches [`Category::name`].
    pub category: String,
    pub price: Price,
    /// Units on hand. Advisory only: it gates adding to the cart but is never
    /// reserved.
    pub stock: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        self.stock > 0
    }
}

/// A product without an id, as submitted for creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
    pub description: String,
    pub image: String,
}

impl NewProduct {
    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            stock: self.stock,
            description: self.description,
            image: self.image,
        }
    }
}

/// Partial product update; absent fields are left untouched remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductPatch {
    /// Apply the patch to a product in place.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(category) = &self.category {
            product.category.clone_from(category);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(image) = &self.image {
            product.image.clone_from(image);
        }
    }
}

impl From<NewProduct> for ProductPatch {
    fn from(product: NewProduct) -> Self {
        Self {
            name: Some(product.name),
            category: Some(product.category),
            price: Some(product.price),
            stock: Some(product.stock),
            description: Some(product.description),
            image: Some(product.image),
        }
    }
}

/// A product category. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}
