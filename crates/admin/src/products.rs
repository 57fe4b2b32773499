//! Product management.

use std::sync::Arc;

use tracing::{info, instrument};

use shopfront_api::DataApi;
use shopfront_core::{Category, NewProduct, Price, Product, ProductId, ProductPatch};

use crate::error::{AdminError, Result};

/// Operator input for creating or editing a product.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
    pub description: String,
    pub image: String,
}

impl ProductForm {
    /// Prefill the form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            stock: product.stock,
            description: product.description.clone(),
            image: product.image.clone(),
        }
    }

    /// Check the form before anything is sent.
    ///
    /// `categories` is the known category list; when it is empty the
    /// category is only checked for presence.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` naming the first problem.
    pub fn validate(&self, categories: &[Category]) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AdminError::Validation("name is required".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(AdminError::Validation("category is required".to_string()));
        }
        if self.price.is_negative() {
            return Err(AdminError::Validation(
                "price must not be negative".to_string(),
            ));
        }
        if !categories.is_empty() && !categories.iter().any(|c| c.name == self.category) {
            return Err(AdminError::Validation(format!(
                "unknown category: {}",
                self.category
            )));
        }
        Ok(())
    }

    fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name,
            category: self.category,
            price: self.price,
            stock: self.stock,
            description: self.description,
            image: self.image,
        }
    }
}

/// The operator's product list.
pub struct ProductsConsole {
    api: Arc<dyn DataApi>,
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl ProductsConsole {
    #[must_use]
    pub fn new(api: Arc<dyn DataApi>) -> Self {
        Self {
            api,
            products: Vec::new(),
            categories: Vec::new(),
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Fetch products and categories concurrently.
    ///
    /// # Errors
    ///
    /// Returns the remote failure; the previous lists are kept.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<()> {
        let (products, categories) =
            tokio::try_join!(self.api.list_products(), self.api.list_categories())
                .map_err(|e| AdminError::from(e).reported())?;
        self.products = products;
        self.categories = categories;
        Ok(())
    }

    async fn reload_products(&mut self) -> Result<()> {
        self.products = self
            .api
            .list_products()
            .await
            .map_err(|e| AdminError::from(e).reported())?;
        Ok(())
    }

    /// Create a product, or update `editing` with the form's fields, then
    /// re-fetch the list.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` before any request, or the remote
    /// failure.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn save_product(
        &mut self,
        editing: Option<&ProductId>,
        form: ProductForm,
    ) -> Result<Product> {
        form.validate(&self.categories)?;
        let product = form.into_new_product();

        let saved = match editing {
            Some(id) => {
                let patch = ProductPatch::from(product);
                self.api.update_product(id, &patch).await
            }
            None => self.api.create_product(&product).await,
        }
        .map_err(|e| AdminError::from(e).reported())?;

        info!(product_id = %saved.id, created = editing.is_none(), "Product saved");
        self.reload_products().await?;
        Ok(saved)
    }

    /// Delete a product, then re-fetch the list.
    ///
    /// # Errors
    ///
    /// Returns the remote failure.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&mut self, id: &ProductId) -> Result<()> {
        self.api
            .delete_product(id)
            .await
            .map_err(|e| AdminError::from(e).reported())?;
        info!("Product deleted");
        self.reload_products().await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::CategoryId;

    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "Pixel 8".to_string(),
            category: "Phones".to_string(),
            price: Price::from_cents(69_900),
            stock: 4,
            ..ProductForm::default()
        }
    }

    fn categories() -> Vec<Category> {
        vec![Category {
            id: CategoryId::new("c1"),
            name: "Phones".to_string(),
            description: String::new(),
        }]
    }

    #[test]
    fn test_valid_form() {
        assert!(form().validate(&categories()).is_ok());
    }

    #[test]
    fn test_name_and_category_required() {
        let mut f = form();
        f.name = "  ".to_string();
        assert!(matches!(
            f.validate(&[]),
            Err(AdminError::Validation(m)) if m == "name is required"
        ));

        let mut f = form();
        f.category = String::new();
        assert!(
            matches!(f.validate(&[]), Err(AdminError::Validation(m)) if m == "category is required")
        );
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut f = form();
        f.price = Price::new(Decimal::new(-1, 2));
        assert!(matches!(f.validate(&categories()), Err(AdminError::Validation(_))));

        f.price = Price::ZERO;
        assert!(f.validate(&categories()).is_ok());
    }

    #[test]
    fn test_unknown_category_rejected_only_when_list_known() {
        let mut f = form();
        f.category = "Toasters".to_string();
        assert!(matches!(f.validate(&categories()), Err(AdminError::Validation(_))));
        assert!(f.validate(&[]).is_ok());
    }
}
