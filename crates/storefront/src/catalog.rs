//! Catalog browsing: loading, search, category filter and sort.
//!
//! [`filter_and_sort`] is a pure function of its inputs. Filters compose
//! with AND and sorting runs after filtering. Every sort is stable, so
//! products with equal keys keep their input order and applying the same
//! query twice gives the same result as applying it once.

use core::fmt;
use core::str::FromStr;

use tracing::instrument;

use shopfront_api::DataApi;
use shopfront_core::{Category, Product};

use crate::error::{AppError, Result};

/// Category value that matches every product.
pub const ALL_CATEGORIES: &str = "all";

/// Category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Exact match on `Product::category`.
    Named(String),
}

impl CategoryFilter {
    fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => product.category == *name,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }
}

/// Sort order for the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Case-insensitive ascending by name.
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
    /// Any other key leaves the order untouched.
    Unrecognized(String),
}

impl SortKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name => "name",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Unrecognized(key) => key,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Ok(match s {
            "name" => Self::Name,
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            other => Self::Unrecognized(other.to_string()),
        })
    }
}

/// Search text, category and sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortKey,
}

impl CatalogQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// Apply `query` to `products`, returning the matching products in order.
#[must_use]
pub fn filter_and_sort(products: &[Product], query: &CatalogQuery) -> Vec<Product> {
    let needle = query.search.to_lowercase();

    let mut matched: Vec<Product> = products
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .filter(|p| query.category.matches(p))
        .cloned()
        .collect();

    match &query.sort {
        SortKey::Name => matched.sort_by_cached_key(|p| p.name.to_lowercase()),
        SortKey::PriceAsc => matched.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => matched.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::Unrecognized(_) => {}
    }

    matched
}

/// Products and categories as loaded from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Category names, for filter options and product form validation.
    #[must_use]
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn query(&self, query: &CatalogQuery) -> Vec<Product> {
        filter_and_sort(&self.products, query)
    }
}

/// Fetch products and categories concurrently.
///
/// # Errors
///
/// Returns the first remote failure; nothing is partially loaded.
#[instrument(skip(api))]
pub async fn load_catalog(api: &dyn DataApi) -> Result<Catalog> {
    let (products, categories) = tokio::try_join!(api.list_products(), api.list_categories())
        .map_err(|e| AppError::from(e).reported())?;

    tracing::debug!(
        products = products.len(),
        categories = categories.len(),
        "Catalog loaded"
    );
    Ok(Catalog {
        products,
        categories,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::{Price, ProductId};

    use super::*;

    fn product(id: &str, name: &str, category: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: category.to_string(),
            price: Price::from_cents(cents),
            stock: 1,
            description: String::new(),
            image: String::new(),
        }
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    fn sample() -> Vec<Product> {
        vec![
            product("1", "iPhone 15", "Phones", 99_900),
            product("2", "Pixel 8", "Phones", 69_900),
            product("3", "MacBook Air", "Laptops", 119_900),
            product("4", "iPad Mini", "Tablets", 49_900),
            product("5", "Galaxy S24", "Phones", 69_900),
        ]
    }

    #[test]
    fn test_name_sort_is_case_insensitive_and_stable() {
        let products = vec![
            product("1", "b", "x", 100),
            product("2", "A", "x", 100),
            product("3", "a", "x", 100),
        ];
        let sorted = filter_and_sort(&products, &CatalogQuery::new());
        let names: Vec<&str> = sorted.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "a", "b"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let result = filter_and_sort(&sample(), &CatalogQuery::new().search("IP"));
        assert_eq!(ids(&result), ["4", "1"]);
    }

    #[test]
    fn test_empty_search_matches_all() {
        let result = filter_and_sort(&sample(), &CatalogQuery::new().search(""));
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_category_and_search_compose() {
        let query = CatalogQuery::new().search("i").category("Phones");
        let result = filter_and_sort(&sample(), &query);
        assert_eq!(ids(&result), ["1", "2"]);
    }

    #[test]
    fn test_all_category_sentinel() {
        assert_eq!(CategoryFilter::from("all"), CategoryFilter::All);
        let result = filter_and_sort(&sample(), &CatalogQuery::new().category("all"));
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_price_sorts_are_stable() {
        let asc = filter_and_sort(&sample(), &CatalogQuery::new().sort(SortKey::PriceAsc));
        assert_eq!(ids(&asc), ["4", "2", "5", "1", "3"]);

        let desc = filter_and_sort(&sample(), &CatalogQuery::new().sort(SortKey::PriceDesc));
        assert_eq!(ids(&desc), ["3", "1", "2", "5", "4"]);
    }

    #[test]
    fn test_unrecognized_sort_keeps_input_order() {
        let sort: SortKey = "popularity".parse().unwrap();
        assert_eq!(sort, SortKey::Unrecognized("popularity".to_string()));
        let result = filter_and_sort(&sample(), &CatalogQuery::new().sort(sort));
        assert_eq!(ids(&result), ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_filter_and_sort_is_idempotent() {
        let query = CatalogQuery::new().search("a").sort(SortKey::PriceDesc);
        let once = filter_and_sort(&sample(), &query);
        let twice = filter_and_sort(&once, &query);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_key_round_trips_through_str() {
        for key in ["name", "price-asc", "price-desc", "newest"] {
            assert_eq!(key.parse::<SortKey>().unwrap().as_str(), key);
        }
    }
}
