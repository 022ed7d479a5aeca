//! # Catalog
//!
//! Immutable snapshot of the menu as delivered by the catalog provider.
//!
//! A snapshot is built once per fetch and shared behind an `Arc`; readers
//! never observe a half-updated menu. A price change means a new snapshot.

use std::collections::{BTreeMap, HashMap};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, ProductId};
use crate::validation::validate_product;

/// Read-only product list with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Builds a snapshot, validating every entry.
    ///
    /// ## Errors
    /// - `Validation` if any product is malformed
    /// - `Validation(Duplicate)` if two products share an id
    pub fn new(products: Vec<Product>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(products.len());

        for (position, product) in products.iter().enumerate() {
            validate_product(product)?;

            if index.insert(product.id, position).is_some() {
                return Err(ValidationError::Duplicate {
                    field: "product id".to_string(),
                    value: product.id.to_string(),
                }
                .into());
            }
        }

        Ok(Catalog { products, index })
    }

    /// Looks up a product by id.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index.get(&id).map(|&position| &self.products[position])
    }

    /// Looks up a product by id, failing with `ProductNotFound`.
    pub fn require(&self, id: ProductId) -> CoreResult<&Product> {
        self.get(id).ok_or(CoreError::ProductNotFound(id))
    }

    /// All products in load order, including unavailable ones.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products the kitchen can serve right now (the waiter's menu).
    pub fn visible(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.available)
    }

    /// Distinct categories of visible products, sorted.
    ///
    /// Categories differing only in case are one category, listed with the
    /// spelling of its first product.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        for product in self.visible() {
            seen.entry(product.category.to_lowercase())
                .or_insert(product.category.as_str());
        }
        seen.into_values().collect()
    }

    /// Visible products of one category, case-insensitive.
    pub fn by_category<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a Product> + 'a {
        let wanted = category.to_lowercase();
        self.visible()
            .filter(move |p| p.category.to_lowercase() == wanted)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
