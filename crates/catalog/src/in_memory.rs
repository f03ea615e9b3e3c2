//! In-memory catalog.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use wareflow_core::{CategoryId, InventoryError, InventoryResult, Sku};

use crate::product::{Catalog, Category, NewProduct, Product};

/// In-memory catalog store. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<Sku, Product>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl core::fmt::Debug) -> InventoryError {
    InventoryError::storage("catalog lock poisoned")
}

impl Catalog for InMemoryCatalog {
    fn create_product(&self, new: NewProduct) -> InventoryResult<Product> {
        if let Some(category) = new.category {
            self.category(category)?;
        }

        let mut products = self.products.write().map_err(poisoned)?;
        if products.contains_key(&new.sku) {
            return Err(InventoryError::DuplicateSku(new.sku));
        }

        let product = Product::from_new(new, Utc::now())?;
        products.insert(product.sku.clone(), product.clone());
        Ok(product)
    }

    fn product(&self, sku: &Sku) -> InventoryResult<Product> {
        let products = self.products.read().map_err(poisoned)?;
        products
            .get(sku)
            .cloned()
            .ok_or_else(|| InventoryError::UnknownProduct(sku.clone()))
    }

    fn update_details(
        &self,
        sku: &Sku,
        name: Option<String>,
        description: Option<String>,
    ) -> InventoryResult<Product> {
        let mut products = self.products.write().map_err(poisoned)?;
        let product = products
            .get_mut(sku)
            .ok_or_else(|| InventoryError::UnknownProduct(sku.clone()))?;

        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(InventoryError::validation("product name cannot be empty"));
            }
            product.name = name;
        }
        if let Some(description) = description {
            product.description = Some(description);
        }
        Ok(product.clone())
    }

    fn create_category(&self, name: &str, description: Option<String>) -> InventoryResult<Category> {
        let mut categories = self.categories.write().map_err(poisoned)?;
        if categories.values().any(|c| c.name == name) {
            return Err(InventoryError::DuplicateCategory(name.to_string()));
        }

        let category = Category::new(name, description)?;
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    fn category(&self, id: CategoryId) -> InventoryResult<Category> {
        let categories = self.categories.read().map_err(poisoned)?;
        categories
            .get(&id)
            .cloned()
            .ok_or(InventoryError::UnknownCategory(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> NewProduct {
        NewProduct {
            sku: Sku::new("WIDGET-1").unwrap(),
            name: "Widget".to_string(),
            description: None,
            category: None,
            unit: None,
        }
    }

    #[test]
    fn duplicate_sku_is_rejected() {
        let catalog = InMemoryCatalog::new();
        catalog.create_product(widget()).unwrap();
        let err = catalog.create_product(widget()).unwrap_err();
        assert!(matches!(err, InventoryError::DuplicateSku(_)));
    }

    #[test]
    fn lookup_is_by_normalized_sku() {
        let catalog = InMemoryCatalog::new();
        catalog.create_product(widget()).unwrap();
        let found = catalog.product(&Sku::new("widget-1").unwrap()).unwrap();
        assert_eq!(found.name, "Widget");
    }

    #[test]
    fn unknown_category_reference_fails_creation() {
        let catalog = InMemoryCatalog::new();
        let mut new = widget();
        new.category = Some(CategoryId::new());
        assert!(matches!(
            catalog.create_product(new),
            Err(InventoryError::UnknownCategory(_)),
        ));
    }

    #[test]
    fn details_are_editable_but_sku_is_the_key() {
        let catalog = InMemoryCatalog::new();
        catalog.create_product(widget()).unwrap();
        let sku = Sku::new("WIDGET-1").unwrap();

        let updated = catalog
            .update_details(&sku, Some("Widget Mk2".into()), Some("steel".into()))
            .unwrap();
        assert_eq!(updated.name, "Widget Mk2");
        assert_eq!(updated.description.as_deref(), Some("steel"));
        assert_eq!(updated.sku, sku);
    }

    #[test]
    fn category_names_are_unique() {
        let catalog = InMemoryCatalog::new();
        catalog.create_category("Fasteners", None).unwrap();
        assert!(matches!(
            catalog.create_category("Fasteners", None),
            Err(InventoryError::DuplicateCategory(_)),
        ));
    }
}
