use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_core::{CategoryId, InventoryError, InventoryResult, Sku};

/// Default unit of measure when none is given.
pub const DEFAULT_UNIT: &str = "unit";

/// A product category (flat, no hierarchy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, description: Option<String>) -> InventoryResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InventoryError::validation("category name cannot be empty"));
        }
        Ok(Self {
            id: CategoryId::new(),
            name,
            description,
        })
    }
}

/// A catalog product.
///
/// The `sku` is the identity the whole movement log is keyed on, so it is
/// frozen: no operation anywhere renames it. Name and description stay
/// editable even after the product appears in movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: Sku,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
    pub unit: String,
    pub created_at: DateTime<Utc>,
}

/// Input for [`Catalog::create_product`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: Sku,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
    /// Unit of measure; defaults to [`DEFAULT_UNIT`] when `None`.
    pub unit: Option<String>,
}

impl Product {
    pub fn from_new(new: NewProduct, created_at: DateTime<Utc>) -> InventoryResult<Self> {
        if new.name.trim().is_empty() {
            return Err(InventoryError::validation("product name cannot be empty"));
        }
        let unit = match new.unit {
            Some(u) if u.trim().is_empty() => {
                return Err(InventoryError::validation("unit cannot be empty"));
            }
            Some(u) => u,
            None => DEFAULT_UNIT.to_string(),
        };
        Ok(Self {
            sku: new.sku,
            name: new.name,
            description: new.description,
            category: new.category,
            unit,
            created_at,
        })
    }
}

/// Catalog operations.
///
/// Implementations own the backing storage; interior mutability is expected
/// (all methods take `&self`).
pub trait Catalog: Send + Sync {
    /// Register a new product. Fails with [`InventoryError::DuplicateSku`]
    /// when the SKU is taken and [`InventoryError::UnknownCategory`] when the
    /// referenced category does not exist.
    fn create_product(&self, new: NewProduct) -> InventoryResult<Product>;

    /// Look up a product by SKU.
    fn product(&self, sku: &Sku) -> InventoryResult<Product>;

    /// Edit the mutable parts of a product. `None` leaves a field untouched;
    /// the SKU itself cannot change.
    fn update_details(
        &self,
        sku: &Sku,
        name: Option<String>,
        description: Option<String>,
    ) -> InventoryResult<Product>;

    /// Create a category with a unique name.
    fn create_category(&self, name: &str, description: Option<String>) -> InventoryResult<Category>;

    /// Look up a category by id.
    fn category(&self, id: CategoryId) -> InventoryResult<Category>;
}

impl<T> Catalog for std::sync::Arc<T>
where
    T: Catalog + ?Sized,
{
    fn create_product(&self, new: NewProduct) -> InventoryResult<Product> {
        (**self).create_product(new)
    }

    fn product(&self, sku: &Sku) -> InventoryResult<Product> {
        (**self).product(sku)
    }

    fn update_details(
        &self,
        sku: &Sku,
        name: Option<String>,
        description: Option<String>,
    ) -> InventoryResult<Product> {
        (**self).update_details(sku, name, description)
    }

    fn create_category(&self, name: &str, description: Option<String>) -> InventoryResult<Category> {
        (**self).create_category(name, description)
    }

    fn category(&self, id: CategoryId) -> InventoryResult<Category> {
        (**self).category(id)
    }
}
