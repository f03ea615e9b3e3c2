//! Catalog domain module: products and categories.
//!
//! Static reference data. Every other module validates a `Sku` against the
//! catalog before it touches the movement log; nothing in here carries a
//! quantity.

pub mod in_memory;
pub mod product;

pub use in_memory::InMemoryCatalog;
pub use product::{Catalog, Category, NewProduct, Product};
