//! `wareflow-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every inventory
//! module (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod kind;
pub mod sku;

pub use error::{InventoryError, InventoryResult};
pub use id::{CategoryId, DocumentId, LocationId, MovementId, UserId, WarehouseId};
pub use kind::{LocationRole, MovementKind};
pub use sku::Sku;
