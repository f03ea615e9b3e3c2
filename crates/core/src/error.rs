//! Domain error model.

use thiserror::Error;

use crate::id::{CategoryId, DocumentId, LocationId, WarehouseId};
use crate::sku::Sku;

/// Result type used across the inventory domain.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Inventory-domain error.
///
/// Every variant except `NegativeStock` and `Storage` is an ordinary,
/// deterministic user-facing failure: detected before any mutation and
/// propagated unchanged to the caller. `NegativeStock` should be unreachable
/// while the ledger's sufficiency check is correct — it firing means a
/// concurrency-control defect, and callers treat it as an integrity fault
/// rather than user error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Referenced product does not exist in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(Sku),

    /// Referenced category does not exist.
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// Referenced warehouse does not exist.
    #[error("unknown warehouse: {0}")]
    UnknownWarehouse(WarehouseId),

    /// Referenced location does not exist.
    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    /// Referenced document does not exist.
    #[error("unknown document: {0}")]
    UnknownDocument(DocumentId),

    /// A product with this SKU already exists.
    #[error("duplicate sku: {0}")]
    DuplicateSku(Sku),

    /// A category with this name already exists.
    #[error("duplicate category: {0}")]
    DuplicateCategory(String),

    /// A warehouse with this code already exists.
    #[error("duplicate warehouse code: {0}")]
    DuplicateWarehouseCode(String),

    /// The location's type does not admit this movement kind/role.
    #[error("invalid location type: {0}")]
    InvalidLocationType(String),

    /// Movement quantity must be strictly positive.
    #[error("invalid quantity {0} (must be positive)")]
    InvalidQuantity(i64),

    /// The source location does not hold enough stock for the movement.
    #[error("insufficient stock of {sku} at {location}: on hand {on_hand}, requested {requested}")]
    InsufficientStock {
        sku: Sku,
        location: LocationId,
        on_hand: i64,
        requested: i64,
    },

    /// The projection was asked to go below zero. Integrity fault.
    #[error("negative stock of {sku} at {location}: delta {delta} on {on_hand} on hand")]
    NegativeStock {
        sku: Sku,
        location: LocationId,
        on_hand: i64,
        delta: i64,
    },

    /// A document status transition outside the allowed state machine.
    #[error("invalid document transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Infrastructure failure (poisoned lock, storage fault).
    #[error("storage failure: {0}")]
    Storage(String),
}

impl InventoryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_location_type(msg: impl Into<String>) -> Self {
        Self::InvalidLocationType(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True for the variants that signal an internal defect rather than bad input.
    pub fn is_integrity_fault(&self) -> bool {
        matches!(self, Self::NegativeStock { .. })
    }
}
