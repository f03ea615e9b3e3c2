//! Append-only movement storage.

use wareflow_core::{InventoryResult, MovementId};

use crate::movement::{Movement, MovementRequest};

/// Append-only store for committed movements.
///
/// Implementations must:
/// - assign strictly increasing `MovementId`s with no gaps or duplicates,
///   batch-atomically (a batch is persisted whole or not at all)
/// - stamp `created_at` so it never decreases across appends
/// - expose no update or delete operation of any kind
///
/// Id order is the authoritative replay order; `created_at` is informational
/// business time.
pub trait MovementStore: Send + Sync {
    /// Append a batch of movements atomically, assigning ids and timestamps.
    ///
    /// Shape validation is the caller's job; the store persists what it is
    /// given.
    fn append_batch(&self, batch: Vec<MovementRequest>) -> InventoryResult<Vec<Movement>>;

    /// Every committed movement, in id order.
    fn all(&self) -> InventoryResult<Vec<Movement>>;

    /// Every committed movement with an id strictly greater than `id`, in id
    /// order. `MovementId::default()` (zero) reads the whole log.
    fn after(&self, id: MovementId) -> InventoryResult<Vec<Movement>>;

    /// The highest assigned id, or zero for an empty log.
    fn last_id(&self) -> InventoryResult<MovementId>;
}

impl<T> MovementStore for std::sync::Arc<T>
where
    T: MovementStore + ?Sized,
{
    fn append_batch(&self, batch: Vec<MovementRequest>) -> InventoryResult<Vec<Movement>> {
        (**self).append_batch(batch)
    }

    fn all(&self) -> InventoryResult<Vec<Movement>> {
        (**self).all()
    }

    fn after(&self, id: MovementId) -> InventoryResult<Vec<Movement>> {
        (**self).after(id)
    }

    fn last_id(&self) -> InventoryResult<MovementId> {
        (**self).last_id()
    }
}
