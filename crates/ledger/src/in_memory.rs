//! In-memory movement store.

use std::sync::RwLock;

use chrono::Utc;

use wareflow_core::{InventoryError, InventoryResult, MovementId};

use crate::movement::{Movement, MovementRequest};
use crate::store::MovementStore;

/// In-memory append-only movement log.
///
/// Intended for tests/dev. Not optimized for performance: reads clone the
/// requested slice of the log.
#[derive(Debug, Default)]
pub struct InMemoryMovementStore {
    log: RwLock<Vec<Movement>>,
}

impl InMemoryMovementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MovementStore for InMemoryMovementStore {
    fn append_batch(&self, batch: Vec<MovementRequest>) -> InventoryResult<Vec<Movement>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut log = self
            .log
            .write()
            .map_err(|_| InventoryError::storage("movement log lock poisoned"))?;

        let mut next = log.last().map(|m| m.id.next()).unwrap_or(MovementId(1));
        let created_at = Utc::now();

        let mut committed = Vec::with_capacity(batch.len());
        for request in batch {
            let movement = Movement {
                id: next,
                kind: request.kind,
                sku: request.sku,
                from_location: request.from_location,
                to_location: request.to_location,
                quantity: request.quantity,
                reference: request.reference,
                created_by: request.created_by,
                created_at,
            };
            next = next.next();
            log.push(movement.clone());
            committed.push(movement);
        }

        Ok(committed)
    }

    fn all(&self) -> InventoryResult<Vec<Movement>> {
        let log = self
            .log
            .read()
            .map_err(|_| InventoryError::storage("movement log lock poisoned"))?;
        Ok(log.clone())
    }

    fn after(&self, id: MovementId) -> InventoryResult<Vec<Movement>> {
        let log = self
            .log
            .read()
            .map_err(|_| InventoryError::storage("movement log lock poisoned"))?;
        // Ids are dense and start at 1, so the tail begins at index id.
        let start = (id.value() as usize).min(log.len());
        Ok(log[start..].to_vec())
    }

    fn last_id(&self) -> InventoryResult<MovementId> {
        let log = self
            .log
            .read()
            .map_err(|_| InventoryError::storage("movement log lock poisoned"))?;
        Ok(log.last().map(|m| m.id).unwrap_or_default())
    }
}
