use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_core::{
    DocumentId, InventoryError, InventoryResult, LocationId, MovementId, MovementKind, Sku, UserId,
};

/// The projection key: one on-hand quantity per (sku, location).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub sku: Sku,
    pub location: LocationId,
}

impl StockKey {
    pub fn new(sku: Sku, location: LocationId) -> Self {
        Self { sku, location }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.sku, self.location)
    }
}

/// A movement waiting to be committed (no id, no timestamp yet).
///
/// The endpoint shape encodes the signed-sum rule uniformly: a set
/// `from_location` subtracts `quantity` there, a set `to_location` adds it.
/// Adjustments use the same encoding — an increase sets only `to_location`,
/// a decrease only `from_location` — so replay never needs a special case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub kind: MovementKind,
    pub sku: Sku,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    /// Always strictly positive; direction comes from the endpoints.
    pub quantity: i64,
    /// The document this movement was emitted by.
    pub reference: DocumentId,
    pub created_by: UserId,
}

impl MovementRequest {
    pub fn receipt(
        sku: Sku,
        to: LocationId,
        quantity: i64,
        reference: DocumentId,
        created_by: UserId,
    ) -> Self {
        Self {
            kind: MovementKind::Receipt,
            sku,
            from_location: None,
            to_location: Some(to),
            quantity,
            reference,
            created_by,
        }
    }

    pub fn delivery(
        sku: Sku,
        from: LocationId,
        quantity: i64,
        reference: DocumentId,
        created_by: UserId,
    ) -> Self {
        Self {
            kind: MovementKind::Delivery,
            sku,
            from_location: Some(from),
            to_location: None,
            quantity,
            reference,
            created_by,
        }
    }

    pub fn transfer(
        sku: Sku,
        from: LocationId,
        to: LocationId,
        quantity: i64,
        reference: DocumentId,
        created_by: UserId,
    ) -> Self {
        Self {
            kind: MovementKind::Transfer,
            sku,
            from_location: Some(from),
            to_location: Some(to),
            quantity,
            reference,
            created_by,
        }
    }

    /// Build an adjustment from a signed delta at one location.
    ///
    /// Fails with [`InventoryError::InvalidQuantity`] on a zero delta, or on
    /// `i64::MIN` (its magnitude has no `i64` representation).
    pub fn adjustment(
        sku: Sku,
        location: LocationId,
        delta: i64,
        reference: DocumentId,
        created_by: UserId,
    ) -> InventoryResult<Self> {
        if delta == 0 {
            return Err(InventoryError::InvalidQuantity(0));
        }
        let quantity = delta
            .checked_abs()
            .ok_or(InventoryError::InvalidQuantity(delta))?;
        let (from, to) = if delta > 0 {
            (None, Some(location))
        } else {
            (Some(location), None)
        };
        Ok(Self {
            kind: MovementKind::Adjustment,
            sku,
            from_location: from,
            to_location: to,
            quantity,
            reference,
            created_by,
        })
    }

    /// Check quantity and endpoint shape against the movement kind.
    ///
    /// Location *types* are not checked here — that needs the location
    /// directory and is the ledger's job.
    pub fn validate_shape(&self) -> InventoryResult<()> {
        if self.quantity <= 0 {
            return Err(InventoryError::InvalidQuantity(self.quantity));
        }
        match self.kind {
            MovementKind::Receipt => match (self.from_location, self.to_location) {
                (None, Some(_)) => Ok(()),
                _ => Err(InventoryError::validation(
                    "receipt must have a destination and no source",
                )),
            },
            MovementKind::Delivery => match (self.from_location, self.to_location) {
                (Some(_), None) => Ok(()),
                _ => Err(InventoryError::validation(
                    "delivery must have a source and no destination",
                )),
            },
            MovementKind::Transfer => match (self.from_location, self.to_location) {
                (Some(from), Some(to)) if from != to => Ok(()),
                (Some(_), Some(_)) => Err(InventoryError::validation(
                    "transfer endpoints must differ",
                )),
                _ => Err(InventoryError::validation(
                    "transfer must have both a source and a destination",
                )),
            },
            MovementKind::Adjustment => match (self.from_location, self.to_location) {
                (Some(_), None) | (None, Some(_)) => Ok(()),
                _ => Err(InventoryError::validation(
                    "adjustment must touch exactly one location",
                )),
            },
        }
    }

    /// Signed projection deltas for this movement: `-quantity` at the
    /// source, `+quantity` at the destination.
    pub fn deltas(&self) -> Vec<(StockKey, i64)> {
        endpoint_deltas(
            &self.sku,
            self.from_location,
            self.to_location,
            self.quantity,
        )
    }
}

/// A committed, immutable movement fact.
///
/// Never updated or deleted; corrections are new offsetting movements. The
/// store-assigned `id` is strictly increasing and defines replay order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub kind: MovementKind,
    pub sku: Sku,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub quantity: i64,
    pub reference: DocumentId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// Signed projection deltas, identical in shape to
    /// [`MovementRequest::deltas`].
    pub fn deltas(&self) -> Vec<(StockKey, i64)> {
        endpoint_deltas(
            &self.sku,
            self.from_location,
            self.to_location,
            self.quantity,
        )
    }
}

fn endpoint_deltas(
    sku: &Sku,
    from: Option<LocationId>,
    to: Option<LocationId>,
    quantity: i64,
) -> Vec<(StockKey, i64)> {
    let mut deltas = Vec::with_capacity(2);
    if let Some(from) = from {
        deltas.push((StockKey::new(sku.clone(), from), -quantity));
    }
    if let Some(to) = to {
        deltas.push((StockKey::new(sku.clone(), to), quantity));
    }
    deltas
}
