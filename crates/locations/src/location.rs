use serde::{Deserialize, Serialize};

use wareflow_core::{
    InventoryError, InventoryResult, LocationId, LocationRole, MovementKind, WarehouseId,
};

use crate::warehouse::Warehouse;

/// What a location is used for inside its warehouse.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    /// Inbound dock; goods land here before put-away.
    Receiving,
    /// Regular storage.
    Rack,
    /// Picked goods awaiting dispatch.
    Staging,
    /// Outbound dock; goods in transit out.
    Dispatch,
    /// Quarantined / written-down goods.
    Damaged,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Receiving => "receiving",
            LocationType::Rack => "rack",
            LocationType::Staging => "staging",
            LocationType::Dispatch => "dispatch",
            LocationType::Damaged => "damaged",
        }
    }

    /// The movement-kind / location-type policy table.
    ///
    /// Receipts land only in receiving or rack; deliveries pick only from
    /// rack or staging; transfers may touch anything (the two-ends-differ
    /// rule is the ledger's, it is about ids not types); adjustments apply
    /// only to rack or damaged stock.
    pub fn accepts(&self, kind: MovementKind, role: LocationRole) -> bool {
        use LocationRole::{Destination, Source};
        use LocationType::{Damaged, Rack, Receiving, Staging};

        match (kind, role) {
            (MovementKind::Receipt, Source) => false,
            (MovementKind::Receipt, Destination) => matches!(self, Receiving | Rack),
            (MovementKind::Delivery, Source) => matches!(self, Rack | Staging),
            (MovementKind::Delivery, Destination) => false,
            (MovementKind::Transfer, _) => true,
            (MovementKind::Adjustment, _) => matches!(self, Rack | Damaged),
        }
    }
}

impl core::fmt::Display for LocationType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sub-area of a warehouse. Belongs to exactly one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub warehouse_id: WarehouseId,
    pub name: String,
    pub location_type: LocationType,
}

impl Location {
    pub fn new(
        warehouse_id: WarehouseId,
        name: impl Into<String>,
        location_type: LocationType,
    ) -> InventoryResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InventoryError::validation("location name cannot be empty"));
        }
        Ok(Self {
            id: LocationId::new(),
            warehouse_id,
            name,
            location_type,
        })
    }
}

/// Warehouse/location lookups and registration.
///
/// Implementations own the backing storage; all methods take `&self`.
pub trait LocationDirectory: Send + Sync {
    /// Register a warehouse with a unique code.
    fn create_warehouse(&self, code: &str, address: &str) -> InventoryResult<Warehouse>;

    fn warehouse(&self, id: WarehouseId) -> InventoryResult<Warehouse>;

    /// Register a location. Fails with [`InventoryError::UnknownWarehouse`]
    /// when the owning warehouse does not exist.
    fn create_location(
        &self,
        warehouse_id: WarehouseId,
        name: &str,
        location_type: LocationType,
    ) -> InventoryResult<Location>;

    fn location(&self, id: LocationId) -> InventoryResult<Location>;

    /// Check that `location_id` exists and that its type admits `kind` in
    /// `role`, per [`LocationType::accepts`].
    fn validate_for_kind(
        &self,
        location_id: LocationId,
        kind: MovementKind,
        role: LocationRole,
    ) -> InventoryResult<()> {
        let location = self.location(location_id)?;
        if location.location_type.accepts(kind, role) {
            Ok(())
        } else {
            Err(InventoryError::invalid_location_type(format!(
                "location {} ({}) cannot be the {} of a {} movement",
                location.name, location.location_type, role, kind,
            )))
        }
    }
}

impl<T> LocationDirectory for std::sync::Arc<T>
where
    T: LocationDirectory + ?Sized,
{
    fn create_warehouse(&self, code: &str, address: &str) -> InventoryResult<Warehouse> {
        (**self).create_warehouse(code, address)
    }

    fn warehouse(&self, id: WarehouseId) -> InventoryResult<Warehouse> {
        (**self).warehouse(id)
    }

    fn create_location(
        &self,
        warehouse_id: WarehouseId,
        name: &str,
        location_type: LocationType,
    ) -> InventoryResult<Location> {
        (**self).create_location(warehouse_id, name, location_type)
    }

    fn location(&self, id: LocationId) -> InventoryResult<Location> {
        (**self).location(id)
    }

    fn validate_for_kind(
        &self,
        location_id: LocationId,
        kind: MovementKind,
        role: LocationRole,
    ) -> InventoryResult<()> {
        (**self).validate_for_kind(location_id, kind, role)
    }
}
