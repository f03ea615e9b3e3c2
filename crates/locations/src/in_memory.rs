//! In-memory location directory.

use std::collections::HashMap;
use std::sync::RwLock;

use wareflow_core::{InventoryError, InventoryResult, LocationId, WarehouseId};

use crate::location::{Location, LocationDirectory, LocationType};
use crate::warehouse::Warehouse;

/// In-memory warehouse/location store. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLocationDirectory {
    warehouses: RwLock<HashMap<WarehouseId, Warehouse>>,
    locations: RwLock<HashMap<LocationId, Location>>,
}

impl InMemoryLocationDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl core::fmt::Debug) -> InventoryError {
    InventoryError::storage("location directory lock poisoned")
}

impl LocationDirectory for InMemoryLocationDirectory {
    fn create_warehouse(&self, code: &str, address: &str) -> InventoryResult<Warehouse> {
        let mut warehouses = self.warehouses.write().map_err(poisoned)?;
        if warehouses.values().any(|w| w.code == code) {
            return Err(InventoryError::DuplicateWarehouseCode(code.to_string()));
        }

        let warehouse = Warehouse::new(code, address)?;
        warehouses.insert(warehouse.id, warehouse.clone());
        Ok(warehouse)
    }

    fn warehouse(&self, id: WarehouseId) -> InventoryResult<Warehouse> {
        let warehouses = self.warehouses.read().map_err(poisoned)?;
        warehouses
            .get(&id)
            .cloned()
            .ok_or(InventoryError::UnknownWarehouse(id))
    }

    fn create_location(
        &self,
        warehouse_id: WarehouseId,
        name: &str,
        location_type: LocationType,
    ) -> InventoryResult<Location> {
        self.warehouse(warehouse_id)?;

        let location = Location::new(warehouse_id, name, location_type)?;
        let mut locations = self.locations.write().map_err(poisoned)?;
        locations.insert(location.id, location.clone());
        Ok(location)
    }

    fn location(&self, id: LocationId) -> InventoryResult<Location> {
        let locations = self.locations.read().map_err(poisoned)?;
        locations
            .get(&id)
            .cloned()
            .ok_or(InventoryError::UnknownLocation(id))
    }
}
