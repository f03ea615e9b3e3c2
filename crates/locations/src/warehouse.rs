use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_core::{InventoryError, InventoryResult, WarehouseId};

/// A physical warehouse. Owns a set of locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    /// Short unique code (e.g. "WH-NORTH").
    pub code: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl Warehouse {
    pub fn new(code: impl Into<String>, address: impl Into<String>) -> InventoryResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(InventoryError::validation("warehouse code cannot be empty"));
        }
        Ok(Self {
            id: WarehouseId::new(),
            code,
            address: address.into(),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_a_code() {
        assert!(Warehouse::new("  ", "1 Depot Rd").is_err());
        assert!(Warehouse::new("WH-NORTH", "1 Depot Rd").is_ok());
    }
}
