//! Movement kinds and the roles a location can play in one.

use serde::{Deserialize, Serialize};

/// The four kinds of stock change the ledger records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Stock entering the system from outside (supplier receipt).
    Receipt,
    /// Stock leaving the system (customer delivery).
    Delivery,
    /// Stock moving between two internal locations.
    Transfer,
    /// A signed correction at a single location.
    Adjustment,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Receipt => "receipt",
            MovementKind::Delivery => "delivery",
            MovementKind::Transfer => "transfer",
            MovementKind::Adjustment => "adjustment",
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of a movement a location sits on.
///
/// Location-type policy is keyed on (kind, role): e.g. a receipt may only
/// target receiving or rack locations, and has no source at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationRole {
    Source,
    Destination,
}

impl core::fmt::Display for LocationRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LocationRole::Source => f.write_str("source"),
            LocationRole::Destination => f.write_str("destination"),
        }
    }
}
