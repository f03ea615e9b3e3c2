//! Location graph: warehouses and their internal locations.
//!
//! A location's type constrains which movement kinds may reference it; the
//! policy table lives in [`location`] and is consulted by the ledger on
//! every append.

pub mod in_memory;
pub mod location;
pub mod warehouse;

pub use in_memory::InMemoryLocationDirectory;
pub use location::{Location, LocationDirectory, LocationType};
pub use warehouse::Warehouse;
