//! Movement ledger: the append-only source of truth for stock.
//!
//! Every stock change — receipt, delivery, transfer, adjustment — is an
//! immutable [`Movement`] fact. Current on-hand quantities ([`StockLevels`])
//! are a projection of the log and can always be rebuilt by replaying it.
//! The [`Ledger`] service is the sole writer: it validates a request against
//! the catalog and the location policy, checks sufficiency, and commits the
//! projection delta and the log append as one atomic unit.

pub mod in_memory;
pub mod ledger;
pub mod levels;
pub mod movement;
pub mod store;

pub use in_memory::InMemoryMovementStore;
pub use ledger::Ledger;
pub use levels::StockLevels;
pub use movement::{Movement, MovementRequest, StockKey};
pub use store::MovementStore;
