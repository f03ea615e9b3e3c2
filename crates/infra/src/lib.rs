//! Infrastructure layer: store wiring and the boundary facade.
//!
//! The domain crates are pure; this crate composes them with the in-memory
//! stores and exposes [`service::InventoryService`], the single entry point
//! the (out-of-scope) transport layer calls.

pub mod document_store;
pub mod service;


pub use document_store::InMemoryDocumentStore;
pub use service::InventoryService;
