//! Document lifecycle: receipts, deliveries, transfers, adjustments.
//!
//! A document is a user-facing grouping of line items with one forward-only
//! status machine (draft → waiting → done, or canceled). Finalization is the
//! only step that touches the movement ledger, and it is all-or-nothing
//! across the document's lines. This crate is pure state + decisions; the
//! ledger commit itself is orchestrated by `wareflow-infra`.

pub mod document;

pub use document::{Document, DocumentKind, DocumentLine, DocumentStatus};
