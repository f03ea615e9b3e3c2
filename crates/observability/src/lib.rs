//! Shared tracing/logging setup.
//!
//! The ledger logs integrity faults (a projection delta refused after the
//! sufficiency check passed) at `error!` level; initialize this early so
//! those are never dropped.

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
