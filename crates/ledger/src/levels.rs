//! Stock projection: materialized on-hand quantities.

use std::collections::HashMap;
use std::sync::RwLock;

use wareflow_core::{InventoryError, InventoryResult, LocationId, Sku};

use crate::movement::StockKey;

/// Current on-hand quantity per (sku, location).
///
/// A disposable read model: the movement log is the source of truth and this
/// map can be rebuilt from it at any time (see `Ledger::rebuild`). Absent
/// keys read as zero — absence is not an error. Quantities never go
/// negative; a delta that would make one is refused whole.
#[derive(Debug, Default)]
pub struct StockLevels {
    levels: RwLock<HashMap<StockKey, i64>>,
}

impl StockLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current quantity for a key, zero if absent.
    pub fn quantity(&self, sku: &Sku, location: LocationId) -> i64 {
        let levels = self.levels.read().unwrap_or_else(|e| e.into_inner());
        levels
            .get(&StockKey::new(sku.clone(), location))
            .copied()
            .unwrap_or(0)
    }

    /// Apply a group of signed deltas under one write-lock acquisition, so
    /// a concurrent reader sees all of them or none of them.
    ///
    /// Validation runs cumulatively over the whole slice before anything is
    /// written: a key named twice is checked against its running value, a
    /// delta that would take a key below zero refuses the group whole, and
    /// a sum that leaves `i64` is rejected as a validation error. Only the
    /// ledger calls this, inside the same atomic unit as the log append.
    pub(crate) fn apply_all(&self, deltas: &[(StockKey, i64)]) -> InventoryResult<()> {
        let mut levels = self
            .levels
            .write()
            .map_err(|_| InventoryError::storage("stock projection lock poisoned"))?;

        let mut projected: HashMap<&StockKey, i64> = HashMap::with_capacity(deltas.len());
        for (key, delta) in deltas {
            let on_hand = *projected
                .entry(key)
                .or_insert_with(|| levels.get(key).copied().unwrap_or(0));
            let next = on_hand
                .checked_add(*delta)
                .ok_or_else(|| InventoryError::validation("stock quantity overflow"))?;
            if next < 0 {
                return Err(InventoryError::NegativeStock {
                    sku: key.sku.clone(),
                    location: key.location,
                    on_hand,
                    delta: *delta,
                });
            }
            projected.insert(key, next);
        }

        for (key, next) in projected {
            if next == 0 {
                levels.remove(key);
            } else {
                levels.insert(key.clone(), next);
            }
        }
        Ok(())
    }

    /// Swap in a freshly replayed projection. Readers see the old state or
    /// the new state, never a mix.
    pub(crate) fn replace(&self, fresh: HashMap<StockKey, i64>) {
        let mut levels = self.levels.write().unwrap_or_else(|e| e.into_inner());
        *levels = fresh;
    }

    /// Every non-zero entry, sorted by key. Used for listings and for
    /// comparing a live projection against a replay.
    pub fn snapshot(&self) -> Vec<(StockKey, i64)> {
        let levels = self.levels.read().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<_> = levels.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Non-zero entries for one product, sorted by location.
    pub fn by_sku(&self, sku: &Sku) -> Vec<(LocationId, i64)> {
        let levels = self.levels.read().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<_> = levels
            .iter()
            .filter(|(k, _)| &k.sku == sku)
            .map(|(k, v)| (k.location, *v))
            .collect();
        entries.sort();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(sku: &str, location: LocationId) -> StockKey {
        StockKey::new(Sku::new(sku).unwrap(), location)
    }

    #[test]
    fn absent_keys_read_as_zero() {
        let levels = StockLevels::new();
        assert_eq!(levels.quantity(&Sku::new("WIDGET-1").unwrap(), LocationId::new()), 0);
    }

    #[test]
    fn deltas_accumulate_and_never_go_negative() {
        let levels = StockLevels::new();
        let loc = LocationId::new();
        let k = key("WIDGET-1", loc);

        levels.apply_all(&[(k.clone(), 10)]).unwrap();
        levels.apply_all(&[(k.clone(), -4)]).unwrap();
        assert_eq!(levels.quantity(&k.sku, loc), 6);

        let err = levels.apply_all(&[(k.clone(), -7)]).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::NegativeStock { on_hand: 6, delta: -7, .. },
        ));
        // The refused delta left the quantity untouched.
        assert_eq!(levels.quantity(&k.sku, loc), 6);
    }

    #[test]
    fn one_failing_delta_refuses_the_whole_group() {
        let levels = StockLevels::new();
        let (a, b) = (LocationId::new(), LocationId::new());
        let funded = key("WIDGET-1", a);
        let empty = key("WIDGET-1", b);
        levels.apply_all(&[(funded.clone(), 10)]).unwrap();

        let err = levels
            .apply_all(&[(funded.clone(), -4), (empty.clone(), -1)])
            .unwrap_err();
        assert!(matches!(err, InventoryError::NegativeStock { .. }));
        assert_eq!(levels.quantity(&funded.sku, a), 10);
        assert_eq!(levels.quantity(&empty.sku, b), 0);
    }

    #[test]
    fn repeated_keys_are_checked_cumulatively() {
        let levels = StockLevels::new();
        let k = key("WIDGET-1", LocationId::new());
        levels.apply_all(&[(k.clone(), 8)]).unwrap();

        // Each -5 passes against 8 in isolation; together they go negative.
        let err = levels
            .apply_all(&[(k.clone(), -5), (k.clone(), -5)])
            .unwrap_err();
        assert!(matches!(
            err,
            InventoryError::NegativeStock { on_hand: 3, delta: -5, .. },
        ));
        assert_eq!(levels.quantity(&k.sku, k.location), 8);
    }

    #[test]
    fn overflowing_quantity_is_refused_not_wrapped() {
        let levels = StockLevels::new();
        let k = key("WIDGET-1", LocationId::new());
        levels.apply_all(&[(k.clone(), i64::MAX)]).unwrap();

        let err = levels.apply_all(&[(k.clone(), 1)]).unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
        assert_eq!(levels.quantity(&k.sku, k.location), i64::MAX);
    }

    #[test]
    fn zero_quantities_drop_out_of_the_snapshot() {
        let levels = StockLevels::new();
        let k = key("WIDGET-1", LocationId::new());
        levels.apply_all(&[(k.clone(), 5)]).unwrap();
        levels.apply_all(&[(k.clone(), -5)]).unwrap();
        assert!(levels.snapshot().is_empty());
        assert_eq!(levels.quantity(&k.sku, k.location), 0);
    }

    #[test]
    fn by_sku_filters_other_products() {
        let levels = StockLevels::new();
        let (a, b) = (LocationId::new(), LocationId::new());
        levels.apply_all(&[(key("WIDGET-1", a), 3)]).unwrap();
        levels.apply_all(&[(key("WIDGET-1", b), 4)]).unwrap();
        levels.apply_all(&[(key("GADGET-9", a), 9)]).unwrap();

        let widget = levels.by_sku(&Sku::new("WIDGET-1").unwrap());
        assert_eq!(widget.len(), 2);
        assert_eq!(widget.iter().map(|(_, q)| q).sum::<i64>(), 7);
    }

    #[test]
    fn replace_swaps_the_whole_map() {
        let levels = StockLevels::new();
        let k = key("WIDGET-1", LocationId::new());
        levels.apply_all(&[(k.clone(), 5)]).unwrap();

        let mut fresh = HashMap::new();
        fresh.insert(k.clone(), 42);
        levels.replace(fresh);
        assert_eq!(levels.quantity(&k.sku, k.location), 42);
    }
}
