//! Immutable stock pool used while reconciling one operation.
//!
//! Every adjustment returns a new pool; nothing is mutated in place, so a product that
//! appears in two overlapping batches is never aliased.

use std::collections::BTreeMap;

use stockroom_core::ProductId;
use stockroom_sales::LineItem;

use crate::error::StockError;
use crate::snapshot::ResolvedProducts;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct PoolEntry {
    /// Quantity as loaded from the product store.
    loaded: i64,
    /// Quantity after the adjustments applied so far.
    quantity: i64,
}

/// A product whose stock must be written back.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Per-product stock keyed by identity, one entry per distinct product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockPool {
    entries: BTreeMap<ProductId, PoolEntry>,
}

impl StockPool {
    pub fn from_resolved(resolved: &ResolvedProducts) -> Self {
        let mut entries = BTreeMap::new();
        for snapshot in resolved.snapshots() {
            entries.entry(snapshot.product_id()).or_insert(PoolEntry {
                loaded: snapshot.quantity(),
                quantity: snapshot.quantity(),
            });
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.entries.contains_key(&product_id)
    }

    /// Current (adjusted) quantity of a product.
    pub fn quantity_of(&self, product_id: ProductId) -> Option<i64> {
        self.entries.get(&product_id).map(|e| e.quantity)
    }

    /// Add every item's quantity back to its product.
    pub fn restore(&self, items: &[LineItem]) -> Result<Self, StockError> {
        self.adjust(items, |quantity, delta| quantity.checked_add(delta))
    }

    /// Subtract every item's quantity from its product.
    ///
    /// Quantities may go negative here; call [`StockPool::ensure_non_negative`] before
    /// persisting anything.
    pub fn consume(&self, items: &[LineItem]) -> Result<Self, StockError> {
        self.adjust(items, |quantity, delta| quantity.checked_sub(delta))
    }

    /// Combine this pool with a freshly loaded one.
    ///
    /// Entries of `self` win: a product present in both keeps the value from `self`
    /// and the fresh value is dropped. Products only in `fresh` are added as loaded.
    pub fn merge(&self, fresh: &StockPool) -> Self {
        let mut entries = self.entries.clone();
        for (product_id, entry) in &fresh.entries {
            entries.entry(*product_id).or_insert(*entry);
        }
        Self { entries }
    }

    /// Fails with the first product (by id order) whose stock went below zero.
    pub fn ensure_non_negative(&self) -> Result<(), StockError> {
        match self.entries.iter().find(|(_, e)| e.quantity < 0) {
            Some((product_id, entry)) => Err(StockError::InsufficientStock {
                product_id: *product_id,
                shortfall: -entry.quantity,
            }),
            None => Ok(()),
        }
    }

    /// Products whose quantity differs from what was loaded.
    pub fn changes(&self) -> Vec<StockChange> {
        self.entries
            .iter()
            .filter(|(_, e)| e.quantity != e.loaded)
            .map(|(product_id, e)| StockChange {
                product_id: *product_id,
                quantity: e.quantity,
            })
            .collect()
    }

    fn adjust(
        &self,
        items: &[LineItem],
        op: impl Fn(i64, i64) -> Option<i64>,
    ) -> Result<Self, StockError> {
        let mut entries = self.entries.clone();
        for item in items {
            let product_id = item.product_id();
            let entry = entries
                .get_mut(&product_id)
                .ok_or(StockError::NotInPool(product_id))?;
            entry.quantity =
                op(entry.quantity, item.quantity()).ok_or(StockError::Overflow(product_id))?;
        }
        Ok(Self { entries })
    }
}
