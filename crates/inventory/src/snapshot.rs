use stockroom_core::ProductId;
use stockroom_products::Product;
use stockroom_sales::LineItem;

use crate::error::StockError;

/// Point-in-time copy of a product's stock, valid for one reconciliation only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockSnapshot {
    product_id: ProductId,
    quantity: i64,
}

impl StockSnapshot {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    pub fn of(product: &Product) -> Self {
        Self::new(product.id_typed(), product.quantity())
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// Snapshots positionally aligned with a batch of line items.
///
/// `snapshots()[i]` is the stock of `items[i].product_id()`; a product named twice in
/// the batch yields two equal snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProducts {
    snapshots: Vec<StockSnapshot>,
}

impl ResolvedProducts {
    /// Align `found` (unordered, possibly missing some ids) with `items`.
    ///
    /// Fails with every missing product id if any item cannot be resolved; no partial
    /// result escapes.
    pub fn resolve(items: &[LineItem], found: &[Product]) -> Result<Self, StockError> {
        let mut snapshots = Vec::with_capacity(items.len());
        let mut missing: Vec<ProductId> = Vec::new();

        for item in items {
            match found.iter().find(|p| p.id_typed() == item.product_id()) {
                Some(product) => snapshots.push(StockSnapshot::of(product)),
                None => {
                    if !missing.contains(&item.product_id()) {
                        missing.push(item.product_id());
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Err(StockError::UnknownProducts(missing));
        }
        Ok(Self { snapshots })
    }

    /// Lenient variant: keep the items whose product exists, report the rest.
    ///
    /// Returns the surviving items, their aligned snapshots, and the missing ids.
    pub fn resolve_existing(
        items: &[LineItem],
        found: &[Product],
    ) -> (Vec<LineItem>, Self, Vec<ProductId>) {
        let mut kept = Vec::with_capacity(items.len());
        let mut snapshots = Vec::with_capacity(items.len());
        let mut missing: Vec<ProductId> = Vec::new();

        for item in items {
            match found.iter().find(|p| p.id_typed() == item.product_id()) {
                Some(product) => {
                    kept.push(*item);
                    snapshots.push(StockSnapshot::of(product));
                }
                None => {
                    if !missing.contains(&item.product_id()) {
                        missing.push(item.product_id());
                    }
                }
            }
        }

        (kept, Self { snapshots }, missing)
    }

    pub fn snapshots(&self) -> &[StockSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
