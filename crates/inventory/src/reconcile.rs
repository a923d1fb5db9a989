//! Stock plans for the three sale lifecycle transitions.
//!
//! Each plan is computed fully in memory and checked before anything is written, so a
//! rejected plan leaves the product store untouched.

use stockroom_sales::LineItem;

use crate::error::StockError;
use crate::pool::StockPool;
use crate::snapshot::ResolvedProducts;

/// Stock after selling `items`. Fails if any product would go negative.
pub fn plan_decrement(
    items: &[LineItem],
    resolved: &ResolvedProducts,
) -> Result<StockPool, StockError> {
    let pool = StockPool::from_resolved(resolved).consume(items)?;
    pool.ensure_non_negative()?;
    Ok(pool)
}

/// Stock after reversing a sale of `items`.
pub fn plan_increment(
    items: &[LineItem],
    resolved: &ResolvedProducts,
) -> Result<StockPool, StockError> {
    StockPool::from_resolved(resolved).restore(items)
}

/// Stock after replacing a sale's `old_items` with `new_items`.
///
/// The old sale is reversed in memory first; products only touched by the new sale
/// join the pool at their freshly loaded value. A product in both batches keeps its
/// restored value, which already accounts for the stock the old sale held. Per product:
/// `current + old - new`.
pub fn plan_rebalance(
    old_items: &[LineItem],
    old_resolved: &ResolvedProducts,
    new_items: &[LineItem],
    new_resolved: &ResolvedProducts,
) -> Result<StockPool, StockError> {
    let restored = StockPool::from_resolved(old_resolved).restore(old_items)?;
    let merged = restored.merge(&StockPool::from_resolved(new_resolved));
    let pool = merged.consume(new_items)?;
    pool.ensure_non_negative()?;
    Ok(pool)
}
