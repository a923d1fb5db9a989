use futures::future::join_all;

use stockroom_inventory::{ResolvedProducts, StockPool, plan_decrement, plan_increment};
use stockroom_sales::LineItem;

use crate::store::{ProductStore, StoreError};

use super::ReconcileError;

/// Applies stock plans to the product store.
pub struct StockAdjuster<'a, P: ?Sized> {
    products: &'a P,
}

impl<'a, P> StockAdjuster<'a, P>
where
    P: ProductStore + ?Sized,
{
    pub fn new(products: &'a P) -> Self {
        Self { products }
    }

    /// Take `items` out of stock.
    ///
    /// All subtractions are checked before anything is written: an oversell leaves
    /// the store untouched. Returns the items on success.
    pub async fn decrement(
        &self,
        items: &[LineItem],
        resolved: &ResolvedProducts,
    ) -> Result<Vec<LineItem>, ReconcileError> {
        let pool = plan_decrement(items, resolved)?;
        self.persist(&pool).await?;
        Ok(items.to_vec())
    }

    /// Put `items` back into stock.
    pub async fn increment(
        &self,
        items: &[LineItem],
        resolved: &ResolvedProducts,
    ) -> Result<(), ReconcileError> {
        let pool = plan_increment(items, resolved)?;
        self.persist(&pool).await?;
        Ok(())
    }

    /// Write every changed quantity in `pool`.
    ///
    /// Writes run concurrently and are awaited together. There is no atomicity across
    /// products: on failure the first error is returned and the successful writes stay.
    pub async fn persist(&self, pool: &StockPool) -> Result<usize, ReconcileError> {
        let changes = pool.changes();
        if changes.is_empty() {
            return Ok(0);
        }

        let writes = changes
            .iter()
            .map(|change| self.products.set_quantity(change.product_id, change.quantity));
        let results = join_all(writes).await;

        let mut first_error: Option<StoreError> = None;
        for (change, result) in changes.iter().zip(results) {
            match result {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::warn!(
                        product_id = %change.product_id,
                        "product vanished before its stock could be written"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        product_id = %change.product_id,
                        quantity = change.quantity,
                        error = %err,
                        "stock write failed; other products in this batch may already be updated"
                    );
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(changes.len()),
        }
    }
}
