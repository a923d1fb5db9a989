use stockroom_core::ProductId;
use stockroom_inventory::ResolvedProducts;
use stockroom_sales::{LineItem, distinct_product_ids, ensure_not_empty};

use crate::store::ProductStore;

use super::ReconcileError;

/// Resolves the products a batch of line items refers to.
pub struct StockValidator<'a, P: ?Sized> {
    products: &'a P,
}

impl<'a, P> StockValidator<'a, P>
where
    P: ProductStore + ?Sized,
{
    pub fn new(products: &'a P) -> Self {
        Self { products }
    }

    /// Snapshots aligned 1:1 with `items`, or `InvalidProductReference` if any product
    /// is unknown.
    pub async fn validate(&self, items: &[LineItem]) -> Result<ResolvedProducts, ReconcileError> {
        ensure_not_empty(items)?;
        let found = self
            .products
            .find_many_by_id(&distinct_product_ids(items))
            .await?;
        Ok(ResolvedProducts::resolve(items, &found)?)
    }

    /// Like [`validate`](Self::validate) but keeps going when products have vanished.
    ///
    /// Returns the items that still resolve, their snapshots, and the missing ids.
    pub async fn resolve_existing(
        &self,
        items: &[LineItem],
    ) -> Result<(Vec<LineItem>, ResolvedProducts, Vec<ProductId>), ReconcileError> {
        let found = self
            .products
            .find_many_by_id(&distinct_product_ids(items))
            .await?;
        Ok(ResolvedProducts::resolve_existing(items, &found))
    }
}
