//! Sale lifecycle: create, remove, and update a sale while keeping stock consistent.

use tokio::sync::Mutex;
use tracing::instrument;

use stockroom_core::SaleId;
use stockroom_inventory::plan_rebalance;
use stockroom_sales::{LineItem, Sale, ensure_not_empty};

use crate::store::{ProductStore, SaleStore};

use super::{ReconcileError, StockAdjuster, StockValidator};

/// Orchestrates the sale lifecycle against a product store and a sale store.
///
/// Reconciliations run one at a time: each holds an async lock across its
/// read-check-write sequence so two sales touching the same product cannot both pass
/// their stock check against the same stale snapshot. This only serializes callers of
/// the same coordinator; other processes writing to the same database are not covered.
pub struct SaleCoordinator<P, S> {
    products: P,
    sales: S,
    serial: Mutex<()>,
}

impl<P, S> SaleCoordinator<P, S>
where
    P: ProductStore,
    S: SaleStore,
{
    pub fn new(products: P, sales: S) -> Self {
        Self {
            products,
            sales,
            serial: Mutex::new(()),
        }
    }

    fn validator(&self) -> StockValidator<'_, P> {
        StockValidator::new(&self.products)
    }

    fn adjuster(&self) -> StockAdjuster<'_, P> {
        StockAdjuster::new(&self.products)
    }

    /// Record a sale of `items`, taking them out of stock.
    #[instrument(skip(self, items), fields(items = items.len()), err)]
    pub async fn create_sale(&self, items: Vec<LineItem>) -> Result<Sale, ReconcileError> {
        let sale = Sale::new(SaleId::new(), items)?;
        let _guard = self.serial.lock().await;

        let resolved = self.validator().validate(sale.items()).await?;
        self.adjuster().decrement(sale.items(), &resolved).await?;

        let sale = self.sales.insert(sale).await?;
        tracing::info!(sale_id = %sale.id_typed(), "sale created");
        Ok(sale)
    }

    /// Delete a sale and put its items back into stock.
    ///
    /// Items whose product no longer exists cannot be restored; they are logged and
    /// skipped, and the sale is still removed. If writing the restored stock fails the
    /// sale record is kept.
    #[instrument(skip(self), err)]
    pub async fn remove_sale(&self, id: SaleId) -> Result<Sale, ReconcileError> {
        let _guard = self.serial.lock().await;

        let sale = self
            .sales
            .find_by_id(id)
            .await?
            .ok_or(ReconcileError::SaleNotFound(id))?;

        let (restorable, resolved, missing) =
            self.validator().resolve_existing(sale.items()).await?;
        if !missing.is_empty() {
            tracing::warn!(
                sale_id = %id,
                missing = ?missing,
                "sale references deleted products; their stock is not restored"
            );
        }
        self.adjuster().increment(&restorable, &resolved).await?;

        let removed = self
            .sales
            .delete_by_id(id)
            .await?
            .ok_or(ReconcileError::SaleNotFound(id))?;
        tracing::info!(sale_id = %id, "sale removed");
        Ok(removed)
    }

    /// Replace the items of a sale, moving stock by the difference.
    ///
    /// Per product: `new stock = current + old quantity - new quantity`. The whole plan
    /// is checked before any write.
    #[instrument(skip(self, items), fields(items = items.len()), err)]
    pub async fn update_sale(
        &self,
        id: SaleId,
        items: Vec<LineItem>,
    ) -> Result<Sale, ReconcileError> {
        ensure_not_empty(&items)?;
        let _guard = self.serial.lock().await;

        let existing = self
            .sales
            .find_by_id(id)
            .await?
            .ok_or(ReconcileError::InvalidSaleReference(id))?;

        let (old_items, old_resolved, vanished) =
            self.validator().resolve_existing(existing.items()).await?;
        if !vanished.is_empty() {
            tracing::warn!(
                sale_id = %id,
                missing = ?vanished,
                "previous sale items reference deleted products; their stock is not restored"
            );
        }
        let new_resolved = self.validator().validate(&items).await?;

        let pool = plan_rebalance(&old_items, &old_resolved, &items, &new_resolved)?;
        let written = self.adjuster().persist(&pool).await?;

        let sale = self
            .sales
            .replace_items(id, items)
            .await?
            .ok_or(ReconcileError::InvalidSaleReference(id))?;
        tracing::info!(sale_id = %id, products_written = written, "sale updated");
        Ok(sale)
    }

    pub async fn find_sale(&self, id: SaleId) -> Result<Sale, ReconcileError> {
        self.sales
            .find_by_id(id)
            .await?
            .ok_or(ReconcileError::SaleNotFound(id))
    }

    pub async fn list_sales(&self) -> Result<Vec<Sale>, ReconcileError> {
        Ok(self.sales.find_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::store::{InMemoryProductStore, InMemorySaleStore, StoreError};
    use stockroom_core::ProductId;
    use stockroom_products::{NewProduct, Product};

    type Coordinator = SaleCoordinator<Arc<InMemoryProductStore>, Arc<InMemorySaleStore>>;

    fn product(name: &str, quantity: i64) -> Product {
        Product::new(ProductId::new(), NewProduct::new(name, quantity).unwrap())
    }

    fn item(product: &Product, quantity: i64) -> LineItem {
        LineItem::new(product.id_typed(), quantity).unwrap()
    }

    fn setup(products: &[Product]) -> (Coordinator, Arc<InMemoryProductStore>, Arc<InMemorySaleStore>) {
        let product_store = Arc::new(InMemoryProductStore::with_products(products.to_vec()));
        let sale_store = Arc::new(InMemorySaleStore::new());
        let coordinator = SaleCoordinator::new(product_store.clone(), sale_store.clone());
        (coordinator, product_store, sale_store)
    }

    async fn stock(store: &InMemoryProductStore, product: &Product) -> i64 {
        store
            .find_by_id(product.id_typed())
            .await
            .unwrap()
            .expect("product exists")
            .quantity()
    }

    #[tokio::test]
    async fn create_sale_decrements_stock_and_records_the_sale() {
        let p1 = product("Produto P1", 10);
        let (coordinator, products, sales) = setup(&[p1.clone()]);

        let sale = coordinator.create_sale(vec![item(&p1, 3)]).await.unwrap();

        assert_eq!(sale.items(), &[item(&p1, 3)]);
        assert_eq!(stock(&products, &p1).await, 7);
        assert_eq!(sales.find_by_id(sale.id_typed()).await.unwrap(), Some(sale));
    }

    #[tokio::test]
    async fn remove_sale_restores_stock() {
        let p1 = product("Produto P1", 10);
        let (coordinator, products, sales) = setup(&[p1.clone()]);

        let sale = coordinator.create_sale(vec![item(&p1, 3)]).await.unwrap();
        let removed = coordinator.remove_sale(sale.id_typed()).await.unwrap();

        assert_eq!(removed, sale);
        assert_eq!(stock(&products, &p1).await, 10);
        assert!(sales.find_by_id(sale.id_typed()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_then_remove_restores_every_touched_product() {
        let (a, b, c) = (
            product("Produto A1", 10),
            product("Produto B2", 5),
            product("Produto C3", 1),
        );
        let (coordinator, products, _) = setup(&[a.clone(), b.clone(), c.clone()]);

        let sale = coordinator
            .create_sale(vec![item(&a, 2), item(&b, 5), item(&a, 3), item(&c, 1)])
            .await
            .unwrap();
        assert_eq!(stock(&products, &a).await, 5);
        assert_eq!(stock(&products, &b).await, 0);
        assert_eq!(stock(&products, &c).await, 0);

        coordinator.remove_sale(sale.id_typed()).await.unwrap();
        assert_eq!(stock(&products, &a).await, 10);
        assert_eq!(stock(&products, &b).await, 5);
        assert_eq!(stock(&products, &c).await, 1);
    }

    #[tokio::test]
    async fn overselling_is_rejected_and_leaves_stock_untouched() {
        let (p, q) = (product("Produto P1", 5), product("Produto Q2", 10));
        let (coordinator, products, sales) = setup(&[p.clone(), q.clone()]);

        let err = coordinator
            .create_sale(vec![item(&q, 2), item(&p, 6)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::InsufficientStock { product_id, shortfall: 1 } if product_id == p.id_typed()
        ));
        assert_eq!(stock(&products, &p).await, 5);
        assert_eq!(stock(&products, &q).await, 10);
        assert!(sales.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_products_are_rejected_before_any_write() {
        let p = product("Produto P1", 5);
        let (coordinator, products, sales) = setup(&[p.clone()]);

        let err = coordinator
            .create_sale(vec![item(&p, 1), LineItem::new(ProductId::new(), 1).unwrap()])
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::InvalidProductReference { .. }));
        assert_eq!(err.to_string(), "invalid product reference");
        assert_eq!(stock(&products, &p).await, 5);
        assert!(sales.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_restores_old_quantity_before_applying_the_new_one() {
        let p = product("Produto P1", 14);
        let (coordinator, products, _) = setup(&[p.clone()]);
        let sale = coordinator.create_sale(vec![item(&p, 4)]).await.unwrap();
        assert_eq!(stock(&products, &p).await, 10);

        let updated = coordinator
            .update_sale(sale.id_typed(), vec![item(&p, 6)])
            .await
            .unwrap();

        assert_eq!(updated.items(), &[item(&p, 6)]);
        assert_eq!(stock(&products, &p).await, 8);
    }

    #[tokio::test]
    async fn update_with_disjoint_products_moves_each_independently() {
        let (a, b) = (product("Produto A1", 14), product("Produto B2", 10));
        let (coordinator, products, _) = setup(&[a.clone(), b.clone()]);
        let sale = coordinator.create_sale(vec![item(&a, 4)]).await.unwrap();

        coordinator
            .update_sale(sale.id_typed(), vec![item(&b, 6)])
            .await
            .unwrap();

        assert_eq!(stock(&products, &a).await, 14);
        assert_eq!(stock(&products, &b).await, 4);
    }

    #[tokio::test]
    async fn rejected_update_leaves_stock_and_sale_untouched() {
        let (a, b) = (product("Produto A1", 10), product("Produto B2", 3));
        let (coordinator, products, sales) = setup(&[a.clone(), b.clone()]);
        let sale = coordinator.create_sale(vec![item(&a, 4)]).await.unwrap();

        let err = coordinator
            .update_sale(sale.id_typed(), vec![item(&a, 1), item(&b, 4)])
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::InsufficientStock { .. }));

        let err = coordinator
            .update_sale(sale.id_typed(), vec![LineItem::new(ProductId::new(), 1).unwrap()])
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidProductReference { .. }));

        assert_eq!(stock(&products, &a).await, 6);
        assert_eq!(stock(&products, &b).await, 3);
        assert_eq!(
            sales.find_by_id(sale.id_typed()).await.unwrap().unwrap().items(),
            &[item(&a, 4)]
        );
    }

    #[tokio::test]
    async fn missing_sales_are_reported_per_operation() {
        let p = product("Produto P1", 10);
        let (coordinator, _, _) = setup(&[p.clone()]);
        let ghost = SaleId::new();

        assert!(matches!(
            coordinator.remove_sale(ghost).await,
            Err(ReconcileError::SaleNotFound(id)) if id == ghost
        ));
        assert!(matches!(
            coordinator.update_sale(ghost, vec![item(&p, 1)]).await,
            Err(ReconcileError::InvalidSaleReference(id)) if id == ghost
        ));
        assert!(matches!(
            coordinator.find_sale(ghost).await,
            Err(ReconcileError::SaleNotFound(_))
        ));
    }

    #[tokio::test]
    async fn removing_a_sale_whose_product_was_deleted_restores_the_rest() {
        let (a, b) = (product("Produto A1", 10), product("Produto B2", 10));
        let (coordinator, products, sales) = setup(&[a.clone(), b.clone()]);
        let sale = coordinator
            .create_sale(vec![item(&a, 2), item(&b, 3)])
            .await
            .unwrap();

        products.delete(b.id_typed()).await.unwrap();
        coordinator.remove_sale(sale.id_typed()).await.unwrap();

        assert_eq!(stock(&products, &a).await, 10);
        assert!(sales.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn updating_a_sale_whose_product_was_deleted_rebalances_the_rest() {
        let (a, b) = (product("Produto A1", 10), product("Produto B2", 10));
        let (coordinator, products, sales) = setup(&[a.clone(), b.clone()]);
        let sale = coordinator
            .create_sale(vec![item(&a, 2), item(&b, 3)])
            .await
            .unwrap();
        assert_eq!(stock(&products, &a).await, 8);

        products.delete(b.id_typed()).await.unwrap();
        let updated = coordinator
            .update_sale(sale.id_typed(), vec![item(&a, 5)])
            .await
            .unwrap();

        // 8 on hand + 2 from the old sale - 5 for the new one.
        assert_eq!(stock(&products, &a).await, 5);
        assert_eq!(updated.items(), &[item(&a, 5)]);
        assert_eq!(
            sales.find_by_id(sale.id_typed()).await.unwrap().unwrap().items(),
            &[item(&a, 5)]
        );
        assert!(products.find_by_id(b.id_typed()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_sales_returns_every_recorded_sale() {
        let p = product("Produto P1", 10);
        let (coordinator, _, _) = setup(&[p.clone()]);
        let first = coordinator.create_sale(vec![item(&p, 1)]).await.unwrap();
        let second = coordinator.create_sale(vec![item(&p, 2)]).await.unwrap();

        let all = coordinator.list_sales().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&first) && all.contains(&second));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sales_never_oversell() {
        let p = product("Produto P1", 10);
        let (coordinator, products, sales) = setup(&[p.clone()]);
        let coordinator = Arc::new(coordinator);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let coordinator = coordinator.clone();
                let line = item(&p, 1);
                tokio::spawn(async move { coordinator.create_sale(vec![line]).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 10);
        assert_eq!(stock(&products, &p).await, 0);
        assert_eq!(sales.find_all().await.unwrap().len(), 10);
    }

    /// Product store whose stock writes fail for one product.
    struct FailingWrites {
        inner: InMemoryProductStore,
        broken: ProductId,
    }

    #[async_trait]
    impl ProductStore for FailingWrites {
        async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
            self.inner.find_by_name(name).await
        }

        async fn find_many_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
            self.inner.find_many_by_id(ids).await
        }

        async fn list(&self) -> Result<Vec<Product>, StoreError> {
            self.inner.list().await
        }

        async fn insert(&self, product: Product) -> Result<Product, StoreError> {
            self.inner.insert(product).await
        }

        async fn update(&self, product: Product) -> Result<Option<Product>, StoreError> {
            self.inner.update(product).await
        }

        async fn set_quantity(
            &self,
            id: ProductId,
            quantity: i64,
        ) -> Result<Option<Product>, StoreError> {
            if id == self.broken {
                return Err(StoreError::Backend("disk on fire".to_string()));
            }
            self.inner.set_quantity(id, quantity).await
        }

        async fn delete(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn failed_stock_write_surfaces_and_records_no_sale() {
        let (a, b) = (product("Produto A1", 10), product("Produto B2", 10));
        let products = Arc::new(FailingWrites {
            inner: InMemoryProductStore::with_products([a.clone(), b.clone()]),
            broken: b.id_typed(),
        });
        let sales = Arc::new(InMemorySaleStore::new());
        let coordinator = SaleCoordinator::new(products.clone(), sales.clone());

        let err = coordinator
            .create_sale(vec![item(&a, 1), item(&b, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Store(StoreError::Backend(_))));
        assert!(sales.find_all().await.unwrap().is_empty());
        // No cross-product atomicity: the healthy write went through.
        assert_eq!(
            products.find_by_id(a.id_typed()).await.unwrap().unwrap().quantity(),
            9
        );
    }

    #[tokio::test]
    async fn failed_restore_keeps_the_sale() {
        let a = product("Produto A1", 10);
        let inner = InMemoryProductStore::with_products([a.clone()]);
        let sales = Arc::new(InMemorySaleStore::new());
        let sale = Sale::new(SaleId::new(), vec![item(&a, 2)]).unwrap();
        sales.insert(sale.clone()).await.unwrap();

        let coordinator = SaleCoordinator::new(
            FailingWrites {
                inner,
                broken: a.id_typed(),
            },
            sales.clone(),
        );

        let err = coordinator.remove_sale(sale.id_typed()).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Store(_)));
        assert_eq!(sales.find_by_id(sale.id_typed()).await.unwrap(), Some(sale));
    }
}
