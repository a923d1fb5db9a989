use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockroom_core::{ProductId, SaleId};
use stockroom_products::Product;
use stockroom_sales::{LineItem, Sale};

use super::{ProductStore, SaleStore, StoreError};

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// In-memory product store for tests/dev.
///
/// Mirrors the Postgres schema rules: names are unique and stock is never negative.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `products` (dev fixtures and tests).
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products.into_iter().map(|p| (p.id_typed(), p)).collect();
        Self {
            products: RwLock::new(map),
        }
    }

    fn ensure_name_free(
        map: &HashMap<ProductId, Product>,
        name: &str,
        owner: ProductId,
    ) -> Result<(), StoreError> {
        if map.values().any(|p| p.name() == name && p.id_typed() != owner) {
            return Err(StoreError::Conflict(format!("product name '{name}' already taken")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let map = self.products.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let map = self.products.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|p| p.name() == name).cloned())
    }

    async fn find_many_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let map = self.products.read().map_err(|_| poisoned())?;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let map = self.products.read().map_err(|_| poisoned())?;
        let mut products: Vec<Product> = map.values().cloned().collect();
        // UUIDv7 ids sort by creation time.
        products.sort_by_key(|p| p.id_typed());
        Ok(products)
    }

    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let mut map = self.products.write().map_err(|_| poisoned())?;
        if map.contains_key(&product.id_typed()) {
            return Err(StoreError::Conflict(format!(
                "product {} already exists",
                product.id_typed()
            )));
        }
        Self::ensure_name_free(&map, product.name(), product.id_typed())?;
        map.insert(product.id_typed(), product.clone());
        Ok(product)
    }

    async fn update(&self, product: Product) -> Result<Option<Product>, StoreError> {
        let mut map = self.products.write().map_err(|_| poisoned())?;
        if !map.contains_key(&product.id_typed()) {
            return Ok(None);
        }
        Self::ensure_name_free(&map, product.name(), product.id_typed())?;
        map.insert(product.id_typed(), product.clone());
        Ok(Some(product))
    }

    async fn set_quantity(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> Result<Option<Product>, StoreError> {
        let mut map = self.products.write().map_err(|_| poisoned())?;
        let Some(current) = map.get(&id) else {
            return Ok(None);
        };
        let updated = current
            .with_quantity(quantity)
            .map_err(|e| StoreError::Constraint(e.to_string()))?;
        map.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let mut map = self.products.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id))
    }
}

/// In-memory sales ledger for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySaleStore {
    sales: RwLock<HashMap<SaleId, Sale>>,
}

impl InMemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaleStore for InMemorySaleStore {
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>, StoreError> {
        let map = self.sales.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Sale>, StoreError> {
        let map = self.sales.read().map_err(|_| poisoned())?;
        let mut sales: Vec<Sale> = map.values().cloned().collect();
        sales.sort_by_key(|s| s.id_typed());
        Ok(sales)
    }

    async fn insert(&self, sale: Sale) -> Result<Sale, StoreError> {
        let mut map = self.sales.write().map_err(|_| poisoned())?;
        if map.contains_key(&sale.id_typed()) {
            return Err(StoreError::Conflict(format!(
                "sale {} already exists",
                sale.id_typed()
            )));
        }
        map.insert(sale.id_typed(), sale.clone());
        Ok(sale)
    }

    async fn replace_items(
        &self,
        id: SaleId,
        items: Vec<LineItem>,
    ) -> Result<Option<Sale>, StoreError> {
        let mut map = self.sales.write().map_err(|_| poisoned())?;
        let Some(current) = map.get(&id) else {
            return Ok(None);
        };
        let updated = current
            .with_items(items)
            .map_err(|e| StoreError::Constraint(e.to_string()))?;
        map.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: SaleId) -> Result<Option<Sale>, StoreError> {
        let mut map = self.sales.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id))
    }
}
