//! Product and sale storage boundaries.
//!
//! The reconciliation engine only talks to these traits. Backends:
//! - [`in_memory`]: tests/dev
//! - [`postgres`]: persistent, via sqlx
//!
//! Stores are plain document stores: they do not coordinate writes across records.
//! Each call either completes or fails on its own.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{ProductId, SaleId};
use stockroom_products::Product;
use stockroom_sales::{LineItem, Sale};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryProductStore, InMemorySaleStore};
pub use postgres::{PostgresProductStore, PostgresSaleStore};

/// Store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors (validation,
/// invariants, stock rules).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A uniqueness rule was violated (e.g. duplicate product name).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored-value rule was violated (e.g. negative stock).
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// A stored record could not be decoded into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Connection, pool, or other backend failure.
    #[error("storage error: {0}")]
    Backend(String),
}

/// Catalog persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Exact, case-sensitive name match.
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// Bulk lookup. The result is unordered and silently omits unknown ids.
    async fn find_many_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn insert(&self, product: Product) -> Result<Product, StoreError>;

    /// Replace name and quantity of an existing product. `None` if it does not exist.
    async fn update(&self, product: Product) -> Result<Option<Product>, StoreError>;

    /// Overwrite the stock of one product. `None` if it does not exist.
    async fn set_quantity(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> Result<Option<Product>, StoreError>;

    async fn delete(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
}

/// Sales ledger persistence.
#[async_trait]
pub trait SaleStore: Send + Sync {
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Sale>, StoreError>;

    async fn insert(&self, sale: Sale) -> Result<Sale, StoreError>;

    /// Replace the items of a sale wholesale. `None` if the sale does not exist.
    async fn replace_items(
        &self,
        id: SaleId,
        items: Vec<LineItem>,
    ) -> Result<Option<Sale>, StoreError>;

    /// Delete a sale, returning the removed record.
    async fn delete_by_id(&self, id: SaleId) -> Result<Option<Sale>, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        (**self).find_by_name(name).await
    }

    async fn find_many_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        (**self).find_many_by_id(ids).await
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list().await
    }

    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        (**self).insert(product).await
    }

    async fn update(&self, product: Product) -> Result<Option<Product>, StoreError> {
        (**self).update(product).await
    }

    async fn set_quantity(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> Result<Option<Product>, StoreError> {
        (**self).set_quantity(id, quantity).await
    }

    async fn delete(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<S> SaleStore for Arc<S>
where
    S: SaleStore + ?Sized,
{
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Sale>, StoreError> {
        (**self).find_all().await
    }

    async fn insert(&self, sale: Sale) -> Result<Sale, StoreError> {
        (**self).insert(sale).await
    }

    async fn replace_items(
        &self,
        id: SaleId,
        items: Vec<LineItem>,
    ) -> Result<Option<Sale>, StoreError> {
        (**self).replace_items(id, items).await
    }

    async fn delete_by_id(&self, id: SaleId) -> Result<Option<Sale>, StoreError> {
        (**self).delete_by_id(id).await
    }
}
