//! Product catalog: direct create/edit/delete of products.
//!
//! Catalog edits are not reconciled against sales. Setting a quantity here overwrites
//! whatever stock the ledger has produced so far.

use thiserror::Error;
use tracing::instrument;

use stockroom_core::{DomainError, ProductId};
use stockroom_products::{NewProduct, Product};

use crate::store::{ProductStore, StoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product already exists: {0}")]
    DuplicateProduct(String),

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::DuplicateProduct(msg),
            other => Self::Store(other),
        }
    }
}

pub struct ProductCatalog<P> {
    products: P,
}

impl<P> ProductCatalog<P>
where
    P: ProductStore,
{
    pub fn new(products: P) -> Self {
        Self { products }
    }

    #[instrument(skip(self, input), fields(name = input.name()), err)]
    pub async fn create(&self, input: NewProduct) -> Result<Product, CatalogError> {
        if self.products.find_by_name(input.name()).await?.is_some() {
            return Err(CatalogError::DuplicateProduct(input.name().to_string()));
        }
        let product = self
            .products
            .insert(Product::new(ProductId::new(), input))
            .await?;
        tracing::info!(product_id = %product.id_typed(), "product created");
        Ok(product)
    }

    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    pub async fn find(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Rename a product and/or set its stock by hand.
    #[instrument(skip(self, input), fields(name = input.name()), err)]
    pub async fn update(&self, id: ProductId, input: NewProduct) -> Result<Product, CatalogError> {
        let current = self.find(id).await?;
        if let Some(other) = self.products.find_by_name(input.name()).await? {
            if other.id_typed() != id {
                return Err(CatalogError::DuplicateProduct(input.name().to_string()));
            }
        }
        let product = self
            .products
            .update(current.edited(input))
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;
        tracing::info!(product_id = %id, quantity = product.quantity(), "product updated");
        Ok(product)
    }

    #[instrument(skip(self), err)]
    pub async fn remove(&self, id: ProductId) -> Result<Product, CatalogError> {
        let removed = self
            .products
            .delete(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;
        tracing::info!(product_id = %id, "product removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryProductStore;

    fn input(name: &str, quantity: i64) -> NewProduct {
        NewProduct::new(name, quantity).unwrap()
    }

    fn catalog() -> ProductCatalog<InMemoryProductStore> {
        ProductCatalog::new(InMemoryProductStore::new())
    }

    #[tokio::test]
    async fn create_assigns_an_id_and_lists_the_product() {
        let catalog = catalog();
        let created = catalog.create(input("Martelo de Thor", 10)).await.unwrap();

        assert_eq!(created.quantity(), 10);
        assert_eq!(catalog.list().await.unwrap(), vec![created.clone()]);
        assert_eq!(catalog.find(created.id_typed()).await.unwrap(), created);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_names() {
        let catalog = catalog();
        catalog.create(input("Martelo de Thor", 10)).await.unwrap();

        let err = catalog.create(input("Martelo de Thor", 3)).await.unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateProduct(name) if name == "Martelo de Thor"));
    }

    #[tokio::test]
    async fn update_keeps_its_own_name_but_not_someone_elses() {
        let catalog = catalog();
        let hammer = catalog.create(input("Martelo de Thor", 10)).await.unwrap();
        catalog.create(input("Escudo do Capitão", 2)).await.unwrap();

        let updated = catalog
            .update(hammer.id_typed(), input("Martelo de Thor", 25))
            .await
            .unwrap();
        assert_eq!(updated.quantity(), 25);

        let err = catalog
            .update(hammer.id_typed(), input("Escudo do Capitão", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateProduct(_)));
    }

    #[tokio::test]
    async fn missing_products_are_reported() {
        let catalog = catalog();
        let ghost = ProductId::new();

        assert!(matches!(catalog.find(ghost).await, Err(CatalogError::ProductNotFound(id)) if id == ghost));
        assert!(matches!(
            catalog.update(ghost, input("Martelo de Thor", 1)).await,
            Err(CatalogError::ProductNotFound(_))
        ));
        assert!(matches!(catalog.remove(ghost).await, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn remove_returns_the_deleted_product() {
        let catalog = catalog();
        let hammer = catalog.create(input("Martelo de Thor", 10)).await.unwrap();

        assert_eq!(catalog.remove(hammer.id_typed()).await.unwrap(), hammer);
        assert!(catalog.list().await.unwrap().is_empty());
    }
}
