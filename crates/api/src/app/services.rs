use std::sync::Arc;

use sqlx::PgPool;

use stockroom_infra::config::StoreBackend;
use stockroom_infra::db;
use stockroom_infra::store::{
    InMemoryProductStore, InMemorySaleStore, PostgresProductStore, PostgresSaleStore,
};
use stockroom_infra::{ProductCatalog, ProductStore, SaleCoordinator, SaleStore, StoreError};

pub type SharedProductStore = Arc<dyn ProductStore>;
pub type SharedSaleStore = Arc<dyn SaleStore>;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub catalog: ProductCatalog<SharedProductStore>,
    pub sales: SaleCoordinator<SharedProductStore, SharedSaleStore>,
    pool: Option<PgPool>,
}

impl AppServices {
    fn new(products: SharedProductStore, sales: SharedSaleStore, pool: Option<PgPool>) -> Self {
        Self {
            catalog: ProductCatalog::new(products.clone()),
            sales: SaleCoordinator::new(products, sales),
            pool,
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryProductStore::new()),
            Arc::new(InMemorySaleStore::new()),
            None,
        )
    }

    /// Postgres wiring over an existing pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PostgresProductStore::new(pool.clone())),
            Arc::new(PostgresSaleStore::new(pool.clone())),
            Some(pool),
        )
    }

    /// Release the database pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("database pool closed");
        }
    }
}

/// Build services for the configured backend.
pub async fn build_services(backend: &StoreBackend) -> Result<AppServices, StoreError> {
    match backend {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory stores");
            Ok(AppServices::in_memory())
        }
        StoreBackend::Postgres(config) => {
            tracing::info!("using postgres stores");
            let pool = db::connect(config).await?;
            db::ensure_schema(&pool).await?;
            Ok(AppServices::postgres(pool))
        }
    }
}
