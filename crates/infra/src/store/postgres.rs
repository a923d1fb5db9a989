//! Postgres-backed product and sale stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate product name or id |
//! | Database (check constraint violation) | `23514` | `Constraint` | Negative stock |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed / PoolTimedOut | N/A | `Backend` | Pool exhausted or shut down |
//! | Other | N/A | `Backend` | Network errors, connection failures, etc. |
//!
//! Sale items are stored as a `JSONB` array on the sale row, so a sale is always read
//! and replaced as a whole.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stockroom_core::{ProductId, SaleId};
use stockroom_products::Product;
use stockroom_sales::{LineItem, Sale};

use super::{ProductStore, SaleStore, StoreError};

/// Postgres-backed catalog.
///
/// `PgPool` is internally reference counted; cloning the store shares the pool.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Postgres-backed sales ledger.
#[derive(Debug, Clone)]
pub struct PostgresSaleStore {
    pool: PgPool,
}

impl PostgresSaleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23514") => StoreError::Constraint(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Backend(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::Corrupt(format!("{operation}: column {index}: {source}"))
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| map_sqlx_error("decode product", e))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| map_sqlx_error("decode product", e))?;
    let quantity: i64 = row
        .try_get("quantity")
        .map_err(|e| map_sqlx_error("decode product", e))?;

    Product::restore(ProductId::from_uuid(id), name, quantity)
        .map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn sale_from_row(row: &PgRow) -> Result<Sale, StoreError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| map_sqlx_error("decode sale", e))?;
    let Json(items): Json<Vec<LineItem>> = row
        .try_get("items")
        .map_err(|e| map_sqlx_error("decode sale", e))?;

    Sale::new(SaleId::from_uuid(id), items).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name, quantity FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name, quantity FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_name", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, ids), fields(ids = ids.len()), err)]
    async fn find_many_by_id(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query("SELECT id, name, quantity FROM products WHERE id = ANY($1)")
            .bind(&uuids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_many_by_id", e))?;

        rows.iter().map(product_from_row).collect()
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT id, name, quantity FROM products ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query("INSERT INTO products (id, name, quantity) VALUES ($1, $2, $3)")
            .bind(product.id_typed().as_uuid())
            .bind(product.name())
            .bind(product.quantity())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(product)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    async fn update(&self, product: Product) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, quantity = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, quantity
            "#,
        )
        .bind(product.id_typed().as_uuid())
        .bind(product.name())
        .bind(product.quantity())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn set_quantity(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET quantity = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, quantity
            "#,
        )
        .bind(id.as_uuid())
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_quantity", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("DELETE FROM products WHERE id = $1 RETURNING id, name, quantity")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        row.as_ref().map(product_from_row).transpose()
    }
}

#[async_trait]
impl SaleStore for PostgresSaleStore {
    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>, StoreError> {
        let row = sqlx::query("SELECT id, items FROM sales WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(sale_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Sale>, StoreError> {
        let rows = sqlx::query("SELECT id, items FROM sales ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all", e))?;

        rows.iter().map(sale_from_row).collect()
    }

    #[instrument(skip(self, sale), fields(sale_id = %sale.id_typed()), err)]
    async fn insert(&self, sale: Sale) -> Result<Sale, StoreError> {
        sqlx::query("INSERT INTO sales (id, items) VALUES ($1, $2)")
            .bind(sale.id_typed().as_uuid())
            .bind(Json(sale.items()))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(sale)
    }

    #[instrument(skip(self, items), fields(items = items.len()), err)]
    async fn replace_items(
        &self,
        id: SaleId,
        items: Vec<LineItem>,
    ) -> Result<Option<Sale>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE sales
            SET items = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, items
            "#,
        )
        .bind(id.as_uuid())
        .bind(Json(&items))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace_items", e))?;

        row.as_ref().map(sale_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn delete_by_id(&self, id: SaleId) -> Result<Option<Sale>, StoreError> {
        let row = sqlx::query("DELETE FROM sales WHERE id = $1 RETURNING id, items")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_by_id", e))?;

        row.as_ref().map(sale_from_row).transpose()
    }
}
