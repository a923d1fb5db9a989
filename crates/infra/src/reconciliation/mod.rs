//! Inventory reconciliation: keeps product stock in step with the sales ledger.
//!
//! ```text
//! line items
//!   ↓
//! 1. StockValidator   resolve every product id (one bulk lookup)
//!   ↓
//! 2. stock plan       restore / merge / consume in memory (stockroom-inventory)
//!   ↓
//! 3. StockAdjuster    reject negative stock, then write changed quantities
//!   ↓
//! 4. SaleStore        insert / replace / delete the sale record
//! ```
//!
//! The first failing step short-circuits the rest. Per-product writes in step 3 are
//! independent: if one of them fails the others may already be applied, and nothing
//! rolls them back.

use thiserror::Error;

use stockroom_core::{DomainError, ProductId, SaleId};
use stockroom_inventory::StockError;

use crate::store::StoreError;

pub mod adjuster;
pub mod coordinator;
pub mod validator;

pub use adjuster::StockAdjuster;
pub use coordinator::SaleCoordinator;
pub use validator::StockValidator;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A line item names a product that does not exist.
    #[error("invalid product reference")]
    InvalidProductReference { missing: Vec<ProductId> },

    /// The requested quantities exceed available stock. Nothing was persisted.
    #[error("insufficient stock for product {product_id}: short by {shortfall}")]
    InsufficientStock { product_id: ProductId, shortfall: i64 },

    #[error("sale not found: {0}")]
    SaleNotFound(SaleId),

    /// The sale an update refers to does not exist.
    #[error("invalid sale reference: {0}")]
    InvalidSaleReference(SaleId),

    /// The sale request itself is malformed (e.g. no line items).
    #[error(transparent)]
    InvalidSale(#[from] DomainError),

    #[error("stock computation failed: {0}")]
    Stock(StockError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<StockError> for ReconcileError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::UnknownProducts(missing) => Self::InvalidProductReference { missing },
            StockError::InsufficientStock {
                product_id,
                shortfall,
            } => Self::InsufficientStock {
                product_id,
                shortfall,
            },
            other => Self::Stock(other),
        }
    }
}
