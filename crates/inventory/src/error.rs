use thiserror::Error;

use stockroom_core::ProductId;

/// Failure of a stock computation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// One or more line items name products that were not found.
    #[error("invalid product reference")]
    UnknownProducts(Vec<ProductId>),

    /// Applying the requested decrement would drive stock below zero.
    #[error("insufficient stock for product {product_id}: short by {shortfall}")]
    InsufficientStock { product_id: ProductId, shortfall: i64 },

    /// A line item targets a product that is not part of the pool being adjusted.
    #[error("product {0} is not part of this reconciliation")]
    NotInPool(ProductId),

    #[error("stock quantity overflow for product {0}")]
    Overflow(ProductId),
}
