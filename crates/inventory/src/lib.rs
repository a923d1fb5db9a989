//! Inventory reconciliation math.
//!
//! This crate computes how a sale being created, removed, or rewritten moves product
//! stock, implemented purely as deterministic domain logic (no IO, no HTTP, no storage).
//! Callers load product snapshots, ask this crate for the resulting [`StockPool`], and
//! persist [`StockPool::changes`] themselves.

pub mod error;
pub mod pool;
pub mod reconcile;
pub mod snapshot;

pub use error::StockError;
pub use pool::{StockChange, StockPool};
pub use reconcile::{plan_decrement, plan_increment, plan_rebalance};
pub use snapshot::{ResolvedProducts, StockSnapshot};
