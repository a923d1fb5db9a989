//! Infrastructure layer: stores, reconciliation orchestration, config.

pub mod catalog;
pub mod config;
pub mod db;
pub mod reconciliation;
pub mod store;

pub use catalog::{CatalogError, ProductCatalog};
pub use reconciliation::{ReconcileError, SaleCoordinator};
pub use store::{ProductStore, SaleStore, StoreError};
