//! Sales domain module.
//!
//! A sale is an ordered list of line items against the product catalog. Stock effects
//! of a sale are computed elsewhere (`stockroom-inventory`); this crate only owns the
//! shape rules of the ledger record.

pub mod sale;

pub use sale::{LineItem, Sale, distinct_product_ids, ensure_not_empty};
