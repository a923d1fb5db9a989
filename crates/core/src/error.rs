//! Rule violations raised by catalog and ledger constructors.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A product, line item, or sale that breaks a catalog or ledger rule.
///
/// Raised before any store is touched. Stock shortfalls are not domain errors; they
/// come out of the reconciliation math as `StockError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller input breaks a rule: short product name, quantity below 1, empty sale.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Stored state breaks a rule, e.g. a product row with negative stock.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Text that does not parse as a product or sale id.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
