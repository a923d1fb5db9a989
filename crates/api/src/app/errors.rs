use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::{CatalogError, ReconcileError};
use stockroom_inventory::StockError;

pub const WRONG_ID_FORMAT: &str = "Wrong id format";
pub const WRONG_SALE_ID_FORMAT: &str = "Wrong sale ID format";
pub const WRONG_PRODUCT_OR_QUANTITY: &str = "Wrong product ID or invalid quantity";
pub const PRODUCT_ALREADY_EXISTS: &str = "Product already exists";
pub const NOT_PERMITTED_TO_SELL: &str = "Such amount is not permitted to sell";
pub const SALE_NOT_FOUND: &str = "Sale not found";

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn invalid_data(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_data", message)
}

pub fn sale_not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", SALE_NOT_FOUND)
}

/// 500 with a generic body; the cause only goes to the log.
pub fn internal_error(err: impl std::fmt::Display) -> axum::response::Response {
    tracing::error!(error = %err, "internal error");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Internal server error",
    )
}

/// Message of a domain validation failure, without the variant prefix.
pub fn domain_message(err: &DomainError) -> &str {
    match err {
        DomainError::Validation(msg)
        | DomainError::InvariantViolation(msg)
        | DomainError::InvalidId(msg) => msg,
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::DuplicateProduct(_) => invalid_data(PRODUCT_ALREADY_EXISTS),
        CatalogError::ProductNotFound(_) => invalid_data(WRONG_ID_FORMAT),
        CatalogError::Invalid(e) => invalid_data(domain_message(&e)),
        CatalogError::Store(e) => internal_error(e),
    }
}

pub fn reconcile_error_to_response(err: ReconcileError) -> axum::response::Response {
    match err {
        ReconcileError::InvalidProductReference { .. }
        | ReconcileError::InvalidSaleReference(_)
        | ReconcileError::InvalidSale(_)
        | ReconcileError::Stock(StockError::Overflow(_)) => invalid_data(WRONG_PRODUCT_OR_QUANTITY),
        ReconcileError::InsufficientStock { .. } => {
            json_error(StatusCode::NOT_FOUND, "stock_problem", NOT_PERMITTED_TO_SELL)
        }
        ReconcileError::SaleNotFound(_) => sale_not_found(),
        ReconcileError::Stock(e) => internal_error(e),
        ReconcileError::Store(e) => internal_error(e),
    }
}
