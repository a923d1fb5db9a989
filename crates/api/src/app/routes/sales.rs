use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};

use stockroom_infra::ReconcileError;
use stockroom_sales::LineItem;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_sale).get(list_sales))
        .route("/:id", get(get_sale).put(update_sale).delete(delete_sale))
}

fn parse_body(
    body: Result<Json<Vec<dto::SaleItemRequest>>, JsonRejection>,
) -> Result<Vec<LineItem>, axum::response::Response> {
    let Json(items) = body.map_err(|_| errors::invalid_data(errors::WRONG_PRODUCT_OR_QUANTITY))?;
    dto::to_line_items(items)
}

fn wrong_id_format() -> axum::response::Response {
    errors::invalid_data(errors::WRONG_ID_FORMAT)
}

fn wrong_sale_id_format() -> axum::response::Response {
    errors::invalid_data(errors::WRONG_SALE_ID_FORMAT)
}

pub async fn create_sale(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Vec<dto::SaleItemRequest>>, JsonRejection>,
) -> axum::response::Response {
    let items = match parse_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.sales.create_sale(items).await {
        Ok(sale) => Json(sale).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}

pub async fn list_sales(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.sales.list_sales().await {
        Ok(sales) => Json(serde_json::json!({ "sales": sales })).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}

pub async fn get_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_sale_id(&id, errors::sale_not_found) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.sales.find_sale(id).await {
        Ok(sale) => Json(sale).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}

pub async fn update_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<Vec<dto::SaleItemRequest>>, JsonRejection>,
) -> axum::response::Response {
    let items = match parse_body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let id = match dto::parse_sale_id(&id, wrong_id_format) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.sales.update_sale(id, items).await {
        Ok(sale) => Json(sale).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}

pub async fn delete_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_sale_id(&id, wrong_sale_id_format) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.sales.remove_sale(id).await {
        Ok(sale) => Json(sale).into_response(),
        Err(ReconcileError::SaleNotFound(_)) => wrong_sale_id_format(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
