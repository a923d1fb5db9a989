use serde::Deserialize;
use serde_json::Value;

use stockroom_core::{ProductId, SaleId};
use stockroom_products::NewProduct;
use stockroom_sales::LineItem;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /products` and `PUT /products/:id`.
///
/// Fields stay untyped so a missing or mistyped field gets its own message instead of a
/// generic deserialization error.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
}

impl ProductRequest {
    /// Check `name` then `quantity`, reporting the first broken rule.
    pub fn into_new_product(self) -> Result<NewProduct, String> {
        let name = match self.name {
            None => return Err(r#""name" is required"#.to_string()),
            Some(Value::String(name)) => name,
            Some(_) => return Err(r#""name" must be a string"#.to_string()),
        };
        NewProduct::validate_name(&name).map_err(|e| errors::domain_message(&e).to_string())?;

        let quantity = match self.quantity {
            None => return Err(r#""quantity" is required"#.to_string()),
            Some(Value::Number(n)) => n.as_i64().ok_or(r#""quantity" must be an integer"#)?,
            Some(_) => return Err(r#""quantity" must be a number"#.to_string()),
        };
        NewProduct::new(name, quantity).map_err(|e| errors::domain_message(&e).to_string())
    }
}

/// One element of the JSON array accepted by `POST /sales` and `PUT /sales/:id`.
#[derive(Debug, Deserialize)]
pub struct SaleItemRequest {
    #[serde(alias = "productId")]
    pub product_id: String,
    pub quantity: i64,
}

// -------------------------
// Mapping helpers
// -------------------------

/// Parse a sale body into line items. Any malformed entry rejects the whole body.
pub fn to_line_items(items: Vec<SaleItemRequest>) -> Result<Vec<LineItem>, axum::response::Response> {
    if items.is_empty() {
        return Err(errors::invalid_data(errors::WRONG_PRODUCT_OR_QUANTITY));
    }
    items
        .into_iter()
        .map(|item| {
            let product_id: ProductId = item
                .product_id
                .parse()
                .map_err(|_| errors::invalid_data(errors::WRONG_PRODUCT_OR_QUANTITY))?;
            LineItem::new(product_id, item.quantity)
                .map_err(|_| errors::invalid_data(errors::WRONG_PRODUCT_OR_QUANTITY))
        })
        .collect()
}

pub fn parse_product_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::invalid_data(errors::WRONG_ID_FORMAT))
}

/// Parse a sale id from the path; `reject` builds the response for a malformed id.
pub fn parse_sale_id(
    raw: &str,
    reject: fn() -> axum::response::Response,
) -> Result<SaleId, axum::response::Response> {
    raw.parse().map_err(|_| reject())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;

    #[test]
    fn sale_items_accept_both_spellings_of_product_id() {
        let id = ProductId::new();
        let body = json!([
            { "product_id": id.to_string(), "quantity": 2 },
            { "productId": id.to_string(), "quantity": 3 },
        ]);
        let items: Vec<SaleItemRequest> = serde_json::from_value(body).unwrap();
        let items = to_line_items(items).unwrap();

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.product_id() == id));
        assert_eq!(items[1].quantity(), 3);
    }

    #[test]
    fn malformed_sale_items_are_unprocessable() {
        let cases = [
            vec![],
            vec![SaleItemRequest { product_id: "not-a-uuid".into(), quantity: 1 }],
            vec![SaleItemRequest { product_id: ProductId::new().to_string(), quantity: 0 }],
        ];
        for items in cases {
            let res = to_line_items(items).unwrap_err();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn product_request_applies_catalog_rules() {
        let short = ProductRequest {
            name: Some(json!("abc")),
            quantity: Some(json!(3)),
        };
        assert_eq!(
            short.into_new_product().unwrap_err(),
            r#""name" length must be at least 5 characters long"#
        );

        let ok = ProductRequest {
            name: Some(json!("Martelo de Thor")),
            quantity: Some(json!(3)),
        };
        assert_eq!(ok.into_new_product().unwrap().quantity(), 3);
    }

    #[test]
    fn product_request_reports_missing_and_mistyped_fields() {
        let cases = [
            (json!({ "quantity": 3 }), r#""name" is required"#),
            (json!({ "name": 42, "quantity": 3 }), r#""name" must be a string"#),
            (json!({ "name": "Martelo de Thor" }), r#""quantity" is required"#),
            (json!({ "name": "Martelo de Thor", "quantity": "dez" }), r#""quantity" must be a number"#),
            (json!({ "name": "Martelo de Thor", "quantity": 1.5 }), r#""quantity" must be an integer"#),
            (json!({ "name": "abc", "quantity": "dez" }), r#""name" length must be at least 5 characters long"#),
        ];
        for (body, message) in cases {
            let request: ProductRequest = serde_json::from_value(body).unwrap();
            assert_eq!(request.into_new_product().unwrap_err(), message);
        }
    }
}
