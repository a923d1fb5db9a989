use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ProductId, SaleId, ValueObject};

/// One (product, quantity) pair within a sale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord")]
pub struct LineItem {
    product_id: ProductId,
    quantity: i64,
}

impl LineItem {
    pub fn new(product_id: ProductId, quantity: i64) -> DomainResult<Self> {
        if quantity < 1 {
            return Err(DomainError::validation(format!(
                "line item quantity must be at least 1 (got {quantity})"
            )));
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}

impl ValueObject for LineItem {}

/// Unchecked wire shape; decoding goes through [`LineItem::new`].
#[derive(Deserialize)]
struct LineItemRecord {
    product_id: ProductId,
    quantity: i64,
}

impl TryFrom<LineItemRecord> for LineItem {
    type Error = DomainError;

    fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
        Self::new(record.product_id, record.quantity)
    }
}

/// Reject an empty batch of line items.
pub fn ensure_not_empty(items: &[LineItem]) -> DomainResult<()> {
    if items.is_empty() {
        return Err(DomainError::validation("a sale needs at least one line item"));
    }
    Ok(())
}

/// Distinct product ids referenced by `items`, in first-seen order.
pub fn distinct_product_ids(items: &[LineItem]) -> Vec<ProductId> {
    let mut ids: Vec<ProductId> = Vec::with_capacity(items.len());
    for item in items {
        if !ids.contains(&item.product_id) {
            ids.push(item.product_id);
        }
    }
    ids
}

/// Ledger record: a finalized set of line items.
///
/// Items are replaced wholesale on update and never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SaleRecord")]
pub struct Sale {
    id: SaleId,
    items: Vec<LineItem>,
}

impl Sale {
    pub fn new(id: SaleId, items: Vec<LineItem>) -> DomainResult<Self> {
        ensure_not_empty(&items)?;
        Ok(Self { id, items })
    }

    pub fn id_typed(&self) -> SaleId {
        self.id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The same sale carrying a replacement set of items.
    pub fn with_items(&self, items: Vec<LineItem>) -> DomainResult<Self> {
        Self::new(self.id, items)
    }
}

#[derive(Deserialize)]
struct SaleRecord {
    id: SaleId,
    items: Vec<LineItem>,
}

impl TryFrom<SaleRecord> for Sale {
    type Error = DomainError;

    fn try_from(record: SaleRecord) -> Result<Self, Self::Error> {
        Self::new(record.id, record.items)
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(product_id: ProductId, quantity: i64) -> LineItem {
        LineItem::new(product_id, quantity).unwrap()
    }

    #[test]
    fn line_item_rejects_zero_and_negative_quantities() {
        let p = ProductId::new();
        assert!(matches!(LineItem::new(p, 0), Err(DomainError::Validation(_))));
        assert!(matches!(LineItem::new(p, -2), Err(DomainError::Validation(_))));
    }

    #[test]
    fn sale_requires_at_least_one_item() {
        let err = Sale::new(SaleId::new(), vec![]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn with_items_replaces_wholesale_and_keeps_identity() {
        let (a, b) = (ProductId::new(), ProductId::new());
        let sale = Sale::new(SaleId::new(), vec![item(a, 1), item(a, 2)]).unwrap();
        let updated = sale.with_items(vec![item(b, 5)]).unwrap();

        assert!(updated.same_identity_as(&sale));
        assert_eq!(updated.items(), &[item(b, 5)]);
    }

    #[test]
    fn distinct_product_ids_keeps_first_seen_order() {
        let (a, b) = (ProductId::new(), ProductId::new());
        let items = [item(b, 1), item(a, 1), item(b, 3)];
        assert_eq!(distinct_product_ids(&items), vec![b, a]);
    }

    #[test]
    fn line_items_compare_by_value() {
        let p = ProductId::new();
        assert_eq!(item(p, 3), item(p, 3));
        assert_ne!(item(p, 3), item(p, 4));
    }

    #[test]
    fn sale_serializes_items_in_order() {
        let (a, b) = (ProductId::new(), ProductId::new());
        let sale = Sale::new(SaleId::new(), vec![item(a, 1), item(b, 2)]).unwrap();
        let json = serde_json::to_value(&sale).unwrap();

        assert_eq!(json["items"][0]["product_id"], a.to_string());
        assert_eq!(json["items"][1]["quantity"], 2);
    }

    #[test]
    fn decoding_applies_the_constructor_rules() {
        let p = ProductId::new();
        let zero = json!({ "product_id": p.to_string(), "quantity": 0 });
        assert!(serde_json::from_value::<LineItem>(zero.clone()).is_err());

        let stored = json!({ "id": SaleId::new().to_string(), "items": [zero] });
        assert!(serde_json::from_value::<Sale>(stored).is_err());

        let empty = json!({ "id": SaleId::new().to_string(), "items": [] });
        assert!(serde_json::from_value::<Sale>(empty).is_err());

        let ok = json!([{ "product_id": p.to_string(), "quantity": 2 }]);
        let items: Vec<LineItem> = serde_json::from_value(ok).unwrap();
        assert_eq!(items, vec![item(p, 2)]);
    }
}
