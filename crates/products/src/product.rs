use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ProductId};

/// Minimum length of a product name (after trimming).
pub const MIN_NAME_LEN: usize = 5;

/// Catalog entry: a named product with its on-hand stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    quantity: i64,
}

impl Product {
    /// Create a product from validated catalog input.
    pub fn new(id: ProductId, input: NewProduct) -> Self {
        Self {
            id,
            name: input.name,
            quantity: input.quantity,
        }
    }

    /// Rehydrate a product loaded from storage.
    ///
    /// Stored quantities are never negative; a negative value means the backing store
    /// was edited out of band.
    pub fn restore(id: ProductId, name: impl Into<String>, quantity: i64) -> DomainResult<Self> {
        if quantity < 0 {
            return Err(DomainError::invariant(format!(
                "product {id} has negative stock ({quantity})"
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            quantity,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Same product with a new stock level. Stock can never go below zero.
    pub fn with_quantity(&self, quantity: i64) -> DomainResult<Self> {
        if quantity < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }
        Ok(Self {
            quantity,
            ..self.clone()
        })
    }

    /// Same product with name and quantity taken from a catalog edit.
    pub fn edited(&self, input: NewProduct) -> Self {
        Self::new(self.id, input)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Validated input for creating or editing a catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    quantity: i64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, quantity: i64) -> DomainResult<Self> {
        let name = name.into();
        Self::validate_name(&name)?;
        if quantity < 1 {
            return Err(DomainError::validation(
                "\"quantity\" must be larger than or equal to 1",
            ));
        }
        Ok(Self { name, quantity })
    }

    /// Name rule on its own: at least [`MIN_NAME_LEN`] characters after trimming.
    pub fn validate_name(name: &str) -> DomainResult<()> {
        if name.trim().chars().count() < MIN_NAME_LEN {
            return Err(DomainError::validation(format!(
                "\"name\" length must be at least {MIN_NAME_LEN} characters long"
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}
