//! Cart line items.

use crate::error::CartError;
use crate::ids::{LineItemId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// One purchasable line in the cart or the saved-for-later list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    /// Unique line identifier. Distinct from the product so repeat adds with
    /// different attributes can coexist.
    pub id: LineItemId,
    /// Catalog product; used for merge-on-add matching.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Vendor display name.
    pub vendor_name: String,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity, always at least one.
    pub quantity: u32,
    /// Display asset (URL or asset identifier).
    pub image_ref: String,
}

impl CartLineItem {
    /// Create a new line with a freshly generated id.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        vendor_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            id: LineItemId::generate(),
            product_id,
            name: name.into(),
            vendor_name: vendor_name.into(),
            unit_price,
            quantity,
            image_ref: String::new(),
        }
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<LineItemId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the display asset.
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = image_ref.into();
        self
    }

    /// Price of the whole line (unit price times quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }

    /// Check that this line may enter a cart priced in `currency`.
    pub fn validate(&self, currency: Currency) -> Result<(), CartError> {
        if self.quantity == 0 {
            return Err(CartError::InvalidQuantity(self.quantity));
        }
        if self.unit_price.is_negative() {
            return Err(CartError::InvalidPrice(self.unit_price.amount_cents));
        }
        if self.unit_price.currency != currency {
            return Err(CartError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: self.unit_price.currency.code().to_string(),
            });
        }
        Ok(())
    }
}
