//! The cart aggregate.

use std::collections::HashSet;

use crate::cart::CartLineItem;
use crate::error::CartError;
use crate::ids::LineItemId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Cart and saved-for-later lines plus the derived total.
///
/// Invariants after every reducer transition:
/// - `total` equals the sum of `line_total()` over `items`;
/// - no id appears in both `items` and `saved_items`;
/// - every quantity is at least one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartState {
    /// Lines to purchase, in arrival order.
    pub items: Vec<CartLineItem>,
    /// Lines held for later; never counted in `total`.
    pub saved_items: Vec<CartLineItem>,
    /// Sum of the active lines. Its currency is the cart currency.
    pub total: Money,
}

impl CartState {
    /// An empty cart priced in `currency`.
    pub fn empty(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            saved_items: Vec::new(),
            total: Money::zero(currency),
        }
    }

    /// The cart currency.
    pub fn currency(&self) -> Currency {
        self.total.currency
    }

    /// Sum of active lines, computed from scratch.
    pub fn computed_total(&self) -> Money {
        Money::sum_in(self.currency(), self.items.iter().map(CartLineItem::line_total))
    }

    /// Bring `total` back in line with `items`.
    pub(crate) fn recompute_total(&mut self) {
        self.total = self.computed_total();
    }

    /// Total units across active lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Number of active lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Number of saved lines.
    pub fn saved_count(&self) -> usize {
        self.saved_items.len()
    }

    /// True when there is nothing to purchase. Saved lines do not count.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find an active line.
    pub fn get_item(&self, id: &LineItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Find a saved line.
    pub fn get_saved(&self, id: &LineItemId) -> Option<&CartLineItem> {
        self.saved_items.iter().find(|i| &i.id == id)
    }

    /// Verify the aggregate invariants.
    ///
    /// Used to reject persisted snapshots that could not have been produced
    /// by the reducer.
    pub fn check_invariants(&self) -> Result<(), CartError> {
        let mut seen = HashSet::new();
        for line in self.items.iter().chain(self.saved_items.iter()) {
            if !seen.insert(&line.id) {
                return Err(CartError::CorruptSnapshot(format!(
                    "duplicate line id {}",
                    line.id
                )));
            }
            if line.quantity == 0 {
                return Err(CartError::CorruptSnapshot(format!(
                    "line {} has zero quantity",
                    line.id
                )));
            }
            if line.unit_price.is_negative() {
                return Err(CartError::CorruptSnapshot(format!(
                    "line {} has a negative price",
                    line.id
                )));
            }
            if line.unit_price.currency != self.currency() {
                return Err(CartError::CorruptSnapshot(format!(
                    "line {} is priced in {}, cart is {}",
                    line.id,
                    line.unit_price.currency,
                    self.currency()
                )));
            }
        }

        let expected = self.computed_total();
        if self.total != expected {
            return Err(CartError::CorruptSnapshot(format!(
                "total {} does not match items {}",
                self.total, expected
            )));
        }
        Ok(())
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::empty(Currency::default())
    }
}
