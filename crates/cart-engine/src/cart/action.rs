//! Cart transitions.

use crate::cart::{CartLineItem, CartState};
use crate::ids::LineItemId;

/// Every way the cart can change. Dispatched through the facade and applied by
/// [`CartReducer`](crate::cart::CartReducer).
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add a line, merging into an existing line of the same product.
    AddItem(CartLineItem),
    /// Remove an active line.
    RemoveItem(LineItemId),
    /// Set an active line's quantity. Zero removes the line.
    UpdateQuantity { id: LineItemId, quantity: u32 },
    /// Reset to the empty cart, saved lines included.
    ClearCart,
    /// Move an active line to the saved list.
    SaveForLater(LineItemId),
    /// Drop a saved line.
    RemoveFromSaved(LineItemId),
    /// Move a saved line back into the cart.
    MoveToCart(LineItemId),
    /// Replace the whole state with a restored snapshot.
    LoadCart(CartState),
}

impl CartAction {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CartAction::AddItem(_) => "add_item",
            CartAction::RemoveItem(_) => "remove_item",
            CartAction::UpdateQuantity { .. } => "update_quantity",
            CartAction::ClearCart => "clear_cart",
            CartAction::SaveForLater(_) => "save_for_later",
            CartAction::RemoveFromSaved(_) => "remove_from_saved",
            CartAction::MoveToCart(_) => "move_to_cart",
            CartAction::LoadCart(_) => "load_cart",
        }
    }
}
