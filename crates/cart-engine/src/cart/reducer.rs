//! Pure cart state transitions.

use crate::cart::{CartAction, CartLineItem, CartState};
use crate::ids::LineItemId;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Action) -> State
pub trait Reducer {
    /// The state type this reducer operates on.
    type State;

    /// The action type this reducer handles.
    type Action;

    /// Process an action and return the new state.
    fn reduce(state: Self::State, action: Self::Action) -> Self::State;
}

/// Reducer for [`CartState`].
///
/// Never fails and never panics: actions that reference missing lines or
/// carry invalid input leave the state unchanged. `total` is recomputed from
/// `items` after every structural change, so it cannot drift.
pub struct CartReducer;

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;

    fn reduce(mut state: CartState, action: CartAction) -> CartState {
        match action {
            CartAction::AddItem(item) => add_item(&mut state, item),
            CartAction::RemoveItem(id) => state.items.retain(|i| i.id != id),
            CartAction::UpdateQuantity { id, quantity } => {
                if quantity == 0 {
                    state.items.retain(|i| i.id != id);
                } else if let Some(line) = state.items.iter_mut().find(|i| i.id == id) {
                    line.quantity = quantity;
                }
            }
            CartAction::ClearCart => return CartState::empty(state.currency()),
            CartAction::SaveForLater(id) => {
                if let Some(line) = take(&mut state.items, &id) {
                    state.saved_items.push(line);
                }
            }
            CartAction::RemoveFromSaved(id) => state.saved_items.retain(|i| i.id != id),
            CartAction::MoveToCart(id) => {
                if let Some(line) = take(&mut state.saved_items, &id) {
                    merge_line(&mut state.items, line);
                }
            }
            CartAction::LoadCart(snapshot) => return snapshot,
        }

        state.recompute_total();
        state
    }
}

fn add_item(state: &mut CartState, mut item: CartLineItem) {
    if item.validate(state.currency()).is_err() {
        return;
    }
    // A colliding id on a different product would break id uniqueness.
    if state
        .items
        .iter()
        .chain(state.saved_items.iter())
        .any(|i| i.id == item.id && i.product_id != item.product_id)
    {
        return;
    }
    // The new line takes the saved line's id, so the saved units come along.
    if !state.items.iter().any(|i| i.product_id == item.product_id) {
        if let Some(saved) = take(&mut state.saved_items, &item.id) {
            item.quantity = item.quantity.saturating_add(saved.quantity);
        }
    }
    merge_line(&mut state.items, item);
}

/// Merge into the first line of the same product, or append.
fn merge_line(items: &mut Vec<CartLineItem>, line: CartLineItem) {
    match items.iter_mut().find(|i| i.product_id == line.product_id) {
        Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
        None => items.push(line),
    }
}

fn take(lines: &mut Vec<CartLineItem>, id: &LineItemId) -> Option<CartLineItem> {
    let pos = lines.iter().position(|i| &i.id == id)?;
    Some(lines.remove(pos))
}
