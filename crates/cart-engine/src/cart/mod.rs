//! Shopping cart module.
//!
//! Contains the cart aggregate, its line items, the action set and the pure
//! reducer that applies actions.

mod action;
mod item;
mod reducer;
mod state;

pub use action::CartAction;
pub use item::CartLineItem;
pub use reducer::{CartReducer, Reducer};
pub use state::CartState;
