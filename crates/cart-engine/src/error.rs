//! Cart error types.

use thiserror::Error;

/// Errors surfaced by the cart facade and its collaborators.
///
/// The reducer itself never fails; these come from input validation at the
/// facade, the persistence boundary and checkout.
#[derive(Error, Debug)]
pub enum CartError {
    /// Quantity below one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Negative unit price.
    #[error("Invalid unit price: {0} cents")]
    InvalidPrice(i64),

    /// Line priced in a different currency than the cart.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// No line with this id.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Checkout attempted with no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout input missing.
    #[error("Checkout incomplete: missing {0}")]
    CheckoutIncomplete(String),

    /// The checkout collaborator refused the order.
    #[error("Checkout rejected: {0}")]
    CheckoutRejected(String),

    /// Persisted snapshot violates a cart invariant.
    #[error("Corrupt cart snapshot: {0}")]
    CorruptSnapshot(String),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(#[from] cart_kv::StoreError),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The store was shut down.
    #[error("Cart store is closed")]
    Closed,
}

impl From<toml::de::Error> for CartError {
    fn from(e: toml::de::Error) -> Self {
        CartError::Config(e.to_string())
    }
}
