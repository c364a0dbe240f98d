//! Shopping-cart state engine for the storefront app.
//!
//! This crate owns the patient-facing cart:
//!
//! - **Cart**: line items, the cart aggregate and a pure reducer
//! - **Persistence**: write-through snapshots over a [`cart_kv`] store
//! - **Facade**: [`CartStore`], the single shared handle UI code talks to
//! - **Checkout**: the boundary to the order backend
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cart_engine::prelude::*;
//! use cart_kv::FileStore;
//!
//! let store = Arc::new(FileStore::open(data_dir).await?);
//! let cart = CartStore::open(store, CartConfig::default());
//! cart.ready().await;
//!
//! cart.add_to_cart(CartLineItem::new(
//!     ProductId::new("vitamin-d3"),
//!     "Vitamin D3 1000 IU",
//!     "Corner Pharmacy",
//!     Money::new(899, Currency::USD),
//!     1,
//! ))?;
//! println!("Total: {}", cart.total());
//! ```

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod facade;
pub mod ids;
pub mod money;
pub mod persist;
pub mod telemetry;

pub use cart::{CartAction, CartLineItem, CartReducer, CartState, Reducer};
pub use checkout::{CheckoutGateway, CheckoutRejection, CheckoutRequest, OrderConfirmation};
pub use config::CartConfig;
pub use error::CartError;
pub use facade::{CartStatus, CartStore};
pub use ids::*;
pub use money::{Currency, Money};
pub use persist::CartPersistence;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{CartAction, CartLineItem, CartState};
    pub use crate::checkout::{CheckoutGateway, CheckoutRejection, CheckoutRequest, OrderConfirmation};
    pub use crate::config::CartConfig;
    pub use crate::error::CartError;
    pub use crate::facade::{CartStatus, CartStore};
    pub use crate::ids::{LineItemId, OrderId, ProductId};
    pub use crate::money::{Currency, Money};
}
