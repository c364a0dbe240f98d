//! Checkout boundary.
//!
//! The cart does not place orders itself. It hands a snapshot of its lines to
//! a [`CheckoutGateway`] (typically the storefront's REST client) and clears
//! itself once the order is confirmed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{CartLineItem, CartState};
use crate::error::CartError;
use crate::ids::OrderId;
use crate::money::Money;

/// What the gateway receives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartLineItem>,
    pub delivery_address: String,
    pub payment_method: String,
}

impl CheckoutRequest {
    /// Build a request from the current cart.
    ///
    /// Fails if there is nothing to buy or delivery/payment is blank.
    pub fn from_state(
        state: &CartState,
        delivery_address: &str,
        payment_method: &str,
    ) -> Result<Self, CartError> {
        if state.is_empty() {
            return Err(CartError::EmptyCart);
        }
        if delivery_address.trim().is_empty() {
            return Err(CartError::CheckoutIncomplete("delivery address".to_string()));
        }
        if payment_method.trim().is_empty() {
            return Err(CartError::CheckoutIncomplete("payment method".to_string()));
        }
        Ok(Self {
            items: state.items.clone(),
            delivery_address: delivery_address.trim().to_string(),
            payment_method: payment_method.trim().to_string(),
        })
    }
}

/// Accepted order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// Amount charged.
    pub total: Money,
    /// Unix timestamp of acceptance.
    pub placed_at: i64,
}

/// Reason the backend refused an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct CheckoutRejection {
    pub reason: String,
}

impl CheckoutRejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Order submission collaborator.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Submit an order for the given lines.
    async fn submit(&self, request: CheckoutRequest) -> Result<OrderConfirmation, CheckoutRejection>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;
    use crate::money::Currency;

    fn cart() -> CartState {
        let mut state = CartState::default();
        state.items.push(CartLineItem::new(
            ProductId::new("p1"),
            "Ibuprofen",
            "Corner Pharmacy",
            Money::new(899, Currency::USD),
            1,
        ));
        state.recompute_total();
        state
    }

    #[test]
    fn test_request_from_state() {
        let request = CheckoutRequest::from_state(&cart(), " 1 Main St ", "card").unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.delivery_address, "1 Main St");
    }

    #[test]
    fn test_request_rejects_empty_cart() {
        let result = CheckoutRequest::from_state(&CartState::default(), "1 Main St", "card");
        assert!(matches!(result, Err(CartError::EmptyCart)));
    }

    #[test]
    fn test_request_rejects_blank_fields() {
        assert!(matches!(
            CheckoutRequest::from_state(&cart(), "  ", "card"),
            Err(CartError::CheckoutIncomplete(_))
        ));
        assert!(matches!(
            CheckoutRequest::from_state(&cart(), "1 Main St", ""),
            Err(CartError::CheckoutIncomplete(_))
        ));
    }

    #[test]
    fn test_request_wire_shape() {
        let request = CheckoutRequest::from_state(&cart(), "1 Main St", "card").unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("deliveryAddress").is_some());
        assert!(json.get("paymentMethod").is_some());
    }
}
