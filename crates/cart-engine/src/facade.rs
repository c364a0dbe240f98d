//! The cart facade: the single owner of live cart state.
//!
//! Every mutation goes through [`CartStore::dispatch`], which runs the reducer,
//! installs the result and queues a write-through of the full snapshot.
//! Restoration of the last snapshot runs in the background after
//! [`CartStore::start`].

use std::sync::{Arc, Mutex, PoisonError};

use cart_kv::KeyValueStore;
use tokio::sync::{mpsc, watch};

use crate::cart::{CartAction, CartLineItem, CartReducer, CartState, Reducer};
use crate::checkout::{CheckoutGateway, CheckoutRequest, OrderConfirmation};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::ids::LineItemId;
use crate::money::Money;
use crate::persist::{run_writer, CartPersistence, WriteCommand, WriteQueue};

/// Lifecycle of a [`CartStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartStatus {
    /// Created, restoration not started.
    Uninitialized,
    /// Reading the last snapshot. State is the empty cart until this ends.
    Restoring,
    /// Snapshot (if any) loaded.
    Ready,
    /// Shut down; writes are no longer persisted.
    Closed,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Uninitialized => "uninitialized",
            CartStatus::Restoring => "restoring",
            CartStatus::Ready => "ready",
            CartStatus::Closed => "closed",
        }
    }
}

struct Inner {
    state: watch::Sender<CartState>,
    status: watch::Sender<CartStatus>,
    writes: WriteQueue,
    pending_rx: Mutex<Option<mpsc::UnboundedReceiver<WriteCommand>>>,
    persistence: CartPersistence,
    config: CartConfig,
}

impl Inner {
    /// Reduce and install under the state lock, queueing the write in the
    /// same critical section so writes are issued in transition order.
    fn apply_with<F>(&self, decide: F) -> bool
    where
        F: FnOnce(&CartState) -> Option<CartAction>,
    {
        let mut kind = None;
        let changed = self.state.send_if_modified(|current| {
            let Some(action) = decide(current) else {
                return false;
            };
            kind = Some(action.kind());
            let next = CartReducer::reduce(current.clone(), action);
            self.writes.enqueue(next.clone());
            if next == *current {
                return false;
            }
            *current = next;
            true
        });

        if let Some(kind) = kind {
            tracing::debug!(action = kind, changed, "cart action applied");
        }
        kind.is_some()
    }

    /// Replace the state with a restored snapshot.
    ///
    /// The stored record already holds this state, so it is rewritten only
    /// when snapshots were queued during restoration and would otherwise land
    /// on top of it.
    fn install(&self, snapshot: CartState) {
        self.state.send_if_modified(|current| {
            let next = CartReducer::reduce(current.clone(), CartAction::LoadCart(snapshot));
            if self.writes.issued() > 0 {
                self.writes.enqueue(next.clone());
            }
            if next == *current {
                return false;
            }
            *current = next;
            true
        });
    }

    async fn restore(&self) {
        match self.persistence.load().await {
            Some(snapshot) if snapshot.currency() != self.config.currency => {
                tracing::warn!(
                    stored = %snapshot.currency(),
                    configured = %self.config.currency,
                    "ignoring cart snapshot in another currency"
                );
            }
            Some(snapshot) => {
                tracing::info!(
                    lines = snapshot.line_count(),
                    saved = snapshot.saved_count(),
                    total = %snapshot.total,
                    "restored cart"
                );
                self.install(snapshot);
            }
            None => tracing::debug!(key = self.persistence.key(), "no cart snapshot to restore"),
        }

        self.status.send_if_modified(|status| {
            if *status == CartStatus::Restoring {
                *status = CartStatus::Ready;
                true
            } else {
                false
            }
        });
    }
}

/// Shared handle to the live cart.
///
/// Cheap to clone; every clone observes and mutates the same cart. Create one
/// per process and hand clones to consumers.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl CartStore {
    /// Create an empty, not yet restored cart over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, config: CartConfig) -> Self {
        let (writes, rx) = WriteQueue::channel();
        let persistence = CartPersistence::new(store, config.storage_key());
        let (state, _) = watch::channel(CartState::empty(config.currency));
        let (status, _) = watch::channel(CartStatus::Uninitialized);

        Self {
            inner: Arc::new(Inner {
                state,
                status,
                writes,
                pending_rx: Mutex::new(Some(rx)),
                persistence,
                config,
            }),
        }
    }

    /// Create and immediately [`start`](Self::start). Must be called from
    /// within a Tokio runtime.
    pub fn open(store: Arc<dyn KeyValueStore>, config: CartConfig) -> Self {
        let cart = Self::new(store, config);
        cart.start();
        cart
    }

    /// Begin restoration, then run the writer. Returns false if already started.
    ///
    /// Snapshots issued before restoration finishes are written only after
    /// the stored snapshot has been read.
    pub fn start(&self) -> bool {
        let rx = self
            .inner
            .pending_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(rx) = rx else {
            return false;
        };

        self.inner.status.send_replace(CartStatus::Restoring);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let persistence = inner.persistence.clone();
            let coalesce = inner.config.coalesce_writes;
            inner.restore().await;
            drop(inner);
            run_writer(persistence, rx, coalesce).await;
        });
        true
    }

    /// Current lifecycle status.
    pub fn status(&self) -> CartStatus {
        *self.inner.status.borrow()
    }

    /// Wait until restoration has finished, returning the status reached.
    ///
    /// Returns [`CartStatus::Uninitialized`] at once if the store was never
    /// [`start`](Self::start)ed, and [`CartStatus::Closed`] if it was shut down.
    pub async fn ready(&self) -> CartStatus {
        let mut rx = self.inner.status.subscribe();
        let status = match rx.wait_for(|s| *s != CartStatus::Restoring).await {
            Ok(status) => *status,
            Err(_) => CartStatus::Closed,
        };
        status
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&CartState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Active lines.
    pub fn items(&self) -> Vec<CartLineItem> {
        self.read(|s| s.items.clone())
    }

    /// Saved-for-later lines.
    pub fn saved_items(&self) -> Vec<CartLineItem> {
        self.read(|s| s.saved_items.clone())
    }

    /// Sum of active lines.
    pub fn total(&self) -> Money {
        self.read(|s| s.total)
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &CartConfig {
        &self.inner.config
    }

    /// Apply an action and queue its persistence.
    pub fn dispatch(&self, action: CartAction) {
        self.inner.apply_with(|_| Some(action));
    }

    /// Add a line, merging with an existing line of the same product.
    pub fn add_to_cart(&self, item: CartLineItem) -> Result<(), CartError> {
        item.validate(self.inner.config.currency)?;
        self.dispatch(CartAction::AddItem(item));
        Ok(())
    }

    /// Remove an active line. Unknown ids are ignored.
    pub fn remove_item(&self, id: &LineItemId) {
        self.dispatch(CartAction::RemoveItem(id.clone()));
    }

    /// Set a line's quantity; anything below one removes the line.
    pub fn set_quantity(&self, id: &LineItemId, quantity: u32) {
        let action = if quantity == 0 {
            CartAction::RemoveItem(id.clone())
        } else {
            CartAction::UpdateQuantity {
                id: id.clone(),
                quantity,
            }
        };
        self.dispatch(action);
    }

    /// Add one unit to a line.
    pub fn increment(&self, id: &LineItemId) -> Result<(), CartError> {
        let applied = self.inner.apply_with(|state| {
            let line = state.get_item(id)?;
            Some(CartAction::UpdateQuantity {
                id: id.clone(),
                quantity: line.quantity.saturating_add(1),
            })
        });
        found(applied, id)
    }

    /// Take one unit off a line; the last unit removes it.
    pub fn decrement(&self, id: &LineItemId) -> Result<(), CartError> {
        let applied = self.inner.apply_with(|state| {
            let line = state.get_item(id)?;
            Some(if line.quantity <= 1 {
                CartAction::RemoveItem(id.clone())
            } else {
                CartAction::UpdateQuantity {
                    id: id.clone(),
                    quantity: line.quantity - 1,
                }
            })
        });
        found(applied, id)
    }

    /// Move an active line to the saved list.
    pub fn save_for_later(&self, id: &LineItemId) -> Result<(), CartError> {
        let applied = self.inner.apply_with(|state| {
            state
                .get_item(id)
                .map(|_| CartAction::SaveForLater(id.clone()))
        });
        found(applied, id)
    }

    /// Move a saved line back into the cart.
    pub fn move_to_cart(&self, id: &LineItemId) -> Result<(), CartError> {
        let applied = self.inner.apply_with(|state| {
            state
                .get_saved(id)
                .map(|_| CartAction::MoveToCart(id.clone()))
        });
        found(applied, id)
    }

    /// Drop a saved line. Unknown ids are ignored.
    pub fn remove_from_saved(&self, id: &LineItemId) {
        self.dispatch(CartAction::RemoveFromSaved(id.clone()));
    }

    /// Empty the cart and the saved list.
    pub fn clear(&self) {
        self.dispatch(CartAction::ClearCart);
    }

    /// Submit the current lines and clear the cart once the order is accepted.
    ///
    /// A rejection leaves the cart as it was.
    pub async fn checkout<G>(
        &self,
        gateway: &G,
        delivery_address: &str,
        payment_method: &str,
    ) -> Result<OrderConfirmation, CartError>
    where
        G: CheckoutGateway + ?Sized,
    {
        let request = self.read(|state| {
            CheckoutRequest::from_state(state, delivery_address, payment_method)
        })?;
        let lines = request.items.len();

        match gateway.submit(request).await {
            Ok(confirmation) => {
                tracing::info!(
                    order_id = %confirmation.order_id,
                    order_number = %confirmation.order_number,
                    lines,
                    "checkout confirmed"
                );
                self.clear();
                Ok(confirmation)
            }
            Err(rejection) => {
                tracing::warn!(reason = %rejection.reason, lines, "checkout rejected");
                Err(CartError::CheckoutRejected(rejection.reason))
            }
        }
    }

    /// Wait for every write issued so far. No-op before [`start`](Self::start).
    pub async fn flush(&self) -> Result<(), CartError> {
        match self.status() {
            CartStatus::Uninitialized => Ok(()),
            CartStatus::Closed => Err(CartError::Closed),
            CartStatus::Restoring | CartStatus::Ready => self.inner.writes.flush().await,
        }
    }

    /// Flush pending writes and stop persisting.
    pub async fn shutdown(&self) -> Result<(), CartError> {
        let previous = self.inner.status.send_replace(CartStatus::Closed);
        match previous {
            CartStatus::Closed => Err(CartError::Closed),
            CartStatus::Uninitialized => {
                // The writer never ran; drop its queue so later writes fail fast.
                self.inner
                    .pending_rx
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                Ok(())
            }
            CartStatus::Restoring | CartStatus::Ready => {
                let result = self.inner.writes.shutdown().await;
                tracing::debug!("cart store closed");
                result
            }
        }
    }
}

fn found(applied: bool, id: &LineItemId) -> Result<(), CartError> {
    if applied {
        Ok(())
    } else {
        Err(CartError::ItemNotInCart(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::CheckoutRejection;
    use crate::ids::{OrderId, ProductId};
    use crate::money::Currency;
    use async_trait::async_trait;
    use cart_kv::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn line(id: &str, product: &str, cents: i64, quantity: u32) -> CartLineItem {
        CartLineItem::new(
            ProductId::new(product),
            "Item",
            "Vendor",
            Money::new(cents, Currency::USD),
            quantity,
        )
        .with_id(id)
    }

    async fn ready_store() -> (CartStore, Arc<MemoryStore>) {
        let backing = Arc::new(MemoryStore::new());
        let cart = CartStore::open(backing.clone(), CartConfig::default());
        assert_eq!(cart.ready().await, CartStatus::Ready);
        (cart, backing)
    }

    struct StubGateway {
        accept: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CheckoutGateway for StubGateway {
        async fn submit(
            &self,
            request: CheckoutRequest,
        ) -> Result<OrderConfirmation, CheckoutRejection> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.accept {
                return Err(CheckoutRejection::new("card declined"));
            }
            let total = Money::sum_in(
                Currency::USD,
                request.items.iter().map(CartLineItem::line_total),
            );
            Ok(OrderConfirmation {
                order_id: OrderId::new("ord-1"),
                order_number: "ORD-1".to_string(),
                total,
                placed_at: 0,
            })
        }
    }

    #[test]
    fn test_new_store_is_uninitialized_and_empty() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()), CartConfig::default());
        assert_eq!(cart.status(), CartStatus::Uninitialized);
        assert_eq!(cart.state(), CartState::default());
    }

    #[test]
    fn test_dispatch_before_start_updates_memory() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()), CartConfig::default());
        cart.add_to_cart(line("a", "p1", 100, 2)).unwrap();
        assert_eq!(cart.total().amount_cents, 200);
    }

    #[tokio::test]
    async fn test_ready_without_start_returns_immediately() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()), CartConfig::default());
        assert_eq!(cart.ready().await, CartStatus::Uninitialized);

        cart.shutdown().await.unwrap();
        assert_eq!(cart.ready().await, CartStatus::Closed);
    }

    #[tokio::test]
    async fn test_restore_does_not_rewrite_snapshot() {
        let backing = Arc::new(MemoryStore::new());
        let mut state = CartState::default();
        state.items.push(line("a", "p1", 250, 2));
        state.recompute_total();
        let record = serde_json::to_vec(&serde_json::json!({
            "schema": crate::persist::SNAPSHOT_SCHEMA,
            "saved_at": 0,
            "state": state,
        }))
        .unwrap();
        backing.set("storefront:cart", &record).await.unwrap();

        let cart = CartStore::open(backing.clone(), CartConfig::default());
        assert_eq!(cart.ready().await, CartStatus::Ready);
        assert_eq!(cart.state(), state);
        cart.shutdown().await.unwrap();

        assert_eq!(backing.get("storefront:cart").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_start_only_once() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()), CartConfig::default());
        assert!(cart.start());
        assert!(!cart.start());
        cart.ready().await;
    }

    #[tokio::test]
    async fn test_add_to_cart_merges_and_totals() {
        let (cart, _) = ready_store().await;
        cart.add_to_cart(line("a", "p1", 1000, 1)).unwrap();
        cart.add_to_cart(line("b", "p1", 1000, 2)).unwrap();

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(cart.total().amount_cents, 3000);
    }

    #[tokio::test]
    async fn test_add_to_cart_rejects_invalid_lines() {
        let (cart, _) = ready_store().await;
        assert!(matches!(
            cart.add_to_cart(line("a", "p1", 100, 0)),
            Err(CartError::InvalidQuantity(0))
        ));
        let mut euro = line("b", "p2", 100, 1);
        euro.unit_price.currency = Currency::EUR;
        assert!(matches!(
            cart.add_to_cart(euro),
            Err(CartError::CurrencyMismatch { .. })
        ));
        assert!(cart.state().is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes() {
        let (cart, _) = ready_store().await;
        cart.add_to_cart(line("a", "p1", 100, 2)).unwrap();
        cart.set_quantity(&LineItemId::new("a"), 0);
        assert!(cart.items().is_empty());
    }

    #[tokio::test]
    async fn test_increment_and_decrement() {
        let (cart, _) = ready_store().await;
        let id = LineItemId::new("a");
        cart.add_to_cart(line("a", "p1", 100, 1)).unwrap();

        cart.increment(&id).unwrap();
        cart.increment(&id).unwrap();
        assert_eq!(cart.total().amount_cents, 300);

        cart.decrement(&id).unwrap();
        cart.decrement(&id).unwrap();
        cart.decrement(&id).unwrap();
        assert!(cart.items().is_empty());
        assert!(matches!(
            cart.decrement(&id),
            Err(CartError::ItemNotInCart(_))
        ));
    }

    #[tokio::test]
    async fn test_save_and_move_back() {
        let (cart, _) = ready_store().await;
        let id = LineItemId::new("a");
        cart.add_to_cart(line("a", "p1", 2000, 1)).unwrap();

        cart.save_for_later(&id).unwrap();
        assert!(cart.items().is_empty());
        assert_eq!(cart.saved_items().len(), 1);
        assert!(cart.total().is_zero());
        assert!(cart.save_for_later(&id).is_err());

        cart.move_to_cart(&id).unwrap();
        assert_eq!(cart.total().amount_cents, 2000);
        assert!(cart.saved_items().is_empty());
        assert!(cart.move_to_cart(&id).is_err());
    }

    #[tokio::test]
    async fn test_clear_discards_saved() {
        let (cart, _) = ready_store().await;
        cart.add_to_cart(line("a", "p1", 100, 1)).unwrap();
        cart.add_to_cart(line("b", "p2", 100, 1)).unwrap();
        cart.save_for_later(&LineItemId::new("b")).unwrap();

        cart.clear();
        assert_eq!(cart.state(), CartState::default());
    }

    #[tokio::test]
    async fn test_every_transition_is_written_through() {
        let (cart, backing) = ready_store().await;
        cart.add_to_cart(line("a", "p1", 100, 1)).unwrap();
        cart.set_quantity(&LineItemId::new("a"), 4);
        cart.flush().await.unwrap();

        let persisted = CartPersistence::new(backing, "storefront:cart").load().await;
        assert_eq!(persisted, Some(cart.state()));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes_but_not_noops() {
        let (cart, _) = ready_store().await;
        let mut rx = cart.subscribe();
        let _ = rx.borrow_and_update();

        cart.remove_item(&LineItemId::new("ghost"));
        assert!(!rx.has_changed().unwrap());

        cart.add_to_cart(line("a", "p1", 100, 1)).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().line_count(), 1);
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart() {
        let (cart, _) = ready_store().await;
        cart.add_to_cart(line("a", "p1", 450, 2)).unwrap();
        let gateway = StubGateway {
            accept: true,
            calls: AtomicUsize::new(0),
        };

        let confirmation = cart.checkout(&gateway, "1 Main St", "card").await.unwrap();
        assert_eq!(confirmation.total.amount_cents, 900);
        assert!(cart.state().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_rejection_keeps_cart() {
        let (cart, _) = ready_store().await;
        cart.add_to_cart(line("a", "p1", 450, 2)).unwrap();
        let gateway = StubGateway {
            accept: false,
            calls: AtomicUsize::new(0),
        };

        let result = cart.checkout(&gateway, "1 Main St", "card").await;
        assert!(matches!(result, Err(CartError::CheckoutRejected(reason)) if reason == "card declined"));
        assert_eq!(cart.total().amount_cents, 900);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_never_calls_gateway() {
        let (cart, _) = ready_store().await;
        let gateway = StubGateway {
            accept: true,
            calls: AtomicUsize::new(0),
        };

        assert!(matches!(
            cart.checkout(&gateway, "1 Main St", "card").await,
            Err(CartError::EmptyCart)
        ));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_closes() {
        let (cart, _) = ready_store().await;
        cart.shutdown().await.unwrap();
        assert_eq!(cart.status(), CartStatus::Closed);
        assert!(matches!(cart.flush().await, Err(CartError::Closed)));
        assert!(matches!(cart.shutdown().await, Err(CartError::Closed)));
    }

    #[tokio::test]
    async fn test_concurrent_dispatch_keeps_total_consistent() {
        let (cart, _) = ready_store().await;
        cart.add_to_cart(line("a", "p1", 10, 1)).unwrap();
        let id = LineItemId::new("a");

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cart = cart.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..25 {
                    cart.increment(&id).unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let state = cart.state();
        assert_eq!(state.items[0].quantity, 201);
        assert_eq!(state.total, state.computed_total());
    }
}
