use crate::domain::cart::Cart;
use crate::domain::order::Order;
use crate::domain::ports::{Navigator, Notification, Notifier, OrderStore, StoreAction};
use crate::domain::user::User;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct StoreState {
    cart: Cart,
    user: Option<User>,
    order_error: Option<String>,
    orders: Vec<Order>,
    actions: Vec<StoreAction>,
}

/// A thread-safe in-memory application store.
///
/// Holds the cart, the signed-in user and the orders created so far, and
/// applies dispatched actions the way the storefront reducers do:
/// `NewOrder` records the order, `EmptyCart` drops the cart lines but keeps
/// the shipping info, `ClearErrors` forgets the pending order error.
/// Every dispatched action is also kept in dispatch order for inspection.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryOrderStore {
    pub fn new(cart: Cart, user: Option<User>) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState {
                cart,
                user,
                ..StoreState::default()
            })),
        }
    }

    pub async fn cart(&self) -> Cart {
        self.state.read().await.cart.clone()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    pub async fn actions(&self) -> Vec<StoreAction> {
        self.state.read().await.actions.clone()
    }

    pub async fn set_user(&self, user: Option<User>) {
        self.state.write().await.user = user;
    }

    /// Simulates the order-creation flow failing after the fact.
    pub async fn set_order_error(&self, message: impl Into<String>) {
        self.state.write().await.order_error = Some(message.into());
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn read_cart(&self) -> Result<Cart> {
        Ok(self.cart().await)
    }

    async fn read_user(&self) -> Result<Option<User>> {
        Ok(self.state.read().await.user.clone())
    }

    async fn order_error(&self) -> Result<Option<String>> {
        Ok(self.state.read().await.order_error.clone())
    }

    async fn dispatch(&self, action: StoreAction) -> Result<()> {
        let mut state = self.state.write().await;
        match &action {
            StoreAction::NewOrder(order) => state.orders.push(order.clone()),
            StoreAction::EmptyCart => state.cart.cart_items.clear(),
            StoreAction::ClearErrors => state.order_error = None,
        }
        state.actions.push(action);
        Ok(())
    }
}

/// Navigator that remembers every route it was sent to.
#[derive(Default, Clone)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}

/// Notifier that keeps every notification it receives.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
