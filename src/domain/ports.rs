use super::cart::Cart;
use super::order::Order;
use super::payment::{CardElement, CardPaymentMethod, ClientSecret, Confirmation, PaymentRequest};
use super::user::User;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Storefront backend endpoint that opens a payment intent.
#[async_trait]
pub trait PaymentIntentClient: Send + Sync {
    async fn create_payment_intent(&self, request: &PaymentRequest) -> Result<ClientSecret>;
}

/// A live processor session with its card fields.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// The mounted card-number field, `None` until the form is rendered.
    fn card_element(&self) -> Option<CardElement>;

    /// Confirms the intent behind `secret`.
    ///
    /// A refusal by the processor is `Ok(Confirmation::Error(_))`; `Err` is
    /// reserved for failures to reach it.
    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        method: &CardPaymentMethod,
    ) -> Result<Confirmation>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    NewOrder(Order),
    EmptyCart,
    ClearErrors,
}

/// Handle on the application state the checkout reads and dispatches to.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn read_cart(&self) -> Result<Cart>;
    async fn read_user(&self) -> Result<Option<User>>;
    /// Error reported asynchronously by the order-creation flow, if any.
    async fn order_error(&self) -> Result<Option<String>>;
    async fn dispatch(&self, action: StoreAction) -> Result<()>;
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
}

/// Transient message shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub type PaymentIntentClientBox = Box<dyn PaymentIntentClient>;
pub type PaymentProcessorRef = Arc<dyn PaymentProcessor>;
pub type OrderStoreBox = Box<dyn OrderStore>;
pub type NavigatorBox = Box<dyn Navigator>;
pub type NotifierBox = Box<dyn Notifier>;
