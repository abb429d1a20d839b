use super::cart::{Cart, CartItem, ShippingInfo};
use super::payment::{PaymentIntent, PaymentIntentStatus};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Route the customer lands on after a confirmed payment.
pub const ORDER_SUCCESS_ROUTE: &str = "/orders/success";

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentInfo {
    pub id: String,
    pub status: PaymentIntentStatus,
}

impl From<PaymentIntent> for PaymentInfo {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            id: intent.id,
            status: intent.status,
        }
    }
}

/// The order handed to the store once payment is confirmed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub shipping_info: ShippingInfo,
    pub order_items: Vec<CartItem>,
    pub total_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_info: Option<PaymentInfo>,
}

impl Order {
    /// Builds an unpaid order from the cart.
    pub fn from_cart(cart: &Cart) -> Result<Self> {
        Ok(Self {
            shipping_info: cart.shipping_info.clone(),
            order_items: cart.cart_items.clone(),
            total_price: cart.total_price()?,
            payment_info: None,
        })
    }

    pub fn with_payment(mut self, payment_info: PaymentInfo) -> Self {
        self.payment_info = Some(payment_info);
        self
    }

    pub fn is_paid(&self) -> bool {
        self.payment_info
            .as_ref()
            .is_some_and(|info| info.status.is_succeeded())
    }
}

/// What a successful submission produced.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order: Order,
    pub redirect_to: String,
}
