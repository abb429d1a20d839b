use crate::error::{CheckoutError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Where the order ships to. Collected by the shipping step of checkout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    /// Postal code.
    pub pincode: String,
    pub phone_no: String,
}

/// A single line of the cart.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CartItem {
    /// Product reference.
    pub product: String,
    #[serde(default)]
    pub name: String,
    /// Parsed from its text form so no precision is lost on the way in.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl CartItem {
    pub fn new(product: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            product: product.into(),
            name: String::new(),
            price,
            quantity,
            image: None,
            stock: None,
        }
    }

    /// `price × quantity`
    pub fn subtotal(&self) -> Result<Decimal> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| {
                CheckoutError::ValidationError(format!(
                    "Subtotal of product {} overflows",
                    self.product
                ))
            })
    }
}

/// The cart as it stands when the payment step is shown.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub shipping_info: ShippingInfo,
    pub cart_items: Vec<CartItem>,
}

impl Cart {
    pub fn new(shipping_info: ShippingInfo, cart_items: Vec<CartItem>) -> Self {
        Self {
            shipping_info,
            cart_items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cart_items.is_empty()
    }

    /// Sum of `price × quantity` over every line, in cart order.
    pub fn total_price(&self) -> Result<Decimal> {
        self.cart_items.iter().try_fold(Decimal::ZERO, |total, item| {
            total.checked_add(item.subtotal()?).ok_or_else(|| {
                CheckoutError::ValidationError("Cart total overflows".to_string())
            })
        })
    }

    /// The total rounded to a whole amount, half away from zero.
    ///
    /// This is the amount sent to the backend when requesting a payment intent.
    pub fn payment_amount(&self) -> Result<u64> {
        let rounded = self
            .total_price()?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        rounded.to_u64().ok_or_else(|| {
            CheckoutError::ValidationError(format!("Cart total {rounded} is not a payable amount"))
        })
    }

    /// Text of the pay button, e.g. `Pay ₹1,250`.
    pub fn pay_label(&self) -> Result<String> {
        let total = self.total_price()?.normalize();
        Ok(format!("Pay ₹{}", group_thousands(total)))
    }
}

fn group_thousands(value: Decimal) -> String {
    let text = value.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
