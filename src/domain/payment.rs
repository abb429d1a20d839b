use super::cart::{Cart, ShippingInfo};
use super::user::User;
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Body of `POST /api/v1/payment/process`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Cart total rounded to a whole amount.
    pub amount: u64,
    pub email: String,
    pub phone_no: String,
}

impl PaymentRequest {
    pub fn for_cart(cart: &Cart, user: &User) -> Result<Self> {
        Ok(Self {
            amount: cart.payment_amount()?,
            email: user.email.clone(),
            phone_no: cart.shipping_info.phone_no.clone(),
        })
    }
}

/// Opaque token handed out by the backend and used to confirm a payment intent.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The payment intent id, i.e. everything before `_secret_`.
    pub fn intent_id(&self) -> Option<&str> {
        self.0
            .split_once("_secret_")
            .map(|(id, _)| id)
            .filter(|id| !id.is_empty())
    }
}

// Secrets must not leak into logs.
impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClientSecret").field(&"<redacted>").finish()
    }
}

/// Reference to a mounted card-number field.
///
/// For the REST processor this is a card token (e.g. `tok_visa`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardElement(String);

impl CardElement {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BillingAddress {
    pub line1: String,
    pub city: String,
    pub country: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BillingDetails {
    pub name: String,
    pub email: String,
    pub address: BillingAddress,
}

impl BillingDetails {
    pub fn new(shipping: &ShippingInfo, user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            address: BillingAddress {
                line1: shipping.address.clone(),
                city: shipping.city.clone(),
                country: shipping.country.clone(),
                state: shipping.state.clone(),
                postal_code: shipping.pincode.clone(),
            },
        }
    }
}

/// Payment method passed to the processor's confirm call.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPaymentMethod {
    pub card: CardElement,
    pub billing_details: BillingDetails,
}

/// Lifecycle status reported by the processor for a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentIntentStatus {
    Succeeded,
    Processing,
    RequiresAction,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresCapture,
    Canceled,
    Other(String),
}

impl PaymentIntentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Processing => "processing",
            Self::RequiresAction => "requires_action",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Other(s) => s,
        }
    }

    pub fn is_succeeded(&self) -> bool {
        *self == Self::Succeeded
    }
}

impl From<&str> for PaymentIntentStatus {
    fn from(s: &str) -> Self {
        match s {
            "succeeded" => Self::Succeeded,
            "processing" => Self::Processing,
            "requires_action" => Self::RequiresAction,
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            "requires_capture" => Self::RequiresCapture,
            "canceled" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentIntentStatus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentIntentStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub status: PaymentIntentStatus,
}

/// Error object returned by the processor when it refuses a confirmation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ProcessorErrorDetail {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Outcome of a confirm-card-payment call that reached the processor.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    Error(ProcessorErrorDetail),
    Intent(PaymentIntent),
}
