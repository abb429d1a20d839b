//! HTTP adapters for the storefront backend and the card processor.
//!
//! Both wrap a `reqwest::Client`; failures are first expressed as
//! [`ClientError`] and converted to [`CheckoutError`] at the port boundary.

use crate::domain::payment::{
    CardElement, CardPaymentMethod, ClientSecret, Confirmation, PaymentIntent, PaymentRequest,
    ProcessorErrorDetail,
};
use crate::domain::ports::{PaymentIntentClient, PaymentProcessor};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const PAYMENT_PROCESS_PATH: &str = "/api/v1/payment/process";

/// Errors produced by the HTTP adapters.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout, ...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("response is missing `client_secret`")]
    MissingClientSecret,

    #[error("client secret does not name a payment intent")]
    MalformedClientSecret,
}

fn build_http(timeout: Duration) -> std::result::Result<Client, ClientError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> std::result::Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

#[derive(Debug, Deserialize)]
struct PaymentProcessResponse {
    #[serde(default)]
    client_secret: Option<String>,
}

/// Client for the storefront backend's payment endpoint.
#[derive(Debug, Clone)]
pub struct HttpPaymentIntentClient {
    http: Client,
    base_url: Url,
}

impl HttpPaymentIntentClient {
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(base_url: Url, timeout: Duration) -> std::result::Result<Self, ClientError> {
        Ok(Self {
            http: build_http(timeout)?,
            base_url,
        })
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /api/v1/payment/process`
    pub async fn process_payment(
        &self,
        request: &PaymentRequest,
    ) -> std::result::Result<ClientSecret, ClientError> {
        let url = self.base_url.join(PAYMENT_PROCESS_PATH)?;

        // `.json()` also sets `Content-Type: application/json`.
        let resp = self.http.post(url).json(request).send().await?;
        let body: PaymentProcessResponse = parse_response(resp).await?;

        body.client_secret
            .filter(|s| !s.is_empty())
            .map(ClientSecret::new)
            .ok_or(ClientError::MissingClientSecret)
    }
}

#[async_trait]
impl PaymentIntentClient for HttpPaymentIntentClient {
    async fn create_payment_intent(&self, request: &PaymentRequest) -> Result<ClientSecret> {
        self.process_payment(request).await.map_err(|e| {
            tracing::error!(error = %e, "payment intent request failed");
            CheckoutError::Network(e.to_string())
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProcessorErrorEnvelope {
    error: ProcessorErrorDetail,
}

/// Card processor speaking the Stripe-style payment intents REST API.
///
/// Confirms with the publishable key and the intent's client secret, the
/// same credentials a browser-side SDK holds. The card field is stood in
/// for by a card token.
#[derive(Debug, Clone)]
pub struct RestPaymentProcessor {
    http: Client,
    api_base: Url,
    publishable_key: String,
    card: Option<CardElement>,
}

impl RestPaymentProcessor {
    pub fn new(
        api_base: Url,
        publishable_key: impl Into<String>,
        timeout: Duration,
    ) -> std::result::Result<Self, ClientError> {
        Ok(Self {
            http: build_http(timeout)?,
            api_base,
            publishable_key: publishable_key.into(),
            card: None,
        })
    }

    /// Mounts the card field.
    pub fn with_card(mut self, card: CardElement) -> Self {
        self.card = Some(card);
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /v1/payment_intents/{id}/confirm`
    pub async fn confirm(
        &self,
        secret: &ClientSecret,
        method: &CardPaymentMethod,
    ) -> std::result::Result<Confirmation, ClientError> {
        let intent_id = secret
            .intent_id()
            .ok_or(ClientError::MalformedClientSecret)?;
        let url = self
            .api_base
            .join(&format!("/v1/payment_intents/{intent_id}/confirm"))?;

        let billing = &method.billing_details;
        let form = [
            ("client_secret", secret.expose()),
            ("payment_method_data[type]", "card"),
            ("payment_method_data[card][token]", method.card.token()),
            ("payment_method_data[billing_details][name]", billing.name.as_str()),
            ("payment_method_data[billing_details][email]", billing.email.as_str()),
            (
                "payment_method_data[billing_details][address][line1]",
                billing.address.line1.as_str(),
            ),
            (
                "payment_method_data[billing_details][address][city]",
                billing.address.city.as_str(),
            ),
            (
                "payment_method_data[billing_details][address][country]",
                billing.address.country.as_str(),
            ),
            (
                "payment_method_data[billing_details][address][state]",
                billing.address.state.as_str(),
            ),
            (
                "payment_method_data[billing_details][address][postal_code]",
                billing.address.postal_code.as_str(),
            ),
        ];

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.publishable_key)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if status.is_client_error() {
            // Declines and validation failures come back as 4xx with an error object.
            let body = resp.text().await.unwrap_or_default();
            return match serde_json::from_str::<ProcessorErrorEnvelope>(&body) {
                Ok(envelope) => Ok(Confirmation::Error(envelope.error)),
                Err(_) => Err(ClientError::Api { status, body }),
            };
        }

        let intent: PaymentIntent = parse_response(resp).await?;
        Ok(Confirmation::Intent(intent))
    }
}

#[async_trait]
impl PaymentProcessor for RestPaymentProcessor {
    fn card_element(&self) -> Option<CardElement> {
        self.card.clone()
    }

    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        method: &CardPaymentMethod,
    ) -> Result<Confirmation> {
        self.confirm(secret, method).await.map_err(|e| {
            tracing::error!(error = %e, "card confirmation failed");
            CheckoutError::Unexpected(e.to_string())
        })
    }
}
