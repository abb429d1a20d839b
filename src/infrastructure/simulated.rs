//! Offline backend and processor for dry runs.
//!
//! Neither adapter touches the network. The intent client hands out
//! well-formed client secrets; the processor answers every confirmation with
//! a preconfigured outcome.

use crate::domain::payment::{
    CardElement, CardPaymentMethod, ClientSecret, Confirmation, PaymentIntent,
    PaymentIntentStatus, PaymentRequest, ProcessorErrorDetail,
};
use crate::domain::ports::{PaymentIntentClient, PaymentProcessor};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const DEFAULT_DECLINE_MESSAGE: &str = "Your card was declined.";
pub const DEFAULT_CARD_TOKEN: &str = "tok_visa";

/// Payment intent client that never leaves the process.
#[derive(Default, Clone)]
pub struct SimulatedPaymentIntentClient {
    requests: Arc<Mutex<Vec<PaymentRequest>>>,
    failure: Option<Arc<str>>,
    latency: Option<Duration>,
}

impl SimulatedPaymentIntentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request fails with a network error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(Arc::from(message)),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PaymentIntentClient for SimulatedPaymentIntentClient {
    async fn create_payment_intent(&self, request: &PaymentRequest) -> Result<ClientSecret> {
        let n = {
            let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
            requests.push(request.clone());
            requests.len()
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match &self.failure {
            Some(message) => Err(CheckoutError::Network(message.to_string())),
            None => Ok(ClientSecret::new(format!("pi_sim_{n}_secret_sim{n}"))),
        }
    }
}

/// What a [`SimulatedProcessor`] answers.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedOutcome {
    Succeed,
    Decline(String),
    Status(PaymentIntentStatus),
    /// The processor cannot be reached at all.
    Unreachable(String),
}

impl FromStr for SimulatedOutcome {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("outcome must not be empty".to_string()),
            "succeed" | "succeeded" => Ok(Self::Succeed),
            "decline" | "declined" => Ok(Self::Decline(DEFAULT_DECLINE_MESSAGE.to_string())),
            "unreachable" => Ok(Self::Unreachable("processor unreachable".to_string())),
            status => Ok(Self::Status(PaymentIntentStatus::from(status))),
        }
    }
}

/// Processor session with a scripted answer.
pub struct SimulatedProcessor {
    outcome: SimulatedOutcome,
    card: Mutex<Option<CardElement>>,
    confirmations: AtomicUsize,
    last_method: Mutex<Option<CardPaymentMethod>>,
}

impl SimulatedProcessor {
    /// A session with a card field already mounted.
    pub fn new(outcome: SimulatedOutcome) -> Self {
        Self {
            outcome,
            card: Mutex::new(Some(CardElement::new(DEFAULT_CARD_TOKEN))),
            confirmations: AtomicUsize::new(0),
            last_method: Mutex::new(None),
        }
    }

    pub fn with_card(self, card: Option<CardElement>) -> Self {
        *self.card.lock().unwrap_or_else(PoisonError::into_inner) = card;
        self
    }

    pub fn unmount_card(&self) {
        *self.card.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn confirmations(&self) -> usize {
        self.confirmations.load(Ordering::SeqCst)
    }

    /// Payment method of the latest confirmation.
    pub fn last_method(&self) -> Option<CardPaymentMethod> {
        self.last_method
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedProcessor {
    fn card_element(&self) -> Option<CardElement> {
        self.card
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        method: &CardPaymentMethod,
    ) -> Result<Confirmation> {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        *self
            .last_method
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(method.clone());

        let id = secret
            .intent_id()
            .ok_or_else(|| CheckoutError::Unexpected("Malformed client secret".to_string()))?
            .to_string();

        match &self.outcome {
            SimulatedOutcome::Succeed => Ok(Confirmation::Intent(PaymentIntent {
                id,
                status: PaymentIntentStatus::Succeeded,
            })),
            SimulatedOutcome::Decline(message) => Ok(Confirmation::Error(ProcessorErrorDetail {
                message: message.clone(),
                code: Some("card_declined".to_string()),
                kind: Some("card_error".to_string()),
            })),
            SimulatedOutcome::Status(status) => Ok(Confirmation::Intent(PaymentIntent {
                id,
                status: status.clone(),
            })),
            SimulatedOutcome::Unreachable(message) => Err(CheckoutError::Unexpected(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{BillingAddress, BillingDetails};

    fn method() -> CardPaymentMethod {
        CardPaymentMethod {
            card: CardElement::new(DEFAULT_CARD_TOKEN),
            billing_details: BillingDetails {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                address: BillingAddress {
                    line1: "12 MG Road".to_string(),
                    city: "Bengaluru".to_string(),
                    country: "IN".to_string(),
                    state: "KA".to_string(),
                    postal_code: "560001".to_string(),
                },
            },
        }
    }

    #[test]
    fn test_outcome_parsing() {
        assert_eq!("succeeded".parse::<SimulatedOutcome>(), Ok(SimulatedOutcome::Succeed));
        assert_eq!(
            "declined".parse::<SimulatedOutcome>(),
            Ok(SimulatedOutcome::Decline(DEFAULT_DECLINE_MESSAGE.to_string()))
        );
        assert_eq!(
            "requires_action".parse::<SimulatedOutcome>(),
            Ok(SimulatedOutcome::Status(PaymentIntentStatus::RequiresAction))
        );
        assert!("".parse::<SimulatedOutcome>().is_err());
    }

    #[tokio::test]
    async fn test_intent_client_issues_distinct_secrets() {
        let client = SimulatedPaymentIntentClient::new();
        let request = PaymentRequest {
            amount: 10,
            email: "a@b.c".to_string(),
            phone_no: "1".to_string(),
        };

        let first = client.create_payment_intent(&request).await.unwrap();
        let second = client.create_payment_intent(&request).await.unwrap();

        assert_eq!(first.intent_id(), Some("pi_sim_1"));
        assert_eq!(second.intent_id(), Some("pi_sim_2"));
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_intent_client() {
        let client = SimulatedPaymentIntentClient::failing("connection refused");
        let request = PaymentRequest {
            amount: 10,
            email: "a@b.c".to_string(),
            phone_no: "1".to_string(),
        };
        assert!(matches!(
            client.create_payment_intent(&request).await,
            Err(CheckoutError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_processor_uses_intent_id_from_secret() {
        let processor = SimulatedProcessor::new(SimulatedOutcome::Succeed);
        let result = processor
            .confirm_card_payment(&ClientSecret::new("pi_42_secret_x"), &method())
            .await
            .unwrap();

        assert_eq!(
            result,
            Confirmation::Intent(PaymentIntent {
                id: "pi_42".to_string(),
                status: PaymentIntentStatus::Succeeded,
            })
        );
        assert_eq!(processor.confirmations(), 1);
        assert_eq!(processor.last_method(), Some(method()));
    }

    #[tokio::test]
    async fn test_processor_rejects_malformed_secret() {
        let processor = SimulatedProcessor::new(SimulatedOutcome::Succeed);
        assert!(matches!(
            processor
                .confirm_card_payment(&ClientSecret::new("nonsense"), &method())
                .await,
            Err(CheckoutError::Unexpected(_))
        ));
    }
}
