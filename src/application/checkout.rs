use crate::config::CheckoutConfig;
use crate::domain::cart::Cart;
use crate::domain::order::{Order, OrderConfirmation};
use crate::domain::payment::{BillingDetails, CardElement, CardPaymentMethod, Confirmation, PaymentRequest};
use crate::domain::ports::{
    NavigatorBox, Notification, NotifierBox, OrderStoreBox, PaymentIntentClientBox,
    PaymentProcessorRef, StoreAction,
};
use crate::domain::submission::{SubmissionGate, SubmissionState};
use crate::error::{CheckoutError, PROCESSING_FAILED_MESSAGE, Result};
use tokio::sync::RwLock;

/// Drives a single checkout payment from the pay button to the order.
///
/// `CheckoutWorkflow` owns its collaborators (backend client, order store,
/// navigator, notifier) and an optional processor session that can be
/// attached once the processor SDK has loaded. It is `Send + Sync`; share it
/// behind an `Arc` to submit from several tasks. The submission gate makes
/// sure only one of them gets past the first step.
pub struct CheckoutWorkflow {
    intents: PaymentIntentClientBox,
    processor: RwLock<Option<PaymentProcessorRef>>,
    store: OrderStoreBox,
    navigator: NavigatorBox,
    notifier: NotifierBox,
    gate: SubmissionGate,
    config: CheckoutConfig,
}

impl CheckoutWorkflow {
    /// Creates a workflow with no processor session attached.
    ///
    /// # Arguments
    ///
    /// * `intents` - Backend client issuing payment-intent secrets.
    /// * `store` - Application state the cart and user are read from.
    /// * `navigator` - Receives the redirect after a confirmed payment.
    /// * `notifier` - Receives user-facing error messages.
    pub fn new(
        intents: PaymentIntentClientBox,
        store: OrderStoreBox,
        navigator: NavigatorBox,
        notifier: NotifierBox,
    ) -> Self {
        Self {
            intents,
            processor: RwLock::new(None),
            store,
            navigator,
            notifier,
            gate: SubmissionGate::new(),
            config: CheckoutConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CheckoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_processor(self, processor: PaymentProcessorRef) -> Self {
        Self {
            processor: RwLock::new(Some(processor)),
            ..self
        }
    }

    /// Installs the processor session once it becomes available.
    pub async fn attach_processor(&self, processor: PaymentProcessorRef) {
        *self.processor.write().await = Some(processor);
        tracing::debug!("payment processor session attached");
    }

    pub fn state(&self) -> SubmissionState {
        self.gate.state()
    }

    /// Whether the pay button accepts a click.
    pub fn is_submission_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Whether a processor session is attached and its card field mounted.
    pub async fn is_ready(&self) -> bool {
        self.ready_processor().await.is_some()
    }

    /// Text of the pay button for the current cart.
    pub async fn pay_label(&self) -> Result<String> {
        self.store.read_cart().await?.pay_label()
    }

    /// Runs one payment attempt.
    ///
    /// On success the order has been dispatched, the cart emptied and the
    /// navigator sent to the success route. Every failure is terminal for
    /// this attempt: nothing is retried and the error is also reported
    /// through the notifier, except for [`CheckoutError::FormNotReady`]
    /// which abandons the attempt silently, and the gate errors
    /// ([`CheckoutError::AlreadySubmitting`], [`CheckoutError::SubmissionLocked`])
    /// which leave the in-flight attempt untouched.
    pub async fn submit(&self) -> Result<OrderConfirmation> {
        if let Err(err) = self.gate.try_begin() {
            tracing::debug!(error = %err, "submission rejected by gate");
            return Err(err);
        }
        tracing::info!("checkout submission started");

        match self.run().await {
            Ok(confirmation) => {
                self.gate.succeed();
                tracing::info!(
                    total = %confirmation.order.total_price,
                    route = %confirmation.redirect_to,
                    "payment confirmed, order dispatched"
                );
                self.navigator.navigate(&confirmation.redirect_to);
                Ok(confirmation)
            }
            Err(err) => {
                self.settle_failure(&err);
                Err(err)
            }
        }
    }

    /// Surfaces an error the store reported after the fact, then clears it.
    ///
    /// Leaves the submission state alone.
    pub async fn drain_store_error(&self) -> Result<Option<String>> {
        let Some(message) = self.store.order_error().await? else {
            return Ok(None);
        };
        tracing::warn!(error = %message, "order store reported an error");
        self.store.dispatch(StoreAction::ClearErrors).await?;
        self.notifier.notify(Notification::error(message.clone()));
        Ok(Some(message))
    }

    async fn run(&self) -> Result<OrderConfirmation> {
        let cart = self.store.read_cart().await.map_err(unexpected)?;
        let user = self
            .store
            .read_user()
            .await
            .map_err(unexpected)?
            .ok_or_else(|| CheckoutError::ValidationError("No signed-in user".to_string()))?;
        if cart.is_empty() {
            return Err(CheckoutError::ValidationError("Cart is empty".to_string()));
        }

        let request = PaymentRequest::for_cart(&cart, &user)?;
        tracing::debug!(amount = request.amount, "requesting payment intent");
        let secret = self
            .intents
            .create_payment_intent(&request)
            .await
            .map_err(network)?;

        let Some((processor, card)) = self.ready_processor().await else {
            return Err(CheckoutError::FormNotReady);
        };

        let method = CardPaymentMethod {
            card,
            billing_details: BillingDetails::new(&cart.shipping_info, &user),
        };
        let confirmation = processor
            .confirm_card_payment(&secret, &method)
            .await
            .map_err(unexpected)?;

        match confirmation {
            Confirmation::Error(detail) => Err(CheckoutError::Processor {
                message: detail.message,
            }),
            Confirmation::Intent(intent) if intent.status.is_succeeded() => {
                let order = Order::from_cart(&cart)?.with_payment(intent.into());
                self.place_order(&cart, order).await
            }
            Confirmation::Intent(intent) => {
                Err(CheckoutError::NonTerminalStatus { status: intent.status })
            }
        }
    }

    async fn place_order(&self, cart: &Cart, order: Order) -> Result<OrderConfirmation> {
        tracing::debug!(items = cart.cart_items.len(), "dispatching new order");
        self.store
            .dispatch(StoreAction::NewOrder(order.clone()))
            .await
            .map_err(|err| CheckoutError::OrderNotRecorded(err.to_string()))?;
        // The order exists from here on; a stale cart must not reopen the pay button.
        if let Err(err) = self.store.dispatch(StoreAction::EmptyCart).await {
            tracing::warn!(error = %err, "order placed but the cart could not be emptied");
        }

        Ok(OrderConfirmation {
            order,
            redirect_to: self.config.success_route.clone(),
        })
    }

    async fn ready_processor(&self) -> Option<(PaymentProcessorRef, CardElement)> {
        let processor = self.processor.read().await.clone()?;
        let card = processor.card_element()?;
        Some((processor, card))
    }

    fn settle_failure(&self, err: &CheckoutError) {
        match err {
            CheckoutError::FormNotReady => {
                tracing::warn!("payment form not ready, submission abandoned");
                self.gate.abandon();
            }
            CheckoutError::NonTerminalStatus { status } => {
                tracing::warn!(%status, "payment not settled");
                self.gate.fail(!self.config.lock_on_non_terminal_status);
                self.notifier
                    .notify(Notification::error(PROCESSING_FAILED_MESSAGE));
            }
            CheckoutError::OrderNotRecorded(_) => {
                tracing::error!(error = %err, "charged without an order, submission locked");
                self.gate.fail(false);
                self.notifier.notify(Notification::error(err.to_string()));
            }
            other => {
                tracing::error!(error = %other, "checkout submission failed");
                self.gate.fail(true);
                self.notifier.notify(Notification::error(other.to_string()));
            }
        }
    }
}

fn network(err: CheckoutError) -> CheckoutError {
    match err {
        CheckoutError::Network(_) => err,
        other => CheckoutError::Network(other.to_string()),
    }
}

fn unexpected(err: CheckoutError) -> CheckoutError {
    match err {
        CheckoutError::Unexpected(_) => err,
        other => CheckoutError::Unexpected(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::{CartItem, ShippingInfo};
    use crate::domain::payment::PaymentIntentStatus;
    use crate::domain::user::User;
    use crate::infrastructure::in_memory::{InMemoryOrderStore, RecordingNavigator, RecordingNotifier};
    use crate::infrastructure::simulated::{
        SimulatedOutcome, SimulatedPaymentIntentClient, SimulatedProcessor,
    };
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct Harness {
        workflow: CheckoutWorkflow,
        store: InMemoryOrderStore,
        intents: SimulatedPaymentIntentClient,
        processor: Arc<SimulatedProcessor>,
        navigator: RecordingNavigator,
        notifier: RecordingNotifier,
    }

    fn harness(outcome: SimulatedOutcome) -> Harness {
        let cart = Cart::new(
            ShippingInfo {
                address: "12 MG Road".to_string(),
                city: "Bengaluru".to_string(),
                state: "KA".to_string(),
                country: "IN".to_string(),
                pincode: "560001".to_string(),
                phone_no: "9876543210".to_string(),
            },
            vec![
                CartItem::new("p1", dec!(500), 2),
                CartItem::new("p2", dec!(250), 1),
            ],
        );
        let store = InMemoryOrderStore::new(cart, Some(User::new("Asha", "asha@example.com")));
        let intents = SimulatedPaymentIntentClient::new();
        let processor = Arc::new(SimulatedProcessor::new(outcome));
        let navigator = RecordingNavigator::new();
        let notifier = RecordingNotifier::new();

        let workflow = CheckoutWorkflow::new(
            Box::new(intents.clone()),
            Box::new(store.clone()),
            Box::new(navigator.clone()),
            Box::new(notifier.clone()),
        )
        .with_processor(processor.clone());

        Harness {
            workflow,
            store,
            intents,
            processor,
            navigator,
            notifier,
        }
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let h = harness(SimulatedOutcome::Succeed);

        let confirmation = h.workflow.submit().await.unwrap();

        assert_eq!(confirmation.order.total_price, dec!(1250));
        assert!(confirmation.order.is_paid());
        assert_eq!(h.workflow.state(), SubmissionState::Succeeded);
        assert!(!h.workflow.is_submission_enabled());
        assert_eq!(h.navigator.routes(), vec!["/orders/success".to_string()]);
        assert!(h.notifier.messages().is_empty());
        assert!(h.store.cart().await.cart_items.is_empty());
        assert_eq!(h.intents.requests()[0].amount, 1250);
    }

    #[tokio::test]
    async fn test_processor_error_reenables() {
        let h = harness(SimulatedOutcome::Decline("Your card was declined.".to_string()));

        let err = h.workflow.submit().await.unwrap_err();

        assert!(matches!(err, CheckoutError::Processor { .. }));
        assert_eq!(h.workflow.state(), SubmissionState::Failed);
        assert!(h.workflow.is_submission_enabled());
        assert_eq!(h.notifier.messages(), vec!["Your card was declined.".to_string()]);
        assert!(h.store.actions().await.is_empty());
    }

    #[tokio::test]
    async fn test_non_terminal_status_reenables_by_default() {
        let h = harness(SimulatedOutcome::Status(PaymentIntentStatus::Processing));

        let err = h.workflow.submit().await.unwrap_err();

        assert!(matches!(err, CheckoutError::NonTerminalStatus { .. }));
        assert!(h.workflow.is_submission_enabled());
        assert_eq!(h.notifier.messages(), vec![PROCESSING_FAILED_MESSAGE.to_string()]);
        assert!(h.store.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_form_not_ready_is_silent() {
        let h = harness(SimulatedOutcome::Succeed);
        h.processor.unmount_card();

        let err = h.workflow.submit().await.unwrap_err();

        assert!(matches!(err, CheckoutError::FormNotReady));
        assert_eq!(h.workflow.state(), SubmissionState::Idle);
        assert!(h.notifier.messages().is_empty());
        assert_eq!(h.processor.confirmations(), 0);
        assert_eq!(h.intents.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_user_is_validation_error() {
        let h = harness(SimulatedOutcome::Succeed);
        h.store.set_user(None).await;

        let err = h.workflow.submit().await.unwrap_err();

        assert!(matches!(err, CheckoutError::ValidationError(_)));
        assert!(h.intents.requests().is_empty());
        assert!(h.workflow.is_submission_enabled());
    }

    #[tokio::test]
    async fn test_drain_store_error() {
        let h = harness(SimulatedOutcome::Succeed);
        assert_eq!(h.workflow.drain_store_error().await.unwrap(), None);

        h.store.set_order_error("Order could not be saved").await;
        let drained = h.workflow.drain_store_error().await.unwrap();

        assert_eq!(drained.as_deref(), Some("Order could not be saved"));
        assert_eq!(h.store.actions().await, vec![StoreAction::ClearErrors]);
        assert_eq!(h.notifier.messages(), vec!["Order could not be saved".to_string()]);
        assert_eq!(h.workflow.drain_store_error().await.unwrap(), None);
        assert_eq!(h.workflow.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_pay_label_reads_cart() {
        let h = harness(SimulatedOutcome::Succeed);
        assert_eq!(h.workflow.pay_label().await.unwrap(), "Pay ₹1,250");
    }
}
