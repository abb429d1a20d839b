#![allow(dead_code)]

use rust_decimal_macros::dec;
use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;
use storefront_checkout::application::checkout::CheckoutWorkflow;
use storefront_checkout::config::CheckoutConfig;
use storefront_checkout::domain::cart::{Cart, CartItem, ShippingInfo};
use storefront_checkout::domain::user::User;
use storefront_checkout::infrastructure::in_memory::{
    InMemoryOrderStore, RecordingNavigator, RecordingNotifier,
};
use storefront_checkout::infrastructure::simulated::{
    SimulatedOutcome, SimulatedPaymentIntentClient, SimulatedProcessor,
};

pub fn shipping_info() -> ShippingInfo {
    ShippingInfo {
        address: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "KA".to_string(),
        country: "IN".to_string(),
        pincode: "560001".to_string(),
        phone_no: "9876543210".to_string(),
    }
}

pub fn user() -> User {
    User::new("Asha Rao", "asha@example.com")
}

/// Two lines: 500 × 2 and 250 × 1.
pub fn sample_cart() -> Cart {
    Cart::new(
        shipping_info(),
        vec![
            CartItem::new("prod_phone", dec!(500), 2),
            CartItem::new("prod_case", dec!(250), 1),
        ],
    )
}

pub struct Checkout {
    pub workflow: Arc<CheckoutWorkflow>,
    pub store: InMemoryOrderStore,
    pub intents: SimulatedPaymentIntentClient,
    pub processor: Arc<SimulatedProcessor>,
    pub navigator: RecordingNavigator,
    pub notifier: RecordingNotifier,
}

pub fn checkout(intents: SimulatedPaymentIntentClient, outcome: SimulatedOutcome) -> Checkout {
    checkout_with_config(intents, outcome, CheckoutConfig::default())
}

pub fn checkout_with_config(
    intents: SimulatedPaymentIntentClient,
    outcome: SimulatedOutcome,
    config: CheckoutConfig,
) -> Checkout {
    let store = InMemoryOrderStore::new(sample_cart(), Some(user()));
    let processor = Arc::new(SimulatedProcessor::new(outcome));
    let navigator = RecordingNavigator::new();
    let notifier = RecordingNotifier::new();

    let workflow = CheckoutWorkflow::new(
        Box::new(intents.clone()),
        Box::new(store.clone()),
        Box::new(navigator.clone()),
        Box::new(notifier.clone()),
    )
    .with_config(config)
    .with_processor(processor.clone());

    Checkout {
        workflow: Arc::new(workflow),
        store,
        intents,
        processor,
        navigator,
        notifier,
    }
}

pub fn write_config(path: &Path, backend_url: &str) -> Result<(), Error> {
    let mut file = std::fs::File::create(path)?;
    write!(
        file,
        r#"
[backend]
base_url = "{backend_url}"

[processor]
publishable_key = "pk_test_123"
card_token = "tok_visa"

[customer]
name = "Asha Rao"
email = "asha@example.com"

[shipping]
address = "12 MG Road"
city = "Bengaluru"
state = "KA"
country = "IN"
pincode = "560001"
phoneNo = "9876543210"
"#
    )?;
    Ok(())
}

pub fn write_cart_csv(path: &Path) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["product", "name", "price", "quantity"])?;
    wtr.write_record(["prod_phone", "Phone", "500", "2"])?;
    wtr.write_record(["prod_case", "Case", "250", "1"])?;
    wtr.flush()?;
    Ok(())
}
