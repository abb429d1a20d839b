use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use storefront_checkout::application::checkout::CheckoutWorkflow;
use storefront_checkout::config::AppConfig;
use storefront_checkout::domain::cart::Cart;
use storefront_checkout::domain::payment::CardElement;
use storefront_checkout::domain::ports::{PaymentIntentClientBox, PaymentProcessorRef};
use storefront_checkout::infrastructure::http::{HttpPaymentIntentClient, RestPaymentProcessor};
use storefront_checkout::infrastructure::in_memory::InMemoryOrderStore;
use storefront_checkout::infrastructure::simulated::{
    DEFAULT_CARD_TOKEN, SimulatedOutcome, SimulatedPaymentIntentClient, SimulatedProcessor,
};
use storefront_checkout::interfaces::console::{LogNavigator, LogNotifier};
use storefront_checkout::interfaces::csv::cart_reader::CartReader;
use storefront_checkout::interfaces::json::OrderWriter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Cart lines CSV file (product, name, price, quantity)
    cart: PathBuf,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "checkout.toml")]
    config: PathBuf,

    /// Override the storefront backend URL
    #[arg(long)]
    backend_url: Option<Url>,

    /// Override the processor publishable key
    #[arg(long)]
    processor_key: Option<String>,

    /// Card token standing in for the card field
    #[arg(long)]
    card_token: Option<String>,

    /// Run offline; the processor answers with OUTCOME
    /// (succeeded, declined, unreachable or any intent status)
    #[arg(long, value_name = "OUTCOME")]
    simulate: Option<SimulatedOutcome>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config).into_diagnostic()?;
    if let Some(url) = cli.backend_url {
        config.backend.base_url = url;
    }
    if let Some(key) = cli.processor_key {
        config.processor.publishable_key = key;
    }
    let card_token = cli.card_token.or_else(|| config.processor.card_token.clone());

    let file = File::open(&cli.cart).into_diagnostic()?;
    let items = CartReader::new(file).read_all().into_diagnostic()?;
    let store = InMemoryOrderStore::new(
        Cart::new(config.shipping.clone(), items),
        Some(config.customer.clone()),
    );

    let (intents, processor): (PaymentIntentClientBox, PaymentProcessorRef) = match cli.simulate {
        Some(outcome) => {
            tracing::info!(?outcome, "running offline");
            let card = CardElement::new(card_token.as_deref().unwrap_or(DEFAULT_CARD_TOKEN));
            (
                Box::new(SimulatedPaymentIntentClient::new()) as PaymentIntentClientBox,
                Arc::new(SimulatedProcessor::new(outcome).with_card(Some(card))) as PaymentProcessorRef,
            )
        }
        None => {
            config.validate().into_diagnostic()?;
            let mut processor = RestPaymentProcessor::new(
                config.processor.api_base.clone(),
                config.processor.publishable_key.clone(),
                config.processor.timeout(),
            )
            .into_diagnostic()?;
            if let Some(token) = card_token {
                processor = processor.with_card(CardElement::new(token));
            }
            let intents =
                HttpPaymentIntentClient::new(config.backend.base_url.clone(), config.backend.timeout())
                    .into_diagnostic()?;
            (
                Box::new(intents) as PaymentIntentClientBox,
                Arc::new(processor) as PaymentProcessorRef,
            )
        }
    };

    let workflow = CheckoutWorkflow::new(
        intents,
        Box::new(store),
        Box::new(LogNavigator),
        Box::new(LogNotifier),
    )
    .with_config(config.checkout.clone())
    .with_processor(processor);

    let label = workflow.pay_label().await.into_diagnostic()?;
    tracing::info!(%label, "submitting payment");

    let confirmation = workflow.submit().await.into_diagnostic()?;
    workflow.drain_store_error().await.into_diagnostic()?;

    let stdout = io::stdout();
    OrderWriter::new(stdout.lock())
        .write_confirmation(&confirmation)
        .into_diagnostic()?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
