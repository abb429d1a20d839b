//! Configuration loaded from a TOML file, with environment overrides.

use crate::domain::cart::ShippingInfo;
use crate::domain::order::ORDER_SUCCESS_ROUTE;
use crate::domain::user::User;
use crate::error::{CheckoutError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Overrides `processor.publishable_key` when set.
pub const PROCESSOR_KEY_ENV: &str = "CHECKOUT_PROCESSOR_KEY";

/// Root configuration as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    pub customer: User,
    pub shipping: ShippingInfo,
}

/// Storefront backend that issues payment intents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    #[serde(default = "default_processor_api")]
    pub api_base: Url,
    #[serde(default)]
    pub publishable_key: String,
    /// Card token standing in for the mounted card field.
    #[serde(default)]
    pub card_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProcessorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            api_base: default_processor_api(),
            publishable_key: String::new(),
            card_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Behaviour of the submission workflow itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutConfig {
    /// Keep the submit control disabled after the processor reports a
    /// non-`succeeded` status.
    #[serde(default)]
    pub lock_on_non_terminal_status: bool,
    #[serde(default = "default_success_route")]
    pub success_route: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            lock_on_non_terminal_status: false,
            success_route: default_success_route(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_processor_api() -> Url {
    Url::parse("https://api.stripe.com").expect("valid default processor url")
}

fn default_success_route() -> String {
    ORDER_SUCCESS_ROUTE.to_string()
}

impl AppConfig {
    /// Reads, overrides from the environment and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_toml(&content)?;
        if let Ok(key) = std::env::var(PROCESSOR_KEY_ENV)
            && !key.is_empty()
        {
            config.processor.publishable_key = key;
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CheckoutError::ConfigError(e.to_string()))
    }

    /// Checks the settings needed to talk to the real backend and processor.
    pub fn validate(&self) -> Result<()> {
        if self.backend.timeout_secs == 0 || self.processor.timeout_secs == 0 {
            return Err(CheckoutError::ConfigError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.processor.publishable_key.is_empty() {
            return Err(CheckoutError::ConfigError(format!(
                "processor.publishable_key is empty (set it in the file or via {PROCESSOR_KEY_ENV})"
            )));
        }
        if self.customer.email.is_empty() {
            return Err(CheckoutError::ConfigError(
                "customer.email is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[backend]
base_url = "http://127.0.0.1:4000"

[processor]
publishable_key = "pk_test_123"
card_token = "tok_visa"

[checkout]
lock_on_non_terminal_status = true

[customer]
name = "Asha"
email = "asha@example.com"

[shipping]
address = "12 MG Road"
city = "Bengaluru"
state = "KA"
country = "IN"
pincode = "560001"
phoneNo = "9876543210"
"#;

    #[test]
    fn test_config_parsing() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.backend.base_url.as_str(), "http://127.0.0.1:4000/");
        assert_eq!(config.backend.timeout(), Duration::from_secs(30));
        assert_eq!(config.processor.api_base.as_str(), "https://api.stripe.com/");
        assert_eq!(config.processor.card_token.as_deref(), Some("tok_visa"));
        assert!(config.checkout.lock_on_non_terminal_status);
        assert_eq!(config.checkout.success_route, ORDER_SUCCESS_ROUTE);
        assert_eq!(config.shipping.phone_no, "9876543210");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_processor_key_fails_validation() {
        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        config.processor.publishable_key.clear();
        assert!(matches!(
            config.validate(),
            Err(CheckoutError::ConfigError(_))
        ));
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(
            AppConfig::from_toml("[backend]\nbase_url = 12"),
            Err(CheckoutError::ConfigError(_))
        ));
    }

    #[test]
    fn test_checkout_defaults() {
        let checkout = CheckoutConfig::default();
        assert!(!checkout.lock_on_non_terminal_status);
        assert_eq!(checkout.success_route, "/orders/success");
    }
}
