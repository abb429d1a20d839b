use crate::domain::payment::PaymentIntentStatus;
use thiserror::Error;

/// Message shown when the processor accepts the payment but does not settle it.
pub const PROCESSING_FAILED_MESSAGE: &str = "Processing Payment Failed!";

#[derive(Error, Debug)]
pub enum CheckoutError {
    /// The storefront backend could not produce a client secret.
    #[error("Network error: {0}")]
    Network(String),
    /// The processor rejected the card (declined, validation failure, ...).
    #[error("{message}")]
    Processor { message: String },
    /// The processor answered with a status other than `succeeded`.
    #[error("Processing Payment Failed! (status: {status})")]
    NonTerminalStatus { status: PaymentIntentStatus },
    #[error("{0}")]
    Unexpected(String),
    /// The payment went through but the store refused the order.
    #[error("Payment received but the order could not be recorded: {0}")]
    OrderNotRecorded(String),
    /// No processor session is attached or the card fields are not mounted.
    #[error("Payment form is not ready")]
    FormNotReady,
    #[error("A payment is already being submitted")]
    AlreadySubmitting,
    #[error("Payment submission is disabled")]
    SubmissionLocked,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
