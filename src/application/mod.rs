//! Application layer orchestrating the checkout ports.
//!
//! `CheckoutWorkflow` takes a cart from the pay button to a dispatched order:
//! payment intent from the backend, card confirmation with the processor,
//! then order creation and cart clearing in the store.

pub mod checkout;
