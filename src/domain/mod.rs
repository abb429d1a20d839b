//! Checkout domain: cart, payment and order types, the submission gate, and
//! the ports the workflow talks to.

pub mod cart;
pub mod order;
pub mod payment;
pub mod ports;
pub mod submission;
pub mod user;
