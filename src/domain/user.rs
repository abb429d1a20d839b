use serde::{Deserialize, Serialize};

/// The signed-in customer paying for the cart.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct User {
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}
