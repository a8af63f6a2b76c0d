use serde::{Deserialize, Serialize};

use super::form::{required_text, Form};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Form for Credentials {
    type Payload = Credentials;

    fn validate(&self) -> ClientResult<Credentials> {
        let username = required_text("username", &self.username)?;
        // Passwords are sent as typed; only emptiness is checked
        if self.password.is_empty() {
            return Err(ClientError::field("password", "This field is required"));
        }
        Ok(Credentials {
            username,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The server issued a token with the account
    SignedIn,
    /// Account created; a separate login is required
    Registered,
}
