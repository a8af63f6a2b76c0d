// Client Error Types
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::guard::Route;

/// Errors surfaced by the budget client, normalized from transport failures,
/// HTTP status codes and client-side form validation.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    // Request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    // 401 Unauthorized - stale or invalid token
    #[error("Session expired: {0}")]
    Auth(String),

    // 4xx with a server message
    #[error("{message}")]
    Validation { status: u16, message: String },

    // 5xx
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    // Rejected before any network call
    #[error("{message}")]
    InvalidInput {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    // No token in the session store
    #[error("Not logged in (redirecting to {redirect})")]
    NotAuthenticated { redirect: Route },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP-equivalent status code, 0 when no response was received
    pub fn status_code(&self) -> u16 {
        match self {
            ClientError::Network(_) => 0,
            ClientError::Auth(_) => 401,
            ClientError::Validation { status, .. } => *status,
            ClientError::Server { status, .. } => *status,
            ClientError::InvalidInput { .. } => 400,
            ClientError::NotAuthenticated { .. } => 401,
            ClientError::Decode(_) => 502,
            ClientError::Storage(_) => 0,
            ClientError::Config(_) => 0,
        }
    }

    /// Stable error code for scripted consumers of `--json` output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Auth(_) => "AUTH_ERROR",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Server { .. } => "SERVER_ERROR",
            ClientError::InvalidInput { .. } => "INVALID_INPUT",
            ClientError::NotAuthenticated { .. } => "NOT_AUTHENTICATED",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Storage(_) => "STORAGE_ERROR",
            ClientError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True for failures that must end the session
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }

    /// Convert to the JSON body printed by the CLI
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        });

        match self {
            ClientError::InvalidInput { field_errors, .. } if !field_errors.is_empty() => {
                response["field_errors"] = json!(field_errors);
            }
            ClientError::NotAuthenticated { redirect } => {
                response["redirect"] = json!(redirect.path());
            }
            _ => {}
        }

        response
    }

    /// Map a non-success HTTP response onto the error taxonomy
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| default_message(status));

        match status {
            401 => ClientError::Auth(message),
            400..=499 => ClientError::Validation { status, message },
            _ => ClientError::Server { status, message },
        }
    }
}

// Constructors
impl ClientError {
    pub fn invalid_input(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        ClientError::InvalidInput {
            message: message.into(),
            field_errors,
        }
    }

    pub fn field(field: &str, problem: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.to_string(), problem.into());
        ClientError::invalid_input("Invalid form input", field_errors)
    }

    pub fn not_authenticated() -> Self {
        ClientError::NotAuthenticated {
            redirect: Route::Login,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ClientError::Decode(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ClientError::Storage(message.into())
    }
}

// Server error bodies use `error`, `message` or `msg` depending on the layer
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message", "msg"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn default_message(status: u16) -> String {
    match status {
        401 => "Token is missing or no longer valid".to_string(),
        404 => "Resource not found".to_string(),
        409 => "Conflict".to_string(),
        400..=499 => format!("Request rejected with status {}", status),
        _ => format!("Server failed with status {}", status),
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("Invalid API URL: {}", err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_maps_to_auth_error() {
        let err = ClientError::from_status(401, r#"{"msg": "Token has expired"}"#);
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "Session expired: Token has expired");
    }

    #[test]
    fn test_client_error_carries_server_message() {
        let err = ClientError::from_status(409, r#"{"error": "Username already taken"}"#);
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.to_string(), "Username already taken");
    }

    #[test]
    fn test_server_error_without_json_body() {
        let err = ClientError::from_status(502, "<html>bad gateway</html>");
        assert!(matches!(err, ClientError::Server { status: 502, .. }));
    }

    #[test]
    fn test_invalid_input_json_lists_fields() {
        let err = ClientError::field("contribution_percent", "Must be between 1 and 100");
        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error_code"], "INVALID_INPUT");
        assert_eq!(
            body["field_errors"]["contribution_percent"],
            "Must be between 1 and 100"
        );
    }

    #[test]
    fn test_not_authenticated_redirects_to_login() {
        let body = ClientError::not_authenticated().to_json();
        assert_eq!(body["redirect"], "/login");
    }
}
