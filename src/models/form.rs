use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// Raw user input that must pass field rules before it becomes a request body
pub trait Form {
    type Payload: Serialize + Send + Sync;

    fn validate(&self) -> ClientResult<Self::Payload>;
}

/// Trimmed, non-empty text or a field error
pub(crate) fn required_text(field: &str, value: &str) -> ClientResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::field(field, "This field is required"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn required_id(field: &str, value: &str) -> ClientResult<i64> {
    let text = required_text(field, value)?;
    text.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ClientError::field(field, format!("'{}' is not a valid id", text)))
}
