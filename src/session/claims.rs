use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Claims read out of the access token for display. The signature is not
/// checked: the client holds no key, and the API stays the only authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TokenClaims {
    pub fn decode_unverified(token: &str) -> ClientResult<Self> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| ClientError::decode(format!("token is not a readable JWT: {}", e)))?;
        Ok(data.claims)
    }

    /// Subject rendered as text; identities may be numeric
    pub fn subject(&self) -> Option<String> {
        match self.sub.as_ref()? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|iat| DateTime::from_timestamp(iat, 0))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }
}
