//! Token payload decoding
//!
//! The upstream API signs its tokens; the portal never holds the key. The
//! payload is read only to greet the user and pick the navigation, so the
//! signature and expiry are not checked here.

use crate::auth::{DisplayUser, Role};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

/// Claims the upstream API is known to put in its tokens
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TokenPayload {
    pub sub: Option<serde_json::Value>,
    pub nama: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl TokenPayload {
    fn display_name(&self) -> Option<String> {
        [&self.nama, &self.name, &self.username]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| match &self.sub {
                Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(serde_json::Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
    }
}

/// Read the payload without verifying the signature
pub fn decode_payload(token: &str) -> Option<TokenPayload> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<TokenPayload>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!("Token payload could not be decoded: {}", e);
            None
        }
    }
}

/// Display-only user for the top navigation
pub fn decode_display_user(token: &str) -> DisplayUser {
    let payload = decode_payload(token).unwrap_or_default();

    DisplayUser {
        name: payload.display_name().unwrap_or_else(|| "Admin".to_string()),
        role: payload
            .role
            .as_deref()
            .map(Role::from_claim)
            .unwrap_or_default(),
    }
}
