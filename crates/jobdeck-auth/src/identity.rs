//! Client for the external credential-validation service.
//!
//! The service takes a URL-encoded `json` form field carrying
//! `{date, pword, login}` and answers with a JSON object: `{errorCode, ...}`
//! on failure, `{projects: {projectID: ...}}` on success. Some deployments
//! answer in a legacy single-byte encoding, so the body is decoded as UTF-8
//! first, then Windows-1250, then Windows-1252, before being declared
//! undecodable.

use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use encoding_rs::{WINDOWS_1250, WINDOWS_1252};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Payload of one credential-validation call.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityRequest {
    /// UTC request time, "YYYYMMDDHHmmss".
    pub date: String,
    pub pword: String,
    pub login: String,
}

impl IdentityRequest {
    pub fn new(username: &str, password: &str, now: DateTime<Utc>) -> Self {
        Self {
            date: format_identity_date(now),
            pword: password.to_string(),
            login: username.to_string(),
        }
    }
}

/// Seconds-precision UTC date in the identity service's fixed format.
pub fn format_identity_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Transport seam for the credential-validation call.
///
/// Returns the raw response body; interpretation (encoding fallback, error
/// codes, project extraction) is the gate's job. Tests inject scripted
/// implementations.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn validate(&self, request: &IdentityRequest) -> AuthResult<Vec<u8>>;
}

/// Production implementation: one synchronous round trip per login attempt.
pub struct HttpIdentityService {
    url: String,
    client: reqwest::Client,
}

impl HttpIdentityService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::IdentityServiceUnavailable(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn validate(&self, request: &IdentityRequest) -> AuthResult<Vec<u8>> {
        let json = serde_json::to_string(request)
            .map_err(|e| AuthError::IdentityServiceUnavailable(e.to_string()))?;
        let response = self
            .client
            .post(&self.url)
            .form(&[("json", json.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::IdentityServiceUnavailable(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::IdentityServiceUnavailable(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Decode an identity response body into JSON, retrying the two legacy
/// encodings in their fixed fallback order. `None` means undecodable.
pub fn decode_identity_body(body: &[u8]) -> Option<Value> {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        return Some(value);
    }
    for encoding in [WINDOWS_1250, WINDOWS_1252] {
        let (text, _, _) = encoding.decode(body);
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            log::debug!("identity response decoded via {}", encoding.name());
            return Some(value);
        }
    }
    None
}
