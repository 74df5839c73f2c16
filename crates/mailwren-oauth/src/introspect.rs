//! Token introspection preflight.
//!
//! Before an IMAP XOAUTH2 exchange, a caller can ask the issuer's tokeninfo
//! endpoint whether the token still carries the scope the mail server will
//! demand. The check is advisory: its own failure (network trouble, endpoint
//! down) must never block authentication, but an explicit negative answer
//! must.
//!
//! That three-way distinction is the whole point of [`Preflight`]; do not
//! collapse it into a boolean.

use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Google's tokeninfo endpoint.
pub const GOOGLE_TOKENINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v1/tokeninfo";

/// The scope Gmail's IMAP endpoint requires.
pub const GMAIL_IMAP_SCOPE: &str = "https://mail.google.com/";

/// Timeout for the advisory check. Kept in single-digit seconds so a dead
/// endpoint cannot stall the authentication path.
const INTROSPECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a token introspection preflight.
#[derive(Debug, Clone)]
pub enum Preflight {
    /// The endpoint confirmed the token is usable.
    Valid(TokenInfo),
    /// The endpoint explicitly rejected the token; authentication must not
    /// be attempted with it.
    Invalid(String),
    /// The endpoint could not be reached or gave an unusable answer;
    /// authentication proceeds anyway.
    Unreachable,
}

/// What the introspection endpoint reported about a token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// Email address the token was issued to, if reported.
    pub email: Option<String>,
    /// Scopes granted to the token.
    pub scopes: Vec<String>,
    /// Seconds until expiry, as reported by the endpoint.
    pub expires_in: i64,
}

/// Raw tokeninfo response shape.
#[derive(Debug, Deserialize)]
struct TokenInfoResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Client for a tokeninfo endpoint.
#[derive(Debug, Clone)]
pub struct Introspector {
    endpoint: String,
    required_scope: String,
    http: reqwest::Client,
}

impl Introspector {
    /// Creates an introspector for an arbitrary tokeninfo endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, required_scope: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(INTROSPECTION_TIMEOUT)
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            required_scope: required_scope.into(),
            http,
        })
    }

    /// Creates an introspector for Google's tokeninfo endpoint with the
    /// Gmail IMAP scope requirement.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn google() -> Result<Self> {
        Self::new(GOOGLE_TOKENINFO_ENDPOINT, GMAIL_IMAP_SCOPE)
    }

    /// Runs the preflight check for an access token.
    ///
    /// Network and decoding failures come back as
    /// [`Preflight::Unreachable`]; only an explicit negative answer from the
    /// endpoint produces [`Preflight::Invalid`].
    pub async fn check(&self, access_token: &str) -> Preflight {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("access_token", access_token)])
            .send()
            .await;

        let info: TokenInfoResponse = match response {
            Ok(resp) => match resp.json().await {
                Ok(info) => info,
                Err(e) => {
                    tracing::warn!(error = %e, "tokeninfo response not decodable");
                    return Preflight::Unreachable;
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not reach tokeninfo endpoint");
                return Preflight::Unreachable;
            }
        };

        if let Some(error) = info.error {
            let description = info.error_description.unwrap_or_default();
            return Preflight::Invalid(format!(
                "introspection rejected token: {error} {description}"
            ));
        }

        let scopes: Vec<String> = info
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(ToString::to_string)
            .collect();

        if !scopes.iter().any(|s| s == &self.required_scope) {
            return Preflight::Invalid(format!(
                "token is missing the required scope {}",
                self.required_scope
            ));
        }

        let expires_in = info.expires_in.unwrap_or(0);
        if expires_in <= 0 {
            return Preflight::Invalid(format!(
                "introspection reports the token expired (expires_in: {expires_in}s)"
            ));
        }

        Preflight::Valid(TokenInfo {
            email: info.email.map(|e| e.trim().to_string()),
            scopes,
            expires_in,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_introspector_construction() {
        assert!(Introspector::google().is_ok());
        assert!(Introspector::new("https://example.com/tokeninfo", "scope").is_ok());
    }

    #[test]
    fn test_response_shape_error() {
        let info: TokenInfoResponse =
            serde_json::from_str(r#"{"error":"invalid_token"}"#).unwrap();
        assert_eq!(info.error.as_deref(), Some("invalid_token"));
        assert!(info.email.is_none());
    }

    #[test]
    fn test_response_shape_valid() {
        let json = r#"{
            "email": "user@gmail.com",
            "scope": "https://mail.google.com/ openid email",
            "expires_in": 3487
        }"#;
        let info: TokenInfoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(info.email.as_deref(), Some("user@gmail.com"));
        assert_eq!(info.expires_in, Some(3487));
        assert!(info.scope.unwrap().contains(GMAIL_IMAP_SCOPE));
    }
}
