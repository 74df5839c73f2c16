//! SASL helpers for `OAuth2` authentication.
//!
//! The raw XOAUTH2 initial response is built by
//! [`TokenBundle::xoauth2_payload`](crate::TokenBundle::xoauth2_payload);
//! this module handles the base64 wire framing and the JSON error challenge
//! servers send back when the exchange fails.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Base64-encodes a raw SASL initial response for the wire.
///
/// IMAP `AUTHENTICATE` carries the initial response base64-encoded on the
/// command line; the payload itself stays raw until this point.
#[must_use]
pub fn encode_initial_response(payload: &[u8]) -> String {
    STANDARD.encode(payload)
}

/// `OAuth2` error challenge from the server.
///
/// On a failed XOAUTH2/OAUTHBEARER exchange, Google-style servers send a
/// continuation whose base64 body is JSON:
/// `{"status":"400","schemes":"bearer","scope":"https://mail.google.com/"}`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ErrorChallenge {
    /// HTTP-style status code, e.g. "400" or "401".
    pub status: String,
    /// Authentication schemes the server accepts.
    #[serde(default)]
    pub schemes: Option<String>,
    /// `OAuth2` scope the server demanded.
    #[serde(default)]
    pub scope: Option<String>,
}

impl ErrorChallenge {
    /// Renders the challenge for inclusion in an authentication error.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "status={}, scope={}, schemes={}",
            self.status,
            self.scope.as_deref().unwrap_or("<none>"),
            self.schemes.as_deref().unwrap_or("<none>"),
        )
    }
}

/// Decodes and parses a base64 SASL error challenge.
///
/// Returns `None` when the text is not base64 or not the JSON error shape;
/// in that case the continuation is an ordinary SASL prompt, not an error.
#[must_use]
pub fn parse_error_challenge(challenge_text: &str) -> Option<ErrorChallenge> {
    let decoded = STANDARD.decode(challenge_text.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    serde_json::from_str(&text).ok()
}
