//! `OAuth2` token bundle.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How close to expiry a token may be before a refresh warning is emitted.
pub const EXPIRY_WARNING_WINDOW_SECS: i64 = 300;

/// An already-obtained `OAuth2` access token with optional expiry.
///
/// Refreshing is the authorization component's job; this type only answers
/// "can this token still be presented to a server right now".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Access token string.
    pub access_token: String,
    /// Expiration time, if the issuer reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenBundle {
    /// Creates a bundle with no stored expiry.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// Sets the expiration time.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if the stored expiry has already passed.
    ///
    /// A bundle without a stored expiry is never considered expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() >= exp)
    }

    /// Returns true if the token expires within the given number of seconds.
    #[must_use]
    pub fn expires_within(&self, secs: i64) -> bool {
        self.expires_at
            .is_some_and(|exp| Utc::now() + Duration::seconds(secs) >= exp)
    }

    /// Checks the bundle is usable for authentication right now.
    ///
    /// Emits a `tracing` warning when the token is inside the refresh
    /// warning window or carries no expiry at all, so callers can refresh
    /// proactively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoToken`] for an empty access token and
    /// [`Error::TokenExpired`] when the stored expiry has passed. Both are
    /// raised before any network traffic happens.
    pub fn ensure_usable(&self) -> Result<()> {
        if self.access_token.is_empty() {
            return Err(Error::NoToken(
                "token bundle exists but the access token is empty".to_string(),
            ));
        }

        match self.expires_at {
            Some(exp) if Utc::now() >= exp => {
                let ago = (Utc::now() - exp).num_seconds();
                return Err(Error::TokenExpired(format!(
                    "access token expired {ago}s ago; obtain a new token and re-authenticate"
                )));
            }
            Some(exp) if self.expires_within(EXPIRY_WARNING_WINDOW_SECS) => {
                let remaining = (exp - Utc::now()).num_seconds();
                tracing::warn!(remaining_secs = remaining, "token near expiry");
            }
            Some(_) => {}
            None => {
                tracing::warn!("token bundle has no stored expiration time");
            }
        }

        Ok(())
    }

    /// Builds the raw XOAUTH2 SASL initial response.
    ///
    /// Format: `user=<email>\x01auth=Bearer <token>\x01\x01`, as raw bytes.
    /// The transport layer is responsible for any base64 framing the chosen
    /// authentication call requires.
    ///
    /// The email is stripped of surrounding whitespace first; hidden
    /// whitespace in the address makes servers reject the SASL string.
    ///
    /// # Errors
    ///
    /// Fails the [`Self::ensure_usable`] preconditions, or returns
    /// [`Error::MalformedPayload`] if the assembled payload does not split
    /// into exactly 4 fields on `\x01` (an embedded separator in the email
    /// or token would silently corrupt the exchange otherwise).
    pub fn xoauth2_payload(&self, email: &str) -> Result<Vec<u8>> {
        self.ensure_usable()?;

        let email = email.trim();
        let payload = format!("user={email}\x01auth=Bearer {}\x01\x01", self.access_token);
        let payload = payload.into_bytes();

        let segments = payload.split(|&b| b == 0x01).count();
        if segments != 4 {
            return Err(Error::MalformedPayload(format!(
                "expected 4 \\x01-separated segments, built {segments}"
            )));
        }

        Ok(payload)
    }
}
