//! Account model types.

use serde::{Deserialize, Serialize};

/// Unique identifier for a persisted account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Create a new account ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Email account identity.
///
/// This is identity only; credentials are supplied separately by the
/// account/token provider, and server settings beyond the IMAP host are
/// out of this crate's scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier (None for not-yet-persisted accounts).
    pub id: Option<AccountId>,
    /// Email address, byte-exact as issued to any OAuth token.
    pub email: String,
    /// IMAP server hostname.
    pub imap_host: String,
}

impl Account {
    /// Creates an account identity.
    #[must_use]
    pub fn new(email: impl Into<String>, imap_host: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            imap_host: imap_host.into(),
        }
    }

    /// Sets the persisted identifier.
    #[must_use]
    pub const fn with_id(mut self, id: AccountId) -> Self {
        self.id = Some(id);
        self
    }

    /// The email address with surrounding whitespace stripped.
    ///
    /// Hidden whitespace in a stored address makes SASL exchanges fail
    /// with confusing server errors; everything that puts the address on
    /// the wire goes through here.
    #[must_use]
    pub fn normalized_email(&self) -> &str {
        self.email.trim()
    }

    /// The record id as a plain integer, 0 for unsaved accounts.
    #[must_use]
    pub fn record_id(&self) -> i64 {
        self.id.map_or(0, |id| id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_email_strips_whitespace() {
        let account = Account::new(" user@example.com \n", "imap.example.com");
        assert_eq!(account.normalized_email(), "user@example.com");
    }

    #[test]
    fn test_record_id_defaults_to_zero() {
        let account = Account::new("a@b.com", "imap.b.com");
        assert_eq!(account.record_id(), 0);

        let saved = account.with_id(AccountId::new(7));
        assert_eq!(saved.record_id(), 7);
    }
}
