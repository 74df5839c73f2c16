//! Account and credential lookup interface.
//!
//! The core never fetches, persists, or refreshes accounts or tokens;
//! it consumes them through this interface. The storage component (and
//! the standalone diagnostic tools) implement it.

use mailwren_imap::Credentials;

use super::model::{Account, AccountId};

/// Provides account identities and credentials by id.
pub trait AccountProvider {
    /// Looks up an account's identity.
    fn account(&self, id: AccountId) -> Option<Account>;

    /// Looks up the credentials for an account: a token bundle for OAuth
    /// accounts, a password otherwise.
    fn credentials(&self, id: AccountId) -> Option<Credentials>;
}
