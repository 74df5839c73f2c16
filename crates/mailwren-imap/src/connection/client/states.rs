//! Type-state markers for IMAP client connection states.
//!
//! These types are used with the type-state pattern to enforce valid IMAP
//! state transitions at compile time. `Selected` additionally carries the
//! selected mailbox's name and status snapshot at runtime.

use std::sync::Arc;

use crate::types::MailboxStatus;

/// Marker type for the not-authenticated state.
///
/// In this state, only authentication commands (LOGIN, AUTHENTICATE) are valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotAuthenticated;

/// Marker type for the authenticated state.
///
/// In this state, mailbox operations (SELECT, LIST) are valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

/// State for a selected mailbox.
///
/// Unlike the marker types, this carries runtime information about the
/// currently selected mailbox.
#[derive(Debug, Clone)]
pub struct Selected {
    /// The selected mailbox name.
    pub(crate) mailbox: Arc<str>,
    /// Cached mailbox status from the SELECT response.
    pub(crate) status: MailboxStatus,
}

impl Selected {
    /// Creates a new Selected state.
    #[must_use]
    pub fn new(mailbox: impl Into<Arc<str>>, status: MailboxStatus) -> Self {
        Self {
            mailbox: mailbox.into(),
            status,
        }
    }

    /// Returns the name of the selected mailbox.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        &self.mailbox
    }

    /// Returns the mailbox status snapshot from SELECT.
    #[must_use]
    pub const fn status(&self) -> &MailboxStatus {
        &self.status
    }
}
