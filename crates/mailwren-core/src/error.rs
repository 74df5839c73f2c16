//! Error taxonomy for mail operations.

use mailwren_imap::Error as ImapError;

/// Result type alias for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// Errors surfaced to callers of the mail service.
///
/// Three kinds, layered by cause. Malformed individual folder-list entries
/// and per-message fetch responses never show up here; they are skipped
/// from batch results; only a command's own failure escalates.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Socket/TLS-level failure to reach or maintain the link. Not
    /// retried internally; retry policy belongs to the caller.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Credentials rejected, missing, expired, or insufficiently scoped.
    /// Carries the server's challenge diagnostics when available.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A specific command returned a non-success status; the message
    /// names the failing command's folder/UID context.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl MailError {
    /// Classifies a wire-level error into the caller-facing taxonomy,
    /// attaching the operation context to command failures.
    pub(crate) fn classify(context: &str, e: ImapError) -> Self {
        match e {
            ImapError::Io(_) | ImapError::Tls(_) | ImapError::InvalidDnsName(_) => {
                Self::Connection(e.to_string())
            }
            // A BYE mid-command means the server hung up on us.
            ImapError::Bye(_) => Self::Connection(e.to_string()),
            ImapError::Auth(msg) => Self::Authentication(msg),
            other => Self::Operation(format!("{context}: {other}")),
        }
    }
}
