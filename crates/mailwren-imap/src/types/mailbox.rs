//! Mailbox types.

use super::{Flags, SeqNum, Uid, UidValidity};

/// Mailbox name, stored as the server reported it.
///
/// The stored path is unquoted; [`Mailbox::to_wire`] applies the quoting
/// the server requires when the name travels back over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox(pub String);

impl Mailbox {
    /// Creates a new mailbox name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The INBOX mailbox (case-insensitive per RFC).
    #[must_use]
    pub fn inbox() -> Self {
        Self("INBOX".to_string())
    }

    /// Returns the mailbox name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the mailbox name for the wire, quoting when required.
    ///
    /// Hierarchical and bracketed names (`[Gmail]/All Mail`, `Sent Mail`)
    /// are invalid unquoted. Rules:
    ///
    /// - an already-quoted name passes through unchanged (idempotent)
    /// - names containing a space, bracket, or `/` are wrapped in double
    ///   quotes with embedded `"` and `\` escaped
    /// - bare atoms like `INBOX` pass through unquoted
    #[must_use]
    pub fn to_wire(&self) -> String {
        let name = &self.0;
        if name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
            return name.clone();
        }

        let needs_quoting = name.is_empty()
            || name
                .chars()
                .any(|c| matches!(c, ' ' | '[' | ']' | '/' | '"' | '\\'));
        if !needs_quoting {
            return name.clone();
        }

        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push('"');
        for c in name.chars() {
            if c == '"' || c == '\\' {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        quoted.push('"');
        quoted
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mailbox status information from SELECT.
#[derive(Debug, Clone, Default)]
pub struct MailboxStatus {
    /// Number of messages in the mailbox.
    pub exists: u32,
    /// Number of recent messages.
    pub recent: u32,
    /// First unseen message sequence number.
    pub unseen: Option<SeqNum>,
    /// Next UID to be assigned.
    pub uid_next: Option<Uid>,
    /// UIDVALIDITY value.
    pub uid_validity: Option<UidValidity>,
    /// Flags defined for this mailbox.
    pub flags: Flags,
    /// Whether mailbox is read-only.
    pub read_only: bool,
}

/// LIST response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    /// Mailbox attributes.
    pub attributes: Vec<MailboxAttribute>,
    /// Hierarchy delimiter.
    pub delimiter: Option<char>,
    /// Mailbox name.
    pub mailbox: Mailbox,
}

/// Mailbox attributes from LIST response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MailboxAttribute {
    /// Mailbox cannot be selected.
    NoSelect,
    /// Mailbox has no children.
    HasNoChildren,
    /// Mailbox has children.
    HasChildren,
    /// Mailbox is marked for attention.
    Marked,
    /// Mailbox is not marked.
    Unmarked,
    // SPECIAL-USE mailbox attributes (RFC 6154)
    /// All messages (virtual mailbox).
    All,
    /// Mailbox is the archive folder.
    Archive,
    /// Mailbox is the drafts folder.
    Drafts,
    /// Flagged/starred messages (virtual mailbox).
    Flagged,
    /// Mailbox is the junk/spam folder.
    Junk,
    /// Mailbox is the sent folder.
    Sent,
    /// Mailbox is the trash folder.
    Trash,
    /// Mailbox is subscribed.
    Subscribed,
    /// Unknown attribute.
    Unknown(String),
}

impl MailboxAttribute {
    /// Parses a mailbox attribute string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "\\NOSELECT" => Self::NoSelect,
            "\\HASNOCHILDREN" => Self::HasNoChildren,
            "\\HASCHILDREN" => Self::HasChildren,
            "\\MARKED" => Self::Marked,
            "\\UNMARKED" => Self::Unmarked,
            // RFC 6154 SPECIAL-USE
            "\\ALL" => Self::All,
            "\\ARCHIVE" => Self::Archive,
            "\\DRAFTS" => Self::Drafts,
            "\\FLAGGED" => Self::Flagged,
            "\\JUNK" | "\\SPAM" => Self::Junk,
            "\\SENT" => Self::Sent,
            "\\TRASH" => Self::Trash,
            "\\SUBSCRIBED" => Self::Subscribed,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_atom_not_quoted() {
        assert_eq!(Mailbox::new("INBOX").to_wire(), "INBOX");
        assert_eq!(Mailbox::new("Archive").to_wire(), "Archive");
    }

    #[test]
    fn test_space_quoted() {
        assert_eq!(Mailbox::new("Sent Mail").to_wire(), "\"Sent Mail\"");
    }

    #[test]
    fn test_bracket_path_quoted() {
        assert_eq!(
            Mailbox::new("[Gmail]/All Mail").to_wire(),
            "\"[Gmail]/All Mail\""
        );
    }

    #[test]
    fn test_slash_quoted() {
        assert_eq!(Mailbox::new("Work/2024").to_wire(), "\"Work/2024\"");
    }

    #[test]
    fn test_already_quoted_passes_through() {
        let once = Mailbox::new("[Gmail]/All Mail").to_wire();
        let twice = Mailbox::new(once.clone()).to_wire();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_embedded_quote_escaped() {
        assert_eq!(
            Mailbox::new("odd \"name\"").to_wire(),
            "\"odd \\\"name\\\"\""
        );
    }

    #[test]
    fn test_empty_name_quoted() {
        assert_eq!(Mailbox::new("").to_wire(), "\"\"");
    }

    #[test]
    fn test_attribute_parse() {
        assert_eq!(
            MailboxAttribute::parse("\\NoSelect"),
            MailboxAttribute::NoSelect
        );
        assert_eq!(
            MailboxAttribute::parse("\\HasChildren"),
            MailboxAttribute::HasChildren
        );
        assert_eq!(MailboxAttribute::parse("\\Trash"), MailboxAttribute::Trash);
        assert_eq!(MailboxAttribute::parse("\\Spam"), MailboxAttribute::Junk);
        assert_eq!(
            MailboxAttribute::parse("\\Custom"),
            MailboxAttribute::Unknown("\\Custom".to_string())
        );
    }
}
