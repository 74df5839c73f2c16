//! Command-related type definitions.

use crate::types::Flag;

/// Individual FETCH attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// Message flags.
    Flags,
    /// UID.
    Uid,
    /// RFC822.HEADER (full header block).
    Rfc822Header,
    /// RFC822 (full message).
    Rfc822,
}

impl FetchAttribute {
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::Flags => "FLAGS",
            Self::Uid => "UID",
            Self::Rfc822Header => "RFC822.HEADER",
            Self::Rfc822 => "RFC822",
        }
    }
}

/// STORE action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// Replace flags.
    SetFlags(Vec<Flag>),
    /// Add flags.
    AddFlags(Vec<Flag>),
    /// Remove flags.
    RemoveFlags(Vec<Flag>),
}

/// SEARCH criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// All messages.
    All,
    /// Messages without the `\Seen` flag.
    Unseen,
    /// Messages with the `\Deleted` flag.
    Deleted,
}
