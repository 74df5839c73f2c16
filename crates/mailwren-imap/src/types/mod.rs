//! Core IMAP types.
//!
//! The typed wire vocabulary used throughout the library: identifiers,
//! flags, mailbox names (with quoting), sequence/UID sets, capabilities,
//! and response codes.

#![allow(clippy::missing_const_for_fn)]

mod capability;
mod flags;
mod identifiers;
mod mailbox;
mod response_code;
mod sequence;

pub use capability::{Capability, Status};
pub use flags::{Flag, Flags};
pub use identifiers::{SeqNum, Tag, Uid, UidValidity};
pub use mailbox::{ListResponse, Mailbox, MailboxAttribute, MailboxStatus};
pub use response_code::ResponseCode;
pub use sequence::{SequenceSet, UidSet};
