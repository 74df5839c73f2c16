//! IMAP command builder.
//!
//! This module provides types and serialization for the commands the
//! client sends.

mod serialize;
mod tag_generator;
mod types;

use crate::types::{Mailbox, SequenceSet};

pub use tag_generator::TagGenerator;
pub use types::{FetchAttribute, SearchCriteria, StoreAction};

use serialize::{write_astring, write_fetch_attributes, write_search_criteria, write_store_action};

/// IMAP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Any State Commands
    /// LOGOUT command.
    Logout,

    // Not Authenticated State Commands
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// AUTHENTICATE command.
    Authenticate {
        /// Authentication mechanism.
        mechanism: String,
        /// Initial response (already base64-framed).
        initial_response: Option<String>,
    },

    // Authenticated State Commands
    /// SELECT command.
    Select {
        /// Mailbox to select.
        mailbox: Mailbox,
    },
    /// LIST command.
    List {
        /// Reference name.
        reference: String,
        /// Mailbox pattern.
        pattern: String,
    },

    // Selected State Commands
    /// EXPUNGE command.
    Expunge,
    /// SEARCH command.
    Search {
        /// Search criteria.
        criteria: SearchCriteria,
        /// Use UIDs.
        uid: bool,
    },
    /// FETCH command.
    Fetch {
        /// Sequence set (UID values when `uid` is set).
        set: SequenceSet,
        /// Items to fetch.
        items: Vec<FetchAttribute>,
        /// Use UIDs.
        uid: bool,
    },
    /// STORE command.
    Store {
        /// Sequence set (UID values when `uid` is set).
        set: SequenceSet,
        /// Store action.
        action: StoreAction,
        /// Use UIDs.
        uid: bool,
        /// Silent mode (no FETCH response).
        silent: bool,
    },
    /// COPY command.
    Copy {
        /// Sequence set (UID values when `uid` is set).
        set: SequenceSet,
        /// Target mailbox.
        mailbox: Mailbox,
        /// Use UIDs.
        uid: bool,
    },
}

impl Command {
    /// Serializes the command to bytes with the given tag.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');

        match self {
            Self::Logout => buf.extend_from_slice(b"LOGOUT"),

            Self::Login { username, password } => {
                buf.extend_from_slice(b"LOGIN ");
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }

            Self::Authenticate {
                mechanism,
                initial_response,
            } => {
                buf.extend_from_slice(b"AUTHENTICATE ");
                buf.extend_from_slice(mechanism.as_bytes());
                if let Some(resp) = initial_response {
                    buf.push(b' ');
                    buf.extend_from_slice(resp.as_bytes());
                }
            }

            Self::Select { mailbox } => {
                buf.extend_from_slice(b"SELECT ");
                buf.extend_from_slice(mailbox.to_wire().as_bytes());
            }

            Self::List { reference, pattern } => {
                buf.extend_from_slice(b"LIST ");
                write_astring(&mut buf, reference);
                buf.push(b' ');
                write_astring(&mut buf, pattern);
            }

            Self::Expunge => buf.extend_from_slice(b"EXPUNGE"),

            Self::Search { criteria, uid } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"SEARCH ");
                write_search_criteria(&mut buf, criteria);
            }

            Self::Fetch { set, items, uid } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"FETCH ");
                buf.extend_from_slice(set.to_string().as_bytes());
                buf.push(b' ');
                write_fetch_attributes(&mut buf, items);
            }

            Self::Store {
                set,
                action,
                uid,
                silent,
            } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"STORE ");
                buf.extend_from_slice(set.to_string().as_bytes());
                buf.push(b' ');
                write_store_action(&mut buf, action, *silent);
            }

            Self::Copy { set, mailbox, uid } => {
                if *uid {
                    buf.extend_from_slice(b"UID ");
                }
                buf.extend_from_slice(b"COPY ");
                buf.extend_from_slice(set.to_string().as_bytes());
                buf.push(b' ');
                buf.extend_from_slice(mailbox.to_wire().as_bytes());
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::types::{Flag, Uid, UidSet};

    use super::*;

    #[test]
    fn test_logout_command() {
        let cmd = Command::Logout;
        assert_eq!(cmd.serialize("A001"), b"A001 LOGOUT\r\n");
    }

    #[test]
    fn test_login_command() {
        let cmd = Command::Login {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(cmd.serialize("A001"), b"A001 LOGIN user pass\r\n");
    }

    #[test]
    fn test_login_quoted() {
        let cmd = Command::Login {
            username: "user@example.com".to_string(),
            password: "pass word".to_string(),
        };
        assert_eq!(
            cmd.serialize("A001"),
            b"A001 LOGIN user@example.com \"pass word\"\r\n"
        );
    }

    #[test]
    fn test_authenticate_with_initial_response() {
        let cmd = Command::Authenticate {
            mechanism: "XOAUTH2".to_string(),
            initial_response: Some("dXNlcj1h".to_string()),
        };
        assert_eq!(
            cmd.serialize("A001"),
            b"A001 AUTHENTICATE XOAUTH2 dXNlcj1h\r\n"
        );
    }

    #[test]
    fn test_select_command() {
        let cmd = Command::Select {
            mailbox: Mailbox::inbox(),
        };
        assert_eq!(cmd.serialize("A001"), b"A001 SELECT INBOX\r\n");
    }

    #[test]
    fn test_select_quoted_mailbox() {
        let cmd = Command::Select {
            mailbox: Mailbox::new("[Gmail]/All Mail"),
        };
        assert_eq!(
            cmd.serialize("A001"),
            b"A001 SELECT \"[Gmail]/All Mail\"\r\n"
        );
    }

    #[test]
    fn test_list_command() {
        let cmd = Command::List {
            reference: String::new(),
            pattern: "*".to_string(),
        };
        // * is a list-wildcard and gets quoted; both forms are valid
        assert_eq!(cmd.serialize("A001"), b"A001 LIST \"\" \"*\"\r\n");
    }

    #[test]
    fn test_uid_search_all() {
        let cmd = Command::Search {
            criteria: SearchCriteria::All,
            uid: true,
        };
        assert_eq!(cmd.serialize("A001"), b"A001 UID SEARCH ALL\r\n");
    }

    #[test]
    fn test_uid_search_criteria_keywords() {
        let unseen = Command::Search {
            criteria: SearchCriteria::Unseen,
            uid: true,
        };
        assert_eq!(unseen.serialize("A001"), b"A001 UID SEARCH UNSEEN\r\n");

        let deleted = Command::Search {
            criteria: SearchCriteria::Deleted,
            uid: true,
        };
        assert_eq!(deleted.serialize("A002"), b"A002 UID SEARCH DELETED\r\n");
    }

    #[test]
    fn test_uid_fetch_headers() {
        let uids: Vec<Uid> = [10, 11, 12].iter().map(|&n| Uid::new(n).unwrap()).collect();
        let cmd = Command::Fetch {
            set: UidSet::from_uids(&uids).unwrap().as_sequence_set(),
            items: vec![
                FetchAttribute::Uid,
                FetchAttribute::Flags,
                FetchAttribute::Rfc822Header,
            ],
            uid: true,
        };
        assert_eq!(
            cmd.serialize("A001"),
            b"A001 UID FETCH 10,11,12 (UID FLAGS RFC822.HEADER)\r\n"
        );
    }

    #[test]
    fn test_uid_fetch_body() {
        let cmd = Command::Fetch {
            set: SequenceSet::single(5).unwrap(),
            items: vec![FetchAttribute::Rfc822],
            uid: true,
        };
        assert_eq!(cmd.serialize("A001"), b"A001 UID FETCH 5 RFC822\r\n");
    }

    #[test]
    fn test_uid_store_seen() {
        let cmd = Command::Store {
            set: SequenceSet::single(7).unwrap(),
            action: StoreAction::AddFlags(vec![Flag::Seen]),
            uid: true,
            silent: false,
        };
        assert_eq!(
            cmd.serialize("A001"),
            b"A001 UID STORE 7 +FLAGS (\\Seen)\r\n"
        );
    }

    #[test]
    fn test_uid_copy_command() {
        let cmd = Command::Copy {
            set: SequenceSet::single(5).unwrap(),
            mailbox: Mailbox::new("Archive"),
            uid: true,
        };
        assert_eq!(cmd.serialize("A001"), b"A001 UID COPY 5 Archive\r\n");
    }

    #[test]
    fn test_expunge_command() {
        assert_eq!(Command::Expunge.serialize("A002"), b"A002 EXPUNGE\r\n");
    }
}
