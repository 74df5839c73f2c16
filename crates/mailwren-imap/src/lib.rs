//! # mailwren-imap
//!
//! An async IMAP4 client (RFC 3501/9051) built for a desktop mail client's
//! needs: folder listing, UID-addressed header and body fetches, flag
//! mutation, and the copy/flag/expunge move idiom, over implicit TLS.
//!
//! ## Features
//!
//! - **Type-state connection management**: compile-time enforcement of
//!   valid IMAP state transitions (`NotAuthenticated` → `Authenticated` →
//!   `Selected`)
//! - **Lazy-connect session**: [`Session`] dials and authenticates on
//!   first use behind an explicit state machine, with no internal retry
//! - **XOAUTH2**: SASL bearer-token authentication with error-challenge
//!   diagnostics, plus plain LOGIN
//! - **TLS via rustls**: secure connections without an OpenSSL dependency
//! - **Sans-I/O parser**: protocol parsing separated from network I/O,
//!   with literal-aware framing
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailwren_imap::{Mailbox, Session, SessionConfig};
//! use mailwren_oauth::TokenBundle;
//!
//! #[tokio::main]
//! async fn main() -> mailwren_imap::Result<()> {
//!     let config = SessionConfig::new("imap.gmail.com", "user@gmail.com")
//!         .token(TokenBundle::new("ya29.a0..."));
//!     let mut session = Session::new(config);
//!
//!     // Connects and authenticates on first use
//!     let folders = session.list_folders().await?;
//!     for folder in &folders {
//!         println!("Folder: {}", folder.mailbox.as_str());
//!     }
//!
//!     session.select(&Mailbox::inbox()).await?;
//!     session.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: IMAP command builders and serialization
//! - [`connection`]: streams, framing, type-state client, session
//! - [`parser`]: sans-I/O response parser
//! - [`types`]: core IMAP types (flags, mailboxes, UIDs, sequences)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{Command, FetchAttribute, SearchCriteria, StoreAction, TagGenerator};
pub use connection::{
    Authenticated, Client, Credentials, FramedStream, ImapStream, NotAuthenticated,
    ResponseAccumulator, Selected, Session, SessionConfig, Transport,
};
pub use error::{Error, Result};
pub use parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
pub use types::{
    Capability, Flag, Flags, ListResponse, Mailbox, MailboxAttribute, MailboxStatus, SeqNum,
    SequenceSet, Status, Tag, Uid, UidSet, UidValidity,
};
