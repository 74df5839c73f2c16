//! # mailwren-core
//!
//! Core mail operations for the mailwren email client.
//!
//! This crate ties the protocol crates together into the operations the
//! client shell calls:
//!
//! - Domain models: [`Account`], [`Folder`], [`Message`]
//! - [`MailSession`]: one lazily-connected IMAP session per account, with
//!   folder listing, batch header fetch (and per-message fallback), body
//!   fetch, flag mutation, and the copy/flag/expunge move
//! - [`AccountProvider`]: the consumed lookup interface for account
//!   identities and credentials; storage and token acquisition live in
//!   other components
//! - [`MailError`]: the connection/authentication/operation error
//!   taxonomy every public operation reports through

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
mod error;
pub mod service;

pub use account::{Account, AccountId, AccountProvider};
pub use error::{MailError, Result};
pub use service::{Folder, MailSession, Message};
