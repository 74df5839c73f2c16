//! # mailwren-mime
//!
//! MIME message parsing for email.
//!
//! This crate only parses; composition belongs to the sending path, which
//! lives elsewhere. It covers what a mail client needs to render fetched
//! messages:
//!
//! - **Headers**: folding-aware parsing, RFC 2047 encoded-word decoding
//!   (multi-word, degrades to the raw string on any failure)
//! - **Addresses**: extracting addr-specs from `Name <addr>` forms and
//!   comma-separated lists
//! - **Content types**: `type/subtype; param=value` with boundary/charset
//! - **Bodies**: Base64 and Quoted-Printable transfer decoding, multipart
//!   splitting with nested multiparts, attachment detection, and
//!   first-wins extraction of the plain-text and HTML alternatives
//!
//! ## Parsing a fetched message
//!
//! ```ignore
//! use mailwren_mime::Message;
//!
//! let message = Message::parse(raw_rfc822_bytes)?;
//! let (plain, html) = message.extract_bodies();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod address;
mod content_type;
pub mod encoding;
mod error;
mod header;
mod message;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Message, Part, TransferEncoding};
