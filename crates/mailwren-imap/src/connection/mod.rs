//! IMAP connection management.
//!
//! This module provides connection handling for IMAP servers:
//! - TLS stream setup (implicit TLS only)
//! - Framed I/O for the IMAP protocol (CRLF lines + literals)
//! - Type-state client wrapper
//! - High-level session with lazy connect and explicit state machine

mod client;
mod framed;
mod session;
mod stream;

pub use client::{Authenticated, Client, NotAuthenticated, Selected};
pub use framed::{FramedStream, ResponseAccumulator};
pub use session::{Credentials, Session, SessionConfig, Transport};
pub use stream::{IMAP_TLS_PORT, ImapStream, connect_tls, create_tls_connector};
