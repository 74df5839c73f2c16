//! IMAP response parser.
//!
//! A sans-I/O parser: the connection layer hands it complete response
//! lines (literals already inlined) and gets structured responses back.

pub mod lexer;
mod response;

pub use response::{FetchItem, Response, ResponseParser, UntaggedResponse};
