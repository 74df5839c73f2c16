//! # mailwren-oauth
//!
//! `OAuth2` token handling for email protocols (IMAP/SMTP).
//!
//! This crate deliberately does **not** acquire or refresh tokens; that is
//! the job of an external authorization component. It consumes an
//! already-obtained access token and provides:
//!
//! - **Token bundles**: access token plus optional expiry, with expiry and
//!   near-expiry checks
//! - **SASL mechanisms**: the XOAUTH2 initial-response payload
//!   (Google/Microsoft proprietary) and parsing of the JSON error challenge
//!   servers return on a failed exchange
//! - **Token introspection**: a best-effort pre-authentication check against
//!   a tokeninfo endpoint, reporting scope, expiry, and token-owner email
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailwren_oauth::TokenBundle;
//!
//! let bundle = TokenBundle::new("ya29.a0...");
//! let payload = bundle.xoauth2_payload("user@gmail.com")?;
//! // payload is the raw SASL initial response; the transport base64-encodes
//! // it when serializing AUTHENTICATE XOAUTH2.
//! ```
//!
//! ## Introspection preflight
//!
//! ```ignore
//! use mailwren_oauth::{Introspector, Preflight};
//!
//! let introspector = Introspector::google()?;
//! match introspector.check(&bundle.access_token).await {
//!     Preflight::Valid(info) => println!("scopes: {:?}", info.scopes),
//!     Preflight::Invalid(reason) => eprintln!("token unusable: {reason}"),
//!     Preflight::Unreachable => { /* network trouble; proceed anyway */ }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod introspect;
pub mod sasl;
pub mod token;

pub use error::{Error, Result};
pub use introspect::{Introspector, Preflight, TokenInfo};
pub use token::TokenBundle;
