//! Type-state IMAP client connection.
//!
//! Uses the type-state pattern to enforce valid state transitions at
//! compile time:
//!
//! - `NotAuthenticated`: initial state after the greeting
//! - `Authenticated`: after successful LOGIN/AUTHENTICATE
//! - `Selected`: after successful SELECT
//!
//! Each state only exposes the commands valid in that state.

#![allow(clippy::missing_errors_doc)]

mod authenticated;
mod not_authenticated;
mod selected;
mod states;

use tokio::io::{AsyncRead, AsyncWrite};

pub use self::states::{Authenticated, NotAuthenticated, Selected};
use super::framed::{FramedStream, ResponseAccumulator};
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Capability, ListResponse, Status};
use crate::{Error, Result};

/// IMAP client connection with type-state.
///
/// The `State` parameter tracks the connection state at compile time;
/// `Selected` additionally carries the selected mailbox at runtime.
pub struct Client<S, State> {
    pub(crate) stream: FramedStream<S>,
    pub(crate) tag_gen: TagGenerator,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) state: State,
}

impl<S, State: std::fmt::Debug> std::fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("capabilities", &self.capabilities)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Shared implementation for all states.
impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the server capabilities seen so far.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Returns true if the server advertises the given AUTH mechanism.
    #[must_use]
    pub fn supports_auth(&self, mechanism: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| matches!(c, Capability::Auth(m) if m.eq_ignore_ascii_case(mechanism)))
    }

    /// Returns true if LOGIN is disabled by the server.
    #[must_use]
    pub fn login_disabled(&self) -> bool {
        self.capabilities.contains(&Capability::LoginDisabled)
    }

    /// Gracefully disconnects from the server.
    ///
    /// The LOGOUT completion is read but its outcome is irrelevant; the
    /// connection is torn down either way.
    pub async fn logout(mut self) -> Result<()> {
        let tag = self.tag_gen.next();
        let cmd = Command::Logout.serialize(&tag);
        self.stream.write_command(&cmd).await?;

        let _ = self.read_until_tagged(&tag).await;
        Ok(())
    }

    /// Reads responses until the tagged completion for `tag`.
    pub(crate) async fn read_until_tagged(&mut self, tag: &str) -> Result<Vec<Vec<u8>>> {
        let mut accumulator = ResponseAccumulator::new(tag);
        accumulator.read_until_tagged(&mut self.stream).await
    }

    /// Checks that the tagged response for `tag` is OK.
    pub(crate) fn check_tagged_ok(responses: &[Vec<u8>], tag: &str) -> Result<()> {
        for response_bytes in responses.iter().rev() {
            if let Ok(Response::Tagged {
                tag: resp_tag,
                status,
                code: _,
                text,
            }) = ResponseParser::parse(response_bytes)
                && resp_tag.as_str() == tag
            {
                return match status {
                    Status::Ok | Status::PreAuth => Ok(()),
                    Status::No => Err(Error::No(text)),
                    Status::Bad => Err(Error::Bad(text)),
                    Status::Bye => Err(Error::Bye(text)),
                };
            }
        }

        Err(Error::Protocol("missing tagged response".to_string()))
    }

    /// Issues LIST and collects the parsed entries.
    ///
    /// Entries whose line fails to parse are skipped; only the command's
    /// own failure is an error. Exposed through the authenticated and
    /// selected states.
    pub(crate) async fn list_mailboxes(
        &mut self,
        reference: &str,
        pattern: &str,
    ) -> Result<Vec<ListResponse>> {
        let tag = self.tag_gen.next();
        let cmd = Command::List {
            reference: reference.to_string(),
            pattern: pattern.to_string(),
        }
        .serialize(&tag);

        self.stream.write_command(&cmd).await?;

        let responses = self.read_until_tagged(&tag).await?;
        let mut entries = Vec::new();

        for response_bytes in &responses {
            match ResponseParser::parse(response_bytes) {
                Ok(Response::Untagged(UntaggedResponse::List(item))) => entries.push(item),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unparseable LIST line");
                }
            }
        }

        Self::check_tagged_ok(&responses, &tag)?;
        Ok(entries)
    }
}
