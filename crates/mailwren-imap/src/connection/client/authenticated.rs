//! Implementation for the authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::Client;
use super::states::{Authenticated, Selected};
use crate::Result;
use crate::command::Command;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Mailbox, MailboxStatus, ResponseCode};

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Selects a mailbox for read-write access.
    ///
    /// Consumes self and returns a selected client on success.
    pub async fn select(
        mut self,
        mailbox: &Mailbox,
    ) -> Result<(Client<S, Selected>, MailboxStatus)> {
        let tag = self.tag_gen.next();
        let cmd = Command::Select {
            mailbox: mailbox.clone(),
        }
        .serialize(&tag);

        self.stream.write_command(&cmd).await?;

        let responses = self.read_until_tagged(&tag).await?;
        let status = parse_mailbox_status(&responses);
        Self::check_tagged_ok(&responses, &tag)?;

        Ok((
            Client {
                stream: self.stream,
                tag_gen: self.tag_gen,
                capabilities: self.capabilities,
                state: Selected::new(mailbox.as_str(), status.clone()),
            },
            status,
        ))
    }

    /// Lists mailboxes matching a pattern.
    ///
    /// Unparseable LIST lines are skipped; partial results are returned.
    pub async fn list(
        &mut self,
        reference: &str,
        pattern: &str,
    ) -> Result<Vec<crate::types::ListResponse>> {
        self.list_mailboxes(reference, pattern).await
    }
}

/// Extracts the mailbox status from SELECT responses.
pub(super) fn parse_mailbox_status(responses: &[Vec<u8>]) -> MailboxStatus {
    let mut status = MailboxStatus::default();

    for response_bytes in responses {
        match ResponseParser::parse(response_bytes) {
            Ok(Response::Untagged(untagged)) => match untagged {
                UntaggedResponse::Exists(n) => status.exists = n,
                UntaggedResponse::Recent(n) => status.recent = n,
                UntaggedResponse::Flags(flags) => status.flags = flags,
                UntaggedResponse::Ok {
                    code: Some(code), ..
                } => match code {
                    ResponseCode::UidValidity(v) => status.uid_validity = Some(v),
                    ResponseCode::UidNext(v) => status.uid_next = Some(v),
                    ResponseCode::Unseen(v) => status.unseen = Some(v),
                    _ => {}
                },
                _ => {}
            },
            Ok(Response::Tagged {
                code: Some(ResponseCode::ReadOnly),
                ..
            }) => status.read_only = true,
            _ => {}
        }
    }

    status
}
