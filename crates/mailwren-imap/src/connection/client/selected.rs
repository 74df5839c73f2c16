//! Implementation for the selected state.

use tokio::io::{AsyncRead, AsyncWrite};

use super::Client;
use super::authenticated::parse_mailbox_status;
use super::states::Selected;
use crate::command::{Command, FetchAttribute, SearchCriteria, StoreAction};
use crate::parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
use crate::Result;
use crate::types::{Mailbox, MailboxStatus, SeqNum, Uid, UidSet};

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the currently selected mailbox name.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        self.state.mailbox()
    }

    /// Selects a different mailbox directly (SELECT is valid while
    /// selected; the previous mailbox is implicitly deselected).
    pub async fn select(mut self, mailbox: &Mailbox) -> Result<(Self, MailboxStatus)> {
        let tag = self.tag_gen.next();
        let cmd = Command::Select {
            mailbox: mailbox.clone(),
        }
        .serialize(&tag);

        self.stream.write_command(&cmd).await?;

        let responses = self.read_until_tagged(&tag).await?;
        let status = parse_mailbox_status(&responses);
        Self::check_tagged_ok(&responses, &tag)?;

        self.state = Selected::new(mailbox.as_str(), status.clone());
        Ok((self, status))
    }

    /// Lists mailboxes matching a pattern.
    pub async fn list(
        &mut self,
        reference: &str,
        pattern: &str,
    ) -> Result<Vec<crate::types::ListResponse>> {
        self.list_mailboxes(reference, pattern).await
    }

    /// Runs UID SEARCH and returns the matching UIDs in server order
    /// (ascending by default).
    pub async fn uid_search(&mut self, criteria: SearchCriteria) -> Result<Vec<Uid>> {
        let tag = self.tag_gen.next();
        let cmd = Command::Search {
            criteria,
            uid: true,
        }
        .serialize(&tag);

        self.stream.write_command(&cmd).await?;

        let responses = self.read_until_tagged(&tag).await?;
        let mut uids = Vec::new();

        for response_bytes in &responses {
            if let Ok(Response::Untagged(UntaggedResponse::Search(nums))) =
                ResponseParser::parse(response_bytes)
            {
                uids.extend(nums.into_iter().filter_map(Uid::new));
            }
        }

        Self::check_tagged_ok(&responses, &tag)?;
        Ok(uids)
    }

    /// Runs UID FETCH for the given UID set.
    ///
    /// Returns one entry per parseable FETCH line; lines that fail to
    /// parse are skipped, so callers can detect a malformed combined
    /// response by comparing counts.
    pub async fn uid_fetch(
        &mut self,
        uid_set: &UidSet,
        items: Vec<FetchAttribute>,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        let tag = self.tag_gen.next();
        let cmd = Command::Fetch {
            set: uid_set.as_sequence_set(),
            items,
            uid: true,
        }
        .serialize(&tag);

        self.stream.write_command(&cmd).await?;

        let responses = self.read_until_tagged(&tag).await?;
        let mut results = Vec::new();

        for response_bytes in &responses {
            match ResponseParser::parse(response_bytes) {
                Ok(Response::Untagged(UntaggedResponse::Fetch { seq, items })) => {
                    results.push((seq, items));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unparseable FETCH line");
                }
            }
        }

        Self::check_tagged_ok(&responses, &tag)?;
        Ok(results)
    }

    /// Runs UID STORE with the given flag action.
    ///
    /// The untagged FETCH echoes are read and dropped; only the tagged
    /// completion matters here.
    pub async fn uid_store(&mut self, uid_set: &UidSet, action: StoreAction) -> Result<()> {
        let tag = self.tag_gen.next();
        let cmd = Command::Store {
            set: uid_set.as_sequence_set(),
            action,
            uid: true,
            silent: false,
        }
        .serialize(&tag);

        self.stream.write_command(&cmd).await?;

        let responses = self.read_until_tagged(&tag).await?;
        Self::check_tagged_ok(&responses, &tag)?;
        Ok(())
    }

    /// Copies messages to another mailbox by UID.
    pub async fn uid_copy(&mut self, uid_set: &UidSet, mailbox: &Mailbox) -> Result<()> {
        let tag = self.tag_gen.next();
        let cmd = Command::Copy {
            set: uid_set.as_sequence_set(),
            mailbox: mailbox.clone(),
            uid: true,
        }
        .serialize(&tag);

        self.stream.write_command(&cmd).await?;

        let responses = self.read_until_tagged(&tag).await?;
        Self::check_tagged_ok(&responses, &tag)?;
        Ok(())
    }

    /// Permanently removes messages marked `\Deleted`.
    ///
    /// Returns the sequence numbers of expunged messages.
    pub async fn expunge(&mut self) -> Result<Vec<SeqNum>> {
        let tag = self.tag_gen.next();
        let cmd = Command::Expunge.serialize(&tag);
        self.stream.write_command(&cmd).await?;

        let responses = self.read_until_tagged(&tag).await?;
        let mut expunged = Vec::new();

        for response_bytes in &responses {
            if let Ok(Response::Untagged(UntaggedResponse::Expunge(seq))) =
                ResponseParser::parse(response_bytes)
            {
                expunged.push(seq);
            }
        }

        Self::check_tagged_ok(&responses, &tag)?;
        Ok(expunged)
    }
}
