//! Mail service: domain-level IMAP operations.
//!
//! [`MailSession`] wraps the protocol-level `Session` and speaks in
//! [`Folder`] and [`Message`] records. Records are built fresh on every
//! fetch; caching and identity reconciliation across fetches belong to
//! the storage collaborator.

use chrono::{DateTime, FixedOffset};

use mailwren_imap::connection::{ImapStream, Session, SessionConfig, Transport};
use mailwren_imap::parser::FetchItem;
use mailwren_imap::types::{Flags, Mailbox, Uid, UidSet};
use mailwren_imap::{Credentials, FetchAttribute, SearchCriteria, StoreAction};
use mailwren_mime::address::{parse_address, parse_address_list};
use mailwren_mime::{Headers, Message as MimeMessage};
use mailwren_oauth::Introspector;

use crate::account::Account;
use crate::error::{MailError, Result};

/// A mailbox folder on the server.
///
/// `server_path` is the canonical hierarchical path and is what gets
/// quoted onto the wire for every later operation; `name` is the display
/// segment after the last `/`.
#[derive(Debug, Clone)]
pub struct Folder {
    /// Owning account record id (0 for unsaved accounts).
    pub account_id: i64,
    /// Display name (last path segment).
    pub name: String,
    /// Full server-side hierarchical path.
    pub server_path: String,
    /// Whether this is a system folder (Inbox, Sent, Drafts, Trash).
    pub is_system: bool,
    /// Locally-assigned folder id, when persisted.
    pub id: Option<i64>,
    /// Unread count; populated by higher layers, 0 on creation.
    pub unread_count: u32,
}

impl Folder {
    /// The folder record id as a plain integer, 0 when unsaved.
    #[must_use]
    pub fn record_id(&self) -> i64 {
        self.id.unwrap_or(0)
    }

    /// The folder's wire-level mailbox name.
    #[must_use]
    pub fn mailbox(&self) -> Mailbox {
        Mailbox::new(self.server_path.clone())
    }
}

/// An email message summary.
///
/// `uid` is the server-assigned UID, stable per folder; always pair it
/// with the folder when addressing the message later.
#[derive(Debug, Clone)]
pub struct Message {
    /// Owning account record id.
    pub account_id: i64,
    /// Owning folder record id.
    pub folder_id: i64,
    /// Server-assigned UID within the folder.
    pub uid: u32,
    /// Sender address.
    pub sender: String,
    /// Recipient addresses, in header order.
    pub recipients: Vec<String>,
    /// Decoded subject.
    pub subject: String,
    /// Decoded preview text; empty when only headers were fetched.
    pub preview_text: String,
    /// Date the message was sent, from the Date header.
    pub sent_at: Option<DateTime<FixedOffset>>,
    /// Arrival time. IMAP header fetches do not report this separately,
    /// so it defaults to `sent_at`.
    pub received_at: Option<DateTime<FixedOffset>>,
    /// Whether the message carries `\Seen`.
    pub is_read: bool,
    /// Whether the headers indicate an attachment.
    pub has_attachments: bool,
    /// Raw protocol flags.
    pub flags: Flags,
}

/// A high-level mail session for one account.
///
/// Wraps exactly one connection; operations are sequential and lazily
/// connect on first use. Not safe for concurrent use without external
/// serialization; run one `MailSession` per concurrent task instead.
pub struct MailSession<S = ImapStream> {
    session: Session<S>,
    account: Account,
}

impl MailSession<ImapStream> {
    /// Creates a session for an account with the given credentials.
    ///
    /// Nothing is dialed until the first operation. Passing `None`
    /// credentials makes every operation fail with an authentication
    /// error, matching the no-method-provided contract.
    #[must_use]
    pub fn new(account: Account, credentials: Option<Credentials>) -> Self {
        let mut config = SessionConfig::new(&account.imap_host, account.normalized_email());
        config.credentials = credentials;
        Self {
            session: Session::new(config),
            account,
        }
    }

    /// Creates a session with the token-introspection preflight enabled
    /// for the OAuth path.
    #[must_use]
    pub fn with_introspector(
        account: Account,
        credentials: Option<Credentials>,
        introspector: Introspector,
    ) -> Self {
        let mut config = SessionConfig::new(&account.imap_host, account.normalized_email());
        config.credentials = credentials;
        config.introspector = Some(introspector);
        Self {
            session: Session::new(config),
            account,
        }
    }
}

impl<S: Transport> MailSession<S> {
    /// Wraps an existing protocol session (used by tests and by callers
    /// that manage their own transport).
    #[must_use]
    pub const fn from_session(account: Account, session: Session<S>) -> Self {
        Self { session, account }
    }

    /// Lists all folders on the server.
    ///
    /// Entries whose LIST line cannot be parsed are skipped; the
    /// operation only fails when the LIST command itself does.
    ///
    /// # Errors
    ///
    /// Connection, authentication, or LIST command failure.
    pub async fn list_folders(&mut self) -> Result<Vec<Folder>> {
        let entries = self
            .session
            .list_folders()
            .await
            .map_err(|e| MailError::classify("list folders", e))?;

        let account_id = self.account.record_id();
        Ok(entries
            .iter()
            .map(|entry| folder_from_path(account_id, entry.mailbox.as_str()))
            .collect())
    }

    /// Fetches the most recent `limit` message headers from a folder,
    /// newest first.
    ///
    /// One combined UID FETCH covers the whole batch; if that call fails
    /// or its combined response cannot be used, the session falls back to
    /// one fetch per UID. Messages that fail to parse are skipped either
    /// way.
    ///
    /// # Errors
    ///
    /// Select/search failures and connection/authentication errors.
    pub async fn fetch_headers(&mut self, folder: &Folder, limit: usize) -> Result<Vec<Message>> {
        self.select(folder).await?;

        let uids = self
            .session
            .uid_search(SearchCriteria::All)
            .await
            .map_err(|e| {
                MailError::classify(&format!("search folder '{}'", folder.server_path), e)
            })?;

        if uids.is_empty() {
            return Ok(Vec::new());
        }

        let recent = take_recent(&uids, limit);
        let mut messages = match UidSet::from_uids(recent) {
            Some(set) => match self.session.uid_fetch(&set, header_items()).await {
                Ok(responses) => {
                    let parsed: Vec<Message> = responses
                        .iter()
                        .filter_map(|(_, items)| self.message_from_items(folder, items))
                        .collect();

                    if parsed.is_empty() {
                        // Non-empty UID set but nothing usable: the
                        // combined response was malformed.
                        tracing::warn!(
                            folder = %folder.server_path,
                            "batch header fetch unusable; falling back to per-message fetch"
                        );
                        self.fetch_headers_individually(folder, recent).await
                    } else {
                        parsed
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        folder = %folder.server_path,
                        error = %e,
                        "batch header fetch failed; falling back to per-message fetch"
                    );
                    self.fetch_headers_individually(folder, recent).await
                }
            },
            None => Vec::new(),
        };

        messages.reverse();
        Ok(messages)
    }

    /// Fetches the body of a message as `(plain_text, html)`.
    ///
    /// Either or both sides may be absent; an individual MIME part that
    /// fails to decode is left unset rather than failing the operation.
    ///
    /// # Errors
    ///
    /// Select/fetch failures, or a response with no message data.
    pub async fn fetch_body(
        &mut self,
        folder: &Folder,
        uid: u32,
    ) -> Result<(Option<String>, Option<String>)> {
        self.select(folder).await?;

        let uid = parse_uid(uid)?;
        let set = UidSet::single(uid);
        let responses = self
            .session
            .uid_fetch(&set, vec![FetchAttribute::Uid, FetchAttribute::Rfc822])
            .await
            .map_err(|e| {
                MailError::classify(
                    &format!("fetch message {uid} from '{}'", folder.server_path),
                    e,
                )
            })?;

        let raw = responses
            .iter()
            .flat_map(|(_, items)| items)
            .find_map(FetchItem::message_bytes)
            .ok_or_else(|| {
                MailError::Operation(format!(
                    "fetch message {uid} from '{}': no message data in response",
                    folder.server_path
                ))
            })?;

        Ok(MimeMessage::parse(raw).extract_bodies())
    }

    /// Marks a message as read by adding `\Seen`.
    ///
    /// # Errors
    ///
    /// Select/store failures.
    pub async fn mark_read(&mut self, folder: &Folder, uid: u32) -> Result<()> {
        self.select(folder).await?;

        let uid = parse_uid(uid)?;
        self.session
            .uid_store(
                &UidSet::single(uid),
                StoreAction::AddFlags(vec![mailwren_imap::Flag::Seen]),
            )
            .await
            .map_err(|e| {
                MailError::classify(
                    &format!("mark message {uid} read in '{}'", folder.server_path),
                    e,
                )
            })
    }

    /// Moves a message: copy to `dest`, flag `\Deleted` in `src`, expunge.
    ///
    /// Each step depends on the previous one succeeding. There is no
    /// compensating rollback; on failure the message stays wherever the
    /// last successful step left it, which is the accepted IMAP idiom for
    /// this sequence (a failed expunge leaves it flagged deleted but
    /// present).
    ///
    /// # Errors
    ///
    /// The first failing step's error, with its folder/UID context.
    pub async fn move_message(&mut self, src: &Folder, dest: &Folder, uid: u32) -> Result<()> {
        self.select(src).await?;

        let uid = parse_uid(uid)?;
        let set = UidSet::single(uid);

        self.session
            .uid_copy(&set, &dest.mailbox())
            .await
            .map_err(|e| {
                MailError::classify(
                    &format!("copy message {uid} to '{}'", dest.server_path),
                    e,
                )
            })?;

        self.session
            .uid_store(&set, StoreAction::AddFlags(vec![mailwren_imap::Flag::Deleted]))
            .await
            .map_err(|e| {
                MailError::classify(
                    &format!("flag message {uid} deleted in '{}'", src.server_path),
                    e,
                )
            })?;

        self.session.expunge().await.map_err(|e| {
            MailError::classify(&format!("expunge folder '{}'", src.server_path), e)
        })?;

        Ok(())
    }

    /// Counts unseen messages in a folder, for populating
    /// [`Folder::unread_count`].
    ///
    /// # Errors
    ///
    /// Select/search failures.
    pub async fn unread_count(&mut self, folder: &Folder) -> Result<u32> {
        self.select(folder).await?;

        let unseen = self
            .session
            .uid_search(SearchCriteria::Unseen)
            .await
            .map_err(|e| {
                MailError::classify(
                    &format!("search unseen in '{}'", folder.server_path),
                    e,
                )
            })?;

        Ok(u32::try_from(unseen.len()).unwrap_or(u32::MAX))
    }

    /// Closes the session: best-effort logout, connection state cleared.
    pub async fn close(&mut self) {
        self.session.close().await;
    }

    // === Private helpers ===

    /// Selects the folder, connecting lazily; failures name the folder.
    async fn select(&mut self, folder: &Folder) -> Result<()> {
        self.session.select(&folder.mailbox()).await.map_err(|e| {
            MailError::classify(&format!("select folder '{}'", folder.server_path), e)
        })?;
        Ok(())
    }

    /// Fallback path: one UID FETCH per message. Failures on individual
    /// messages are skipped, never propagated.
    async fn fetch_headers_individually(&mut self, folder: &Folder, uids: &[Uid]) -> Vec<Message> {
        let mut messages = Vec::new();

        for &uid in uids {
            let set = UidSet::single(uid);
            match self.session.uid_fetch(&set, header_items()).await {
                Ok(responses) => {
                    if let Some(message) = responses
                        .iter()
                        .find_map(|(_, items)| self.message_from_items(folder, items))
                    {
                        messages.push(message);
                    } else {
                        tracing::debug!(uid = uid.get(), "skipping unparseable message");
                    }
                }
                Err(e) => {
                    tracing::debug!(uid = uid.get(), error = %e, "skipping message after fetch error");
                }
            }
        }

        messages
    }

    /// Builds a message record from one FETCH response's items.
    fn message_from_items(&self, folder: &Folder, items: &[FetchItem]) -> Option<Message> {
        message_from_fetch(self.account.record_id(), folder.record_id(), items)
    }
}

/// The fetch attributes of a header batch: UID for addressing, FLAGS for
/// read state, and the raw header block.
fn header_items() -> Vec<FetchAttribute> {
    vec![
        FetchAttribute::Uid,
        FetchAttribute::Flags,
        FetchAttribute::Rfc822Header,
    ]
}

/// Converts a caller-supplied UID number into the wire type.
fn parse_uid(uid: u32) -> Result<Uid> {
    Uid::new(uid).ok_or_else(|| MailError::Operation("message UID 0 is not addressable".into()))
}

/// Takes the most recent `limit` UIDs; the tail of the ascending list.
/// Older messages beyond the limit are never fetched.
#[must_use]
pub fn take_recent(uids: &[Uid], limit: usize) -> &[Uid] {
    let start = uids.len().saturating_sub(limit);
    &uids[start..]
}

/// Builds a folder record from a server path.
///
/// RFC 2047 decoding is applied best-effort for non-ASCII names (it never
/// fails; undecodable input stays raw). The display name is the segment
/// after the last `/`.
#[must_use]
pub fn folder_from_path(account_id: i64, server_path: &str) -> Folder {
    let server_path = mailwren_mime::encoding::decode_header(server_path);

    let name = server_path
        .rsplit_once('/')
        .map_or_else(|| server_path.clone(), |(_, n)| n.to_string());

    Folder {
        account_id,
        name,
        is_system: is_system_path(&server_path),
        server_path,
        id: None,
        unread_count: 0,
    }
}

/// Classifies system folders by case-insensitive path match.
fn is_system_path(path: &str) -> bool {
    let upper = path.to_uppercase();
    upper == "INBOX"
        || upper.contains("SENT")
        || upper.contains("DRAFT")
        || upper.contains("TRASH")
        || upper.contains("DELETED")
}

/// Builds a message record from a FETCH response's items.
///
/// Returns `None` when the response carries no UID or no header block;
/// such messages are skipped, never fatal.
#[must_use]
pub fn message_from_fetch(account_id: i64, folder_id: i64, items: &[FetchItem]) -> Option<Message> {
    let mut uid = None;
    let mut flags = Flags::new();
    let mut header_bytes: Option<&[u8]> = None;

    for item in items {
        match item {
            FetchItem::Uid(u) => uid = Some(*u),
            FetchItem::Flags(f) => flags = f.clone(),
            FetchItem::Rfc822Header(h) => header_bytes = Some(h),
            _ => {}
        }
    }

    let uid = uid?;
    let header_bytes = header_bytes?;

    let headers = Headers::parse(&String::from_utf8_lossy(header_bytes));

    let subject = headers.get_decoded("subject").unwrap_or_default();

    let sender_raw = headers.get_decoded("from").unwrap_or_default();
    let sender = parse_address(&sender_raw).unwrap_or_else(|| sender_raw.trim().to_string());

    let recipients = headers
        .get_decoded("to")
        .map(|to| parse_address_list(&to))
        .unwrap_or_default();

    let sent_at = headers
        .get("date")
        .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok());
    // IMAP does not report arrival time via header fetch
    let received_at = sent_at;

    let has_attachments = headers.contains("content-disposition")
        || headers
            .get("content-type")
            .is_some_and(|ct| ct.to_lowercase().contains("attachment"));

    let is_read = flags.is_seen();

    Some(Message {
        account_id,
        folder_id,
        uid: uid.get(),
        sender,
        recipients,
        subject,
        preview_text: String::new(),
        sent_at,
        received_at,
        is_read,
        has_attachments,
        flags,
    })
}
