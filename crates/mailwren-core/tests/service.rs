//! End-to-end tests for the mail service over a scripted mock stream.

#![allow(clippy::unwrap_used)]

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use mailwren_core::service::MailSession;
use mailwren_core::{Account, AccountId, MailError};
use mailwren_imap::{Error, Session, SessionConfig, Transport};

/// Mock stream replaying a scripted server transcript.
struct MockStream {
    responses: Cursor<Vec<u8>>,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl MockStream {
    fn new(responses: &[u8]) -> Self {
        Self {
            responses: Cursor::new(responses.to_vec()),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn sent(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.sent)
    }
}

fn sent_text(handle: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8_lossy(&handle.lock().unwrap()).to_string()
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let pos = usize::try_from(self.responses.position()).unwrap();
        let data = self.responses.get_ref();

        if pos >= data.len() {
            return Poll::Ready(Ok(()));
        }

        let remaining = &data[pos..];
        let to_read = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..to_read]);
        self.responses.set_position((pos + to_read) as u64);

        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.sent.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl Transport for MockStream {
    async fn connect(_config: &SessionConfig) -> mailwren_imap::Result<Self> {
        Err(Error::Protocol("mock stream cannot dial".to_string()))
    }
}

fn test_account() -> Account {
    Account::new("user@example.com", "imap.example.com").with_id(AccountId::new(1))
}

async fn session_over(script: &[u8]) -> (MailSession<MockStream>, Arc<Mutex<Vec<u8>>>) {
    let stream = MockStream::new(script);
    let sent = stream.sent();

    let config = SessionConfig::new("imap.example.com", "user@example.com").password("pw");
    let session = Session::from_stream(config, stream).await.unwrap();
    (MailSession::from_session(test_account(), session), sent)
}

/// Renders one `* n FETCH` line carrying UID, flags, and a header literal.
fn fetch_line(seq: u32, uid: u32, flags: &str, headers: &str) -> String {
    format!(
        "* {seq} FETCH (UID {uid} FLAGS ({flags}) RFC822.HEADER {{{len}}}\r\n{headers})\r\n",
        len = headers.len()
    )
}

fn headers_for(subject: &str, from: &str) -> String {
    format!(
        "Subject: {subject}\r\nFrom: {from}\r\nTo: user@example.com\r\n\
         Date: Mon, 01 Jan 2024 10:30:00 +0000\r\n\r\n"
    )
}

const GREETING: &[u8] = b"* OK ready\r\n";
const AUTH_OK: &[u8] = b"A0000 OK authenticated\r\n";

fn select_ok(tag: &str, exists: u32) -> String {
    format!("* {exists} EXISTS\r\n* OK [UIDVALIDITY 7] ok\r\n{tag} OK [READ-WRITE] selected\r\n")
}

fn inbox() -> mailwren_core::Folder {
    mailwren_core::service::folder_from_path(1, "INBOX")
}

#[tokio::test]
async fn test_list_folders_records() {
    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(b"* LIST (\\HasNoChildren) \"/\" \"INBOX\"\r\n");
    script.extend_from_slice(b"* LIST (\\HasNoChildren) \"/\" \"[Gmail]/Sent Mail\"\r\n");
    script.extend_from_slice(b"* LIST (\\HasNoChildren) \"/\" \"Receipts\"\r\n");
    script.extend_from_slice(b"A0001 OK done\r\n");

    let (mut mail, _) = session_over(&script).await;
    let folders = mail.list_folders().await.unwrap();

    assert_eq!(folders.len(), 3);

    assert_eq!(folders[0].server_path, "INBOX");
    assert_eq!(folders[0].name, "INBOX");
    assert!(folders[0].is_system);
    assert_eq!(folders[0].account_id, 1);

    assert_eq!(folders[1].server_path, "[Gmail]/Sent Mail");
    assert_eq!(folders[1].name, "Sent Mail");
    assert!(folders[1].is_system);

    assert_eq!(folders[2].server_path, "Receipts");
    assert!(!folders[2].is_system);
    assert_eq!(folders[2].unread_count, 0);
}

#[tokio::test]
async fn test_fetch_headers_newest_first_with_limit() {
    // Mailbox holds UIDs 10,11,12; limit 2 fetches only 11,12 and the
    // caller sees [12, 11].
    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(select_ok("A0001", 3).as_bytes());
    script.extend_from_slice(b"* SEARCH 10 11 12\r\n");
    script.extend_from_slice(b"A0002 OK done\r\n");
    script.extend_from_slice(fetch_line(2, 11, "\\Seen", &headers_for("second", "a@b.com")).as_bytes());
    script.extend_from_slice(fetch_line(3, 12, "", &headers_for("third", "c@d.com")).as_bytes());
    script.extend_from_slice(b"A0003 OK done\r\n");

    let (mut mail, sent) = session_over(&script).await;
    let messages = mail.fetch_headers(&inbox(), 2).await.unwrap();

    let uids: Vec<u32> = messages.iter().map(|m| m.uid).collect();
    assert_eq!(uids, vec![12, 11]);

    assert_eq!(messages[0].subject, "third");
    assert!(!messages[0].is_read);
    assert_eq!(messages[1].subject, "second");
    assert!(messages[1].is_read);
    assert_eq!(messages[1].sender, "a@b.com");
    assert!(messages[1].preview_text.is_empty());

    // Only the two newest UIDs went over the wire, comma-joined
    let sent = sent_text(&sent);
    assert!(sent.contains("UID FETCH 11,12 (UID FLAGS RFC822.HEADER)"));
    assert!(!sent.contains("UID FETCH 10"));
}

#[tokio::test]
async fn test_fetch_headers_empty_folder() {
    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(select_ok("A0001", 0).as_bytes());
    script.extend_from_slice(b"* SEARCH\r\n");
    script.extend_from_slice(b"A0002 OK done\r\n");

    let (mut mail, _) = session_over(&script).await;
    let messages = mail.fetch_headers(&inbox(), 50).await.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_fetch_headers_fallback_matches_batch() {
    let h1 = headers_for("second", "a@b.com");
    let h2 = headers_for("third", "c@d.com");

    // Batch path
    let mut batch_script = GREETING.to_vec();
    batch_script.extend_from_slice(AUTH_OK);
    batch_script.extend_from_slice(select_ok("A0001", 3).as_bytes());
    batch_script.extend_from_slice(b"* SEARCH 10 11 12\r\n");
    batch_script.extend_from_slice(b"A0002 OK done\r\n");
    batch_script.extend_from_slice(fetch_line(2, 11, "\\Seen", &h1).as_bytes());
    batch_script.extend_from_slice(fetch_line(3, 12, "", &h2).as_bytes());
    batch_script.extend_from_slice(b"A0003 OK done\r\n");

    // Fallback path: the combined fetch is rejected outright, then each
    // per-UID fetch succeeds.
    let mut fallback_script = GREETING.to_vec();
    fallback_script.extend_from_slice(AUTH_OK);
    fallback_script.extend_from_slice(select_ok("A0001", 3).as_bytes());
    fallback_script.extend_from_slice(b"* SEARCH 10 11 12\r\n");
    fallback_script.extend_from_slice(b"A0002 OK done\r\n");
    fallback_script.extend_from_slice(b"A0003 BAD combined fetch not supported\r\n");
    fallback_script.extend_from_slice(fetch_line(2, 11, "\\Seen", &h1).as_bytes());
    fallback_script.extend_from_slice(b"A0004 OK done\r\n");
    fallback_script.extend_from_slice(fetch_line(3, 12, "", &h2).as_bytes());
    fallback_script.extend_from_slice(b"A0005 OK done\r\n");

    let (mut batch_mail, _) = session_over(&batch_script).await;
    let batch = batch_mail.fetch_headers(&inbox(), 2).await.unwrap();

    let (mut fallback_mail, _) = session_over(&fallback_script).await;
    let fallback = fallback_mail.fetch_headers(&inbox(), 2).await.unwrap();

    // Same mailbox state, same results, whichever path ran
    assert_eq!(batch.len(), fallback.len());
    for (a, b) in batch.iter().zip(&fallback) {
        assert_eq!(a.uid, b.uid);
        assert_eq!(a.subject, b.subject);
        assert_eq!(a.sender, b.sender);
        assert_eq!(a.is_read, b.is_read);
        assert_eq!(a.flags, b.flags);
    }
}

#[tokio::test]
async fn test_fetch_headers_skips_broken_message_in_batch() {
    // The middle message has no UID item and is dropped; the batch goes on.
    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(select_ok("A0001", 2).as_bytes());
    script.extend_from_slice(b"* SEARCH 11 12\r\n");
    script.extend_from_slice(b"A0002 OK done\r\n");
    script.extend_from_slice(
        format!(
            "* 1 FETCH (FLAGS (\\Seen) RFC822.HEADER {{{}}}\r\n{})\r\n",
            headers_for("no uid", "x@y.com").len(),
            headers_for("no uid", "x@y.com")
        )
        .as_bytes(),
    );
    script.extend_from_slice(fetch_line(2, 12, "", &headers_for("good", "c@d.com")).as_bytes());
    script.extend_from_slice(b"A0003 OK done\r\n");

    let (mut mail, _) = session_over(&script).await;
    let messages = mail.fetch_headers(&inbox(), 10).await.unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].uid, 12);
    assert_eq!(messages[0].subject, "good");
}

#[tokio::test]
async fn test_fetch_body_multipart() {
    let body = concat!(
        "Content-Type: multipart/alternative; boundary=B\r\n",
        "\r\n",
        "--B\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "plain body\r\n",
        "--B\r\n",
        "Content-Type: text/html\r\n",
        "\r\n",
        "<b>html body</b>\r\n",
        "--B--\r\n"
    );

    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(select_ok("A0001", 1).as_bytes());
    script.extend_from_slice(
        format!(
            "* 1 FETCH (UID 5 RFC822 {{{}}}\r\n{})\r\n",
            body.len(),
            body
        )
        .as_bytes(),
    );
    script.extend_from_slice(b"A0002 OK done\r\n");

    let (mut mail, _) = session_over(&script).await;
    let (plain, html) = mail.fetch_body(&inbox(), 5).await.unwrap();

    assert_eq!(plain.as_deref(), Some("plain body"));
    assert_eq!(html.as_deref(), Some("<b>html body</b>"));
}

#[tokio::test]
async fn test_mark_read_sends_seen_flag() {
    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(select_ok("A0001", 1).as_bytes());
    script.extend_from_slice(b"* 1 FETCH (FLAGS (\\Seen))\r\n");
    script.extend_from_slice(b"A0002 OK STORE done\r\n");

    let (mut mail, sent) = session_over(&script).await;
    mail.mark_read(&inbox(), 7).await.unwrap();

    assert!(sent_text(&sent).contains("UID STORE 7 +FLAGS (\\Seen)"));
}

#[tokio::test]
async fn test_move_message_copy_flag_expunge_sequence() {
    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(select_ok("A0001", 1).as_bytes());
    script.extend_from_slice(b"A0002 OK COPY done\r\n");
    script.extend_from_slice(b"* 1 FETCH (FLAGS (\\Deleted))\r\n");
    script.extend_from_slice(b"A0003 OK STORE done\r\n");
    script.extend_from_slice(b"* 1 EXPUNGE\r\n");
    script.extend_from_slice(b"A0004 OK EXPUNGE done\r\n");

    let (mut mail, sent) = session_over(&script).await;
    let dest = mailwren_core::service::folder_from_path(1, "[Gmail]/All Mail");
    mail.move_message(&inbox(), &dest, 5).await.unwrap();

    let sent = sent_text(&sent);

    // Copy, then flag, then expunge; in that order, with the
    // destination quoted for the wire.
    let copy_pos = sent.find("UID COPY 5 \"[Gmail]/All Mail\"").unwrap();
    let store_pos = sent.find("UID STORE 5 +FLAGS (\\Deleted)").unwrap();
    let expunge_pos = sent.find("EXPUNGE").unwrap();
    assert!(copy_pos < store_pos);
    assert!(store_pos < expunge_pos);
}

#[tokio::test]
async fn test_move_message_stops_after_failed_copy() {
    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(select_ok("A0001", 1).as_bytes());
    script.extend_from_slice(b"A0002 NO [TRYCREATE] no such mailbox\r\n");

    let (mut mail, sent) = session_over(&script).await;
    let dest = mailwren_core::service::folder_from_path(1, "Missing");
    let err = mail.move_message(&inbox(), &dest, 5).await.unwrap_err();

    match err {
        MailError::Operation(msg) => {
            assert!(msg.contains("copy message 5"));
            assert!(msg.contains("Missing"));
        }
        other => panic!("expected Operation error, got {other:?}"),
    }

    // No store or expunge was attempted after the failed copy
    let sent = sent_text(&sent);
    assert!(!sent.contains("UID STORE"));
    assert!(!sent.contains("EXPUNGE"));
}

#[tokio::test]
async fn test_select_failure_names_folder() {
    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(b"A0001 NO no such mailbox\r\n");

    let (mut mail, _) = session_over(&script).await;
    let folder = mailwren_core::service::folder_from_path(1, "Nope");
    let err = mail.fetch_headers(&folder, 10).await.unwrap_err();

    match err {
        MailError::Operation(msg) => assert!(msg.contains("select folder 'Nope'")),
        other => panic!("expected Operation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unread_count() {
    let mut script = GREETING.to_vec();
    script.extend_from_slice(AUTH_OK);
    script.extend_from_slice(select_ok("A0001", 5).as_bytes());
    script.extend_from_slice(b"* SEARCH 11 14\r\n");
    script.extend_from_slice(b"A0002 OK done\r\n");

    let (mut mail, sent) = session_over(&script).await;
    let count = mail.unread_count(&inbox()).await.unwrap();

    assert_eq!(count, 2);
    assert!(sent_text(&sent).contains("UID SEARCH UNSEEN"));
}
