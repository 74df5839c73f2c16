#![allow(clippy::expect_used, clippy::uninlined_format_args)]
//! Example: List Gmail folders and recent INBOX headers with XOAUTH2
//!
//! Requires an already-obtained OAuth access token with the
//! `https://mail.google.com/` scope (mailwren does not acquire tokens;
//! use your authorization tooling of choice).
//!
//! ## Running
//!
//! ```bash
//! cargo run --package mailwren-core --example list_inbox
//! ```

use std::io::{self, Write};

use mailwren_core::{Account, MailSession};
use mailwren_imap::Credentials;
use mailwren_oauth::{Introspector, TokenBundle};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("mailwren - Gmail IMAP test");
    println!("==========================\n");

    print!("Email address: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    let email = email.trim();

    print!("Access token: ");
    io::stdout().flush()?;
    let mut token = String::new();
    io::stdin().read_line(&mut token)?;
    let token = token.trim();

    let account = Account::new(email, "imap.gmail.com");
    let credentials = Credentials::XOAuth2(TokenBundle::new(token));

    // The introspection preflight catches scope problems before the
    // SASL exchange; its own network failures are non-fatal.
    let mut session = MailSession::with_introspector(
        account,
        Some(credentials),
        Introspector::google()?,
    );

    println!("\nListing folders:");
    let folders = session.list_folders().await?;
    for folder in &folders {
        let marker = if folder.is_system { "*" } else { " " };
        println!("  {} {}", marker, folder.server_path);
    }

    let inbox = folders
        .iter()
        .find(|f| f.server_path.eq_ignore_ascii_case("INBOX"))
        .expect("no INBOX on server");

    println!("\nMost recent INBOX messages:");
    let messages = session.fetch_headers(inbox, 10).await?;
    for message in &messages {
        let read = if message.is_read { " " } else { "N" };
        println!("  [{}] {:>6}  {}  {}", read, message.uid, message.sender, message.subject);
    }

    session.close().await;
    println!("\nDone.");
    Ok(())
}
