//! MIME message structure and parsing.

use crate::content_type::ContentType;
use crate::encoding::{decode_base64, decode_quoted_printable_bytes};
use crate::error::Result;
use crate::header::Headers;
use std::fmt;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses a transfer encoding from a header value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// MIME message part.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body (raw bytes, still transfer-encoded).
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Gets the content type; an untyped part defaults to text/plain.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.headers
            .get("content-type")
            .and_then(|v| ContentType::parse(v).ok())
            .unwrap_or_else(ContentType::text_plain)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Returns true if the part is declared as an attachment via
    /// Content-Disposition.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.headers
            .get("content-disposition")
            .is_some_and(|d| d.to_lowercase().contains("attachment"))
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => {
                let body_str = String::from_utf8_lossy(&self.body);
                // Strip line breaks for lenient parsing
                let cleaned: String = body_str.chars().filter(|c| !c.is_whitespace()).collect();
                decode_base64(&cleaned)
            }
            TransferEncoding::QuotedPrintable => {
                let body_str = String::from_utf8_lossy(&self.body);
                decode_quoted_printable_bytes(&body_str)
            }
            _ => Ok(self.body.clone()),
        }
    }

    /// Gets the decoded body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or UTF-8 conversion fails.
    pub fn body_text(&self) -> Result<String> {
        let decoded = self.decode_body()?;
        String::from_utf8(decoded).map_err(Into::into)
    }

    /// Walks this part looking for body alternatives, first occurrence
    /// winning. Attachments are skipped; nested multiparts are recursed
    /// into; a part whose decoding fails is simply left unset.
    fn collect_bodies(&self, plain: &mut Option<String>, html: &mut Option<String>) {
        if self.is_attachment() {
            return;
        }

        let ct = self.content_type();

        if ct.is_multipart() {
            if let Some(boundary) = ct.boundary() {
                let body_str = String::from_utf8_lossy(&self.body).into_owned();
                for nested in split_multipart(&body_str, boundary) {
                    nested.collect_bodies(plain, html);
                }
            }
            return;
        }

        if ct.is("text", "plain") && plain.is_none() {
            if let Ok(text) = self.body_text() {
                *plain = Some(text);
            }
        } else if ct.is("text", "html") && html.is_none() {
            if let Ok(text) = self.body_text() {
                *html = Some(text);
            }
        }
    }
}

/// A parsed MIME message.
#[derive(Debug, Clone)]
pub struct Message {
    /// Message headers.
    pub headers: Headers,
    /// Top-level parts (empty for single-part messages).
    pub parts: Vec<Part>,
    /// Body for single-part messages.
    pub body: Option<Vec<u8>>,
}

impl Message {
    /// Parses a raw RFC 5322/MIME message.
    ///
    /// Multipart messages are split on their declared boundary; a
    /// multipart content type with no usable boundary degrades to a
    /// single-part message. Malformed input never fails the parse; it
    /// degrades to whatever structure could be recovered.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let (header_text, body_text) = split_headers_body(&text);
        let headers = Headers::parse(header_text);

        let content_type = headers
            .get("content-type")
            .and_then(|v| ContentType::parse(v).ok())
            .unwrap_or_else(ContentType::text_plain);

        if content_type.is_multipart()
            && let Some(boundary) = content_type.boundary()
        {
            let parts = split_multipart(body_text, boundary);
            return Self {
                headers,
                parts,
                body: None,
            };
        }

        Self {
            headers,
            parts: Vec::new(),
            body: Some(body_text.as_bytes().to_vec()),
        }
    }

    /// Gets the message content type; defaults to text/plain.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.headers
            .get("content-type")
            .and_then(|v| ContentType::parse(v).ok())
            .unwrap_or_else(ContentType::text_plain)
    }

    /// Checks if this is a multipart message.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        !self.parts.is_empty()
    }

    /// Extracts the plain-text and HTML bodies.
    ///
    /// Multipart: all parts are walked (recursing into nested
    /// multiparts), attachments are skipped, and the first `text/plain`
    /// and first `text/html` parts win; later alternatives never
    /// overwrite. Single-part: the content type picks which side is
    /// populated. Decoding failures leave the affected side unset.
    #[must_use]
    pub fn extract_bodies(&self) -> (Option<String>, Option<String>) {
        let mut plain = None;
        let mut html = None;

        if self.is_multipart() {
            for part in &self.parts {
                part.collect_bodies(&mut plain, &mut html);
            }
        } else if let Some(body) = &self.body {
            let part = Part::new(self.headers.clone(), body.clone());
            if self.content_type().is("text", "html") {
                if let Ok(text) = part.body_text() {
                    html = Some(text);
                }
            } else if let Ok(text) = part.body_text() {
                plain = Some(text);
            }
        }

        (plain, html)
    }
}

/// Splits a message into its header block and body at the first blank line.
fn split_headers_body(message: &str) -> (&str, &str) {
    if let Some(idx) = message.find("\r\n\r\n") {
        (&message[..idx], &message[idx + 4..])
    } else if let Some(idx) = message.find("\n\n") {
        (&message[..idx], &message[idx + 2..])
    } else {
        (message, "")
    }
}

/// Splits a multipart body into its parts using the boundary.
fn split_multipart(body: &str, boundary: &str) -> Vec<Part> {
    let delimiter = format!("--{boundary}");
    let end_delimiter = format!("--{boundary}--");

    let mut parts = Vec::new();

    for chunk in body.split(&delimiter) {
        let trimmed = chunk.trim();

        // Preamble, epilogue, and the final closing marker
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }

        let clean = trimmed.strip_suffix(&end_delimiter).unwrap_or(trimmed);
        if clean.trim().is_empty() {
            continue;
        }

        let (header_text, body_text) = split_headers_body(clean);
        parts.push(Part::new(
            Headers::parse(header_text),
            body_text.as_bytes().to_vec(),
        ));
    }

    parts
}
