//! Framed I/O for the IMAP protocol.
//!
//! IMAP responses are CRLF-terminated lines that may carry literals
//! (`{n}\r\n` followed by n raw bytes). A "response" as handed to the
//! parser is one line with all of its literals inlined.

#![allow(clippy::missing_errors_doc)]

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::Result;

/// Default buffer size for reading.
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Maximum line length to prevent memory exhaustion.
const MAX_LINE_LENGTH: usize = 1024 * 1024; // 1 MB

/// Maximum literal size to prevent memory exhaustion.
const MAX_LITERAL_SIZE: usize = 100 * 1024 * 1024; // 100 MB

/// Framed connection for the IMAP protocol.
pub struct FramedStream<S> {
    reader: BufReader<S>,
    write_buffer: BytesMut,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new framed stream.
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            write_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }

    /// Reads a complete IMAP response, following embedded literals.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();

        loop {
            let line = self.read_line().await?;
            response.extend_from_slice(&line);

            if let Some(literal_len) = parse_literal_length(&line) {
                if literal_len > MAX_LITERAL_SIZE {
                    return Err(crate::Error::Protocol(format!(
                        "literal too large: {literal_len} bytes (max {MAX_LITERAL_SIZE})"
                    )));
                }
                let mut literal = vec![0u8; literal_len];
                self.reader.read_exact(&mut literal).await?;
                response.extend_from_slice(&literal);
                // More of the same line may follow the literal
            } else {
                break;
            }
        }

        Ok(response)
    }

    /// Reads a single CRLF-terminated line.
    async fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(crate::Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }

            if let Some(pos) = find_crlf(buf) {
                line.extend_from_slice(&buf[..pos + 2]);
                self.reader.consume(pos + 2);
                break;
            }

            let len = buf.len();
            line.extend_from_slice(buf);
            self.reader.consume(len);

            if line.len() > MAX_LINE_LENGTH {
                return Err(crate::Error::Protocol("line too long".to_string()));
            }
        }

        Ok(line)
    }

    /// Writes a command to the stream.
    pub async fn write_command(&mut self, data: &[u8]) -> Result<()> {
        self.write_buffer.clear();
        self.write_buffer.extend_from_slice(data);

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buffer).await?;
        stream.flush().await?;

        Ok(())
    }
}

/// Finds the position of CRLF in a buffer.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Parses a literal length from the end of a line.
///
/// Matches `{123}\r\n` and the non-synchronizing `{123+}\r\n`.
fn parse_literal_length(line: &[u8]) -> Option<usize> {
    if !line.ends_with(b"\r\n") {
        return None;
    }

    let line = &line[..line.len() - 2];
    let open = line.iter().rposition(|&b| b == b'{')?;

    if !line.ends_with(b"}") {
        return None;
    }

    let num_end = if line.ends_with(b"+}") {
        line.len() - 2
    } else {
        line.len() - 1
    };

    let num_str = std::str::from_utf8(&line[open + 1..num_end]).ok()?;
    num_str.parse().ok()
}

/// Accumulates responses until the tagged completion line arrives.
pub struct ResponseAccumulator {
    tag: String,
    responses: Vec<Vec<u8>>,
}

impl ResponseAccumulator {
    /// Creates a new response accumulator for the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            responses: Vec::new(),
        }
    }

    /// Reads responses until a tagged response matching our tag is found.
    pub async fn read_until_tagged<S>(
        &mut self,
        framed: &mut FramedStream<S>,
    ) -> Result<Vec<Vec<u8>>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let response = framed.read_response().await?;

            let is_tagged = response
                .get(..self.tag.len())
                .is_some_and(|prefix| prefix == self.tag.as_bytes())
                && response.get(self.tag.len()).is_some_and(|&b| b == b' ');

            self.responses.push(response);

            if is_tagged {
                break;
            }
        }

        Ok(std::mem::take(&mut self.responses))
    }
}
