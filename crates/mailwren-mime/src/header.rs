//! MIME header handling.

use crate::encoding::decode_header;
use std::collections::HashMap;

/// Collection of email headers.
///
/// Header names are case-insensitive; a name may carry several values.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        self.headers.entry(name).or_default().push(value.into());
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Gets the first value for a header with RFC 2047 words decoded.
    ///
    /// Decoding is best-effort and never fails; undecodable words come
    /// back raw.
    #[must_use]
    pub fn get_decoded(&self, name: &str) -> Option<String> {
        self.get(name).map(decode_header)
    }

    /// Returns true if the header is present at all.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_lowercase())
    }

    /// Parses headers from a raw header block.
    ///
    /// Handles folded (continuation) lines starting with space or tab.
    /// Lines without a colon are ignored; a blank line ends the block.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current_name: Option<String> = None;
        let mut current_value = String::new();

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if current_name.is_some() {
                    current_value.push(' ');
                    current_value.push_str(line.trim());
                }
            } else {
                if let Some(name) = current_name.take() {
                    headers.add(name, current_value.trim().to_string());
                    current_value.clear();
                }

                if let Some((name, value)) = line.split_once(':') {
                    current_name = Some(name.trim().to_string());
                    current_value = value.trim().to_string();
                }
            }
        }

        if let Some(name) = current_name {
            headers.add(name, current_value.trim().to_string());
        }

        headers
    }
}
