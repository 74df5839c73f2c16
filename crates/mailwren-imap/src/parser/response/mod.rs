//! IMAP response parser.
//!
//! Parses server responses according to the RFC 3501/9051 grammar, to the
//! depth this client needs.

#![allow(clippy::missing_errors_doc)]

mod fetch;
mod helpers;
mod types;

pub use types::{FetchItem, UntaggedResponse};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{ResponseCode, SeqNum, Status, Tag};
use crate::{Error, Result};

use helpers::{
    parse_capability_data, parse_list_response, parse_response_code, parse_search_response,
    read_text_until_crlf,
};

// Re-export for the fetch submodule.
pub(crate) use helpers::parse_flag_list;

/// A parsed IMAP response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Tagged response (command completion).
    Tagged {
        /// The command tag.
        tag: Tag,
        /// Response status.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Untagged response (server data).
    Untagged(UntaggedResponse),
    /// Continuation request.
    Continuation {
        /// Optional text/data.
        text: Option<String>,
    },
}

/// Response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a complete response line.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);

        match lexer.next_token()? {
            Token::Asterisk => Self::parse_untagged(&mut lexer),
            Token::Plus => Self::parse_continuation(&mut lexer),
            Token::Atom(tag) => Self::parse_tagged(&mut lexer, tag),
            token => Err(Error::Parse {
                position: 0,
                message: format!("Expected *, +, or tag, got {token:?}"),
            }),
        }
    }

    /// Parses a tagged response.
    fn parse_tagged(lexer: &mut Lexer<'_>, tag_str: &str) -> Result<Response> {
        lexer.expect_space()?;

        let status = Self::parse_status(lexer)?;
        lexer.expect_space()?;

        let (code, text) = Self::parse_resp_text(lexer)?;

        Ok(Response::Tagged {
            tag: Tag::new(tag_str),
            status,
            code,
            text,
        })
    }

    /// Parses an untagged response.
    fn parse_untagged(lexer: &mut Lexer<'_>) -> Result<Response> {
        lexer.expect_space()?;

        match lexer.next_token()? {
            Token::Atom(s) => {
                let upper = s.to_uppercase();
                match upper.as_str() {
                    "OK" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::Ok { code, text }))
                    }
                    "NO" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::No { code, text }))
                    }
                    "BAD" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::Bad { code, text }))
                    }
                    "PREAUTH" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::PreAuth { code, text }))
                    }
                    "BYE" => {
                        lexer.expect_space()?;
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::Bye { code, text }))
                    }
                    "CAPABILITY" => {
                        let caps = parse_capability_data(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::Capability(caps)))
                    }
                    "FLAGS" => {
                        lexer.expect_space()?;
                        let flags = parse_flag_list(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::Flags(flags)))
                    }
                    "LIST" => {
                        lexer.expect_space()?;
                        let list = parse_list_response(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::List(list)))
                    }
                    "SEARCH" => {
                        let nums = parse_search_response(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::Search(nums)))
                    }
                    _ => Err(Error::Parse {
                        position: lexer.position(),
                        message: format!("Unknown untagged response: {s}"),
                    }),
                }
            }
            Token::Number(n) => {
                lexer.expect_space()?;
                let keyword = lexer.read_atom_string()?;

                match keyword.to_uppercase().as_str() {
                    "EXISTS" => Ok(Response::Untagged(UntaggedResponse::Exists(n))),
                    "RECENT" => Ok(Response::Untagged(UntaggedResponse::Recent(n))),
                    "EXPUNGE" => {
                        let seq = SeqNum::new(n).ok_or_else(|| Error::Parse {
                            position: lexer.position(),
                            message: "Invalid sequence number 0".to_string(),
                        })?;
                        Ok(Response::Untagged(UntaggedResponse::Expunge(seq)))
                    }
                    "FETCH" => {
                        let seq = SeqNum::new(n).ok_or_else(|| Error::Parse {
                            position: lexer.position(),
                            message: "Invalid sequence number 0".to_string(),
                        })?;
                        lexer.expect_space()?;
                        let items = fetch::parse_fetch_response(lexer)?;
                        Ok(Response::Untagged(UntaggedResponse::Fetch { seq, items }))
                    }
                    _ => Err(Error::Parse {
                        position: lexer.position(),
                        message: format!("Unknown message data: {keyword}"),
                    }),
                }
            }
            token => Err(Error::Parse {
                position: lexer.position(),
                message: format!("Unexpected token in untagged response: {token:?}"),
            }),
        }
    }

    /// Parses a continuation response.
    fn parse_continuation(lexer: &mut Lexer<'_>) -> Result<Response> {
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }

        let text = read_text_until_crlf(lexer);
        Ok(Response::Continuation {
            text: if text.is_empty() { None } else { Some(text) },
        })
    }

    /// Parses a status keyword.
    fn parse_status(lexer: &mut Lexer<'_>) -> Result<Status> {
        let s = lexer.read_atom_string()?;
        match s.to_uppercase().as_str() {
            "OK" => Ok(Status::Ok),
            "NO" => Ok(Status::No),
            "BAD" => Ok(Status::Bad),
            "PREAUTH" => Ok(Status::PreAuth),
            "BYE" => Ok(Status::Bye),
            _ => Err(Error::Parse {
                position: lexer.position(),
                message: format!("Invalid status: {s}"),
            }),
        }
    }

    /// Parses response text with optional bracketed response code.
    fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
        let code = if lexer.peek() == Some(b'[') {
            Some(parse_response_code(lexer)?)
        } else {
            None
        };

        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }

        let text = read_text_until_crlf(lexer);
        Ok((code, text))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::types::{Capability, Flag, MailboxAttribute, ResponseCode};

    use super::*;

    #[test]
    fn test_parse_ok_greeting() {
        let input = b"* OK Gimap ready for requests\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Untagged(UntaggedResponse::Ok { code, text }) => {
                assert!(code.is_none());
                assert_eq!(text, "Gimap ready for requests");
            }
            _ => panic!("Expected untagged OK"),
        }
    }

    #[test]
    fn test_parse_tagged_ok() {
        let input = b"A001 OK LOGIN completed\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Tagged {
                tag,
                status,
                code,
                text,
            } => {
                assert_eq!(tag.as_str(), "A001");
                assert_eq!(status, Status::Ok);
                assert!(code.is_none());
                assert_eq!(text, "LOGIN completed");
            }
            _ => panic!("Expected tagged response"),
        }
    }

    #[test]
    fn test_parse_tagged_no() {
        let input = b"A002 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Tagged { status, code, .. } => {
                assert_eq!(status, Status::No);
                assert!(matches!(code, Some(ResponseCode::Unknown(s)) if s == "AUTHENTICATIONFAILED"));
            }
            _ => panic!("Expected tagged response"),
        }
    }

    #[test]
    fn test_parse_capability() {
        let input = b"* CAPABILITY IMAP4rev1 AUTH=XOAUTH2 AUTH=PLAIN\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Untagged(UntaggedResponse::Capability(caps)) => {
                assert!(caps.contains(&Capability::Imap4Rev1));
                assert!(caps.contains(&Capability::Auth("XOAUTH2".to_string())));
            }
            _ => panic!("Expected capability response"),
        }
    }

    #[test]
    fn test_parse_exists() {
        let input = b"* 23 EXISTS\r\n";
        let response = ResponseParser::parse(input).unwrap();
        assert!(matches!(
            response,
            Response::Untagged(UntaggedResponse::Exists(23))
        ));
    }

    #[test]
    fn test_parse_expunge() {
        let input = b"* 4 EXPUNGE\r\n";
        let response = ResponseParser::parse(input).unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Expunge(seq)) => assert_eq!(seq.get(), 4),
            _ => panic!("Expected EXPUNGE"),
        }
    }

    #[test]
    fn test_parse_flags() {
        let input = b"* FLAGS (\\Seen \\Answered \\Flagged \\Deleted \\Draft)\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Untagged(UntaggedResponse::Flags(flags)) => {
                assert!(flags.contains(&Flag::Seen));
                assert!(flags.contains(&Flag::Deleted));
            }
            _ => panic!("Expected FLAGS"),
        }
    }

    #[test]
    fn test_parse_list() {
        let input = b"* LIST (\\HasChildren) \"/\" \"INBOX\"\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Untagged(UntaggedResponse::List(list)) => {
                assert!(list.attributes.contains(&MailboxAttribute::HasChildren));
                assert_eq!(list.delimiter, Some('/'));
                assert_eq!(list.mailbox.as_str(), "INBOX");
            }
            _ => panic!("Expected LIST"),
        }
    }

    #[test]
    fn test_parse_list_gmail_path() {
        // The path is the rightmost quoted token, delimiter quoting and all
        let input = b"* LIST (\\All \\HasNoChildren) \"/\" \"[Gmail]/All Mail\"\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Untagged(UntaggedResponse::List(list)) => {
                assert_eq!(list.mailbox.as_str(), "[Gmail]/All Mail");
            }
            _ => panic!("Expected LIST"),
        }
    }

    #[test]
    fn test_parse_search() {
        let input = b"* SEARCH 10 11 12\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Untagged(UntaggedResponse::Search(nums)) => {
                assert_eq!(nums, vec![10, 11, 12]);
            }
            _ => panic!("Expected SEARCH"),
        }
    }

    #[test]
    fn test_parse_empty_search() {
        let input = b"* SEARCH\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Untagged(UntaggedResponse::Search(nums)) => assert!(nums.is_empty()),
            _ => panic!("Expected SEARCH"),
        }
    }

    #[test]
    fn test_parse_continuation() {
        let input = b"+ eyJzdGF0dXMiOiI0MDAifQ==\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Continuation { text } => {
                assert_eq!(text.as_deref(), Some("eyJzdGF0dXMiOiI0MDAifQ=="));
            }
            _ => panic!("Expected continuation"),
        }
    }

    #[test]
    fn test_parse_response_code_uidvalidity() {
        let input = b"* OK [UIDVALIDITY 1234567890] UIDs valid\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Untagged(UntaggedResponse::Ok { code, .. }) => match code {
                Some(ResponseCode::UidValidity(v)) => assert_eq!(v.get(), 1_234_567_890),
                _ => panic!("Expected UIDVALIDITY code"),
            },
            _ => panic!("Expected untagged OK"),
        }
    }

    #[test]
    fn test_parse_fetch_with_header_literal() {
        let input =
            b"* 1 FETCH (UID 12 FLAGS (\\Seen) RFC822.HEADER {14}\r\nSubject: two\r\n)\r\n";
        let response = ResponseParser::parse(input).unwrap();

        match response {
            Response::Untagged(UntaggedResponse::Fetch { seq, items }) => {
                assert_eq!(seq.get(), 1);
                assert!(items.iter().any(|i| matches!(i, FetchItem::Uid(u) if u.get() == 12)));
                assert!(
                    items
                        .iter()
                        .any(|i| matches!(i, FetchItem::Rfc822Header(h) if h == b"Subject: two\r\n"))
                );
            }
            _ => panic!("Expected FETCH"),
        }
    }

    #[test]
    fn test_garbage_line_is_error() {
        assert!(ResponseParser::parse(b"* BOGUS nonsense\r\n").is_err());
        assert!(ResponseParser::parse(b"\x01\x02\r\n").is_err());
    }
}
