//! FETCH response parsing.

use crate::parser::lexer::{Lexer, Token};
use crate::types::Uid;
use crate::{Error, Result};

use super::parse_flag_list;
use super::types::FetchItem;

/// Parses the parenthesized item list of a FETCH response.
pub fn parse_fetch_response(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;

    let mut items = Vec::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => continue,
            Token::Atom(name) => {
                let upper = name.to_uppercase();
                match upper.as_str() {
                    "FLAGS" => {
                        lexer.expect_space()?;
                        let flags = parse_flag_list(lexer)?;
                        items.push(FetchItem::Flags(flags));
                    }
                    "UID" => {
                        lexer.expect_space()?;
                        let n = lexer.read_number()?;
                        let uid = Uid::new(n).ok_or_else(|| Error::Parse {
                            position: lexer.position(),
                            message: format!("invalid UID value: {n} (UID cannot be 0)"),
                        })?;
                        items.push(FetchItem::Uid(uid));
                    }
                    "RFC822.HEADER" => {
                        lexer.expect_space()?;
                        if let Some(data) = read_payload(lexer)? {
                            items.push(FetchItem::Rfc822Header(data));
                        }
                    }
                    "RFC822" => {
                        lexer.expect_space()?;
                        if let Some(data) = read_payload(lexer)? {
                            items.push(FetchItem::Rfc822(data));
                        }
                    }
                    "BODY" => {
                        let section = parse_body_section(lexer);
                        lexer.expect_space()?;
                        let data = read_payload(lexer)?;
                        items.push(FetchItem::Body { section, data });
                    }
                    _ => skip_fetch_item(lexer),
                }
            }
            _ => continue,
        }
    }

    Ok(items)
}

/// Reads a literal or NIL payload.
fn read_payload(lexer: &mut Lexer<'_>) -> Result<Option<Vec<u8>>> {
    match lexer.next_token()? {
        Token::Literal(data) => Ok(Some(data)),
        Token::Nil => Ok(None),
        Token::QuotedString(s) => Ok(Some(s.into_bytes())),
        token => Err(Error::Parse {
            position: lexer.position(),
            message: format!("Expected payload, got {token:?}"),
        }),
    }
}

/// Parses the optional `[section]` after BODY, returning its raw content.
fn parse_body_section(lexer: &mut Lexer<'_>) -> Option<String> {
    if lexer.peek() != Some(b'[') {
        return None;
    }
    lexer.advance();

    let mut section = String::new();
    while let Some(b) = lexer.peek() {
        lexer.advance();
        if b == b']' {
            break;
        }
        section.push(b as char);
    }

    Some(section)
}

/// Skips an unknown fetch item value (atom, string, or parenthesized list).
fn skip_fetch_item(lexer: &mut Lexer<'_>) {
    if lexer.peek() == Some(b' ') {
        lexer.advance();
    }

    let mut paren_depth = 0u32;
    loop {
        match lexer.peek() {
            Some(b'(') => {
                paren_depth += 1;
                lexer.advance();
            }
            Some(b')') => {
                if paren_depth == 0 {
                    break;
                }
                paren_depth -= 1;
                lexer.advance();
            }
            Some(b' ') if paren_depth == 0 => break,
            Some(_) => {
                lexer.advance();
            }
            None => break,
        }
    }
}
