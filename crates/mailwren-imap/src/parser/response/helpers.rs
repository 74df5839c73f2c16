//! Parser helper functions.

use crate::parser::lexer::{Lexer, Token};
use crate::types::{
    Capability, Flag, Flags, ListResponse, Mailbox, MailboxAttribute, ResponseCode, SeqNum, Uid,
    UidValidity,
};
use crate::{Error, Result};

/// Parses a bracketed response code.
pub fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    lexer.expect(Token::LBracket)?;

    let atom = lexer.read_atom_string()?;
    let upper = atom.to_uppercase();

    let code = match upper.as_str() {
        "ALERT" => ResponseCode::Alert,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "TRYCREATE" => ResponseCode::TryCreate,
        "UIDNEXT" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            let uid = Uid::new(n).ok_or_else(|| Error::Parse {
                position: lexer.position(),
                message: "Invalid UID 0".to_string(),
            })?;
            ResponseCode::UidNext(uid)
        }
        "UIDVALIDITY" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            let validity = UidValidity::new(n).ok_or_else(|| Error::Parse {
                position: lexer.position(),
                message: "Invalid UIDVALIDITY 0".to_string(),
            })?;
            ResponseCode::UidValidity(validity)
        }
        "UNSEEN" => {
            lexer.expect_space()?;
            let n = lexer.read_number()?;
            let seq = SeqNum::new(n).ok_or_else(|| Error::Parse {
                position: lexer.position(),
                message: "Invalid sequence number 0".to_string(),
            })?;
            ResponseCode::Unseen(seq)
        }
        "CAPABILITY" => {
            let caps = parse_capability_data(lexer)?;
            ResponseCode::Capability(caps)
        }
        "PERMANENTFLAGS" => {
            lexer.expect_space()?;
            let flags = parse_flag_list(lexer)?;
            ResponseCode::PermanentFlags(flags.into_iter().collect())
        }
        _ => {
            // Unrecognized code: keep the atom, drop its arguments
            while lexer.peek() != Some(b']') && !lexer.is_eof() {
                lexer.advance();
            }
            ResponseCode::Unknown(atom.to_string())
        }
    };

    // Skip anything left before the closing bracket
    while lexer.peek() != Some(b']') && !lexer.is_eof() {
        lexer.advance();
    }
    lexer.expect(Token::RBracket)?;

    Ok(code)
}

/// Parses space-separated capability atoms.
pub fn parse_capability_data(lexer: &mut Lexer<'_>) -> Result<Vec<Capability>> {
    let mut caps = Vec::new();

    while lexer.peek() == Some(b' ') {
        lexer.advance();
        if let Token::Atom(s) = lexer.next_token()? {
            caps.push(Capability::parse(s));
        }
    }

    Ok(caps)
}

/// Parses a parenthesized flag list.
pub fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<Flags> {
    lexer.expect(Token::LParen)?;

    let mut flags = Flags::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Atom(s) => flags.insert(Flag::parse(s)),
            Token::Space => continue,
            token => {
                return Err(Error::Parse {
                    position: lexer.position(),
                    message: format!("Unexpected token in flag list: {token:?}"),
                });
            }
        }
    }

    Ok(flags)
}

/// Parses a LIST response: `(attrs) "delim" mailbox`.
pub fn parse_list_response(lexer: &mut Lexer<'_>) -> Result<ListResponse> {
    lexer.expect(Token::LParen)?;
    let mut attributes = Vec::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Atom(s) => attributes.push(MailboxAttribute::parse(s)),
            Token::Space => continue,
            token => {
                return Err(Error::Parse {
                    position: lexer.position(),
                    message: format!("Unexpected token in LIST attributes: {token:?}"),
                });
            }
        }
    }

    lexer.expect_space()?;

    let delimiter = match lexer.next_token()? {
        Token::Nil => None,
        Token::QuotedString(s) => s.chars().next(),
        token => {
            return Err(Error::Parse {
                position: lexer.position(),
                message: format!("Expected delimiter, got {token:?}"),
            });
        }
    };

    lexer.expect_space()?;

    // The mailbox name is the line's final astring; for a well-formed line
    // this is exactly the rightmost quoted token.
    let mailbox_name = lexer.read_astring()?;

    Ok(ListResponse {
        attributes,
        delimiter,
        mailbox: Mailbox::new(mailbox_name),
    })
}

/// Parses the numbers of a SEARCH response.
pub fn parse_search_response(lexer: &mut Lexer<'_>) -> Result<Vec<u32>> {
    let mut nums = Vec::new();

    while lexer.peek() == Some(b' ') {
        lexer.advance();
        if let Token::Number(n) = lexer.next_token()? {
            nums.push(n);
        }
    }

    Ok(nums)
}

/// Reads text until CRLF.
pub fn read_text_until_crlf(lexer: &mut Lexer<'_>) -> String {
    let remaining = lexer.remaining();

    let end = remaining
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(remaining.len());

    lexer.skip(end);
    if lexer.peek() == Some(b'\r') {
        lexer.skip(2);
    }

    String::from_utf8_lossy(&remaining[..end]).to_string()
}
