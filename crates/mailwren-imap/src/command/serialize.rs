//! Command serialization helpers.

use super::types::{FetchAttribute, SearchCriteria, StoreAction};

/// Writes an astring (atom or quoted string).
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if s.is_empty() || s.bytes().any(needs_quoting) {
        buf.push(b'"');
        for b in s.bytes() {
            if b == b'"' || b == b'\\' {
                buf.push(b'\\');
            }
            buf.push(b);
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

/// Returns true if the byte forces quoting in an astring.
const fn needs_quoting(b: u8) -> bool {
    matches!(b, b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*') || b < 0x20 || b == 0x7F
}

/// Writes a FETCH attribute list, parenthesized when more than one.
pub fn write_fetch_attributes(buf: &mut Vec<u8>, attrs: &[FetchAttribute]) {
    if let [single] = attrs {
        buf.extend_from_slice(single.as_str().as_bytes());
        return;
    }

    buf.push(b'(');
    for (i, attr) in attrs.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        buf.extend_from_slice(attr.as_str().as_bytes());
    }
    buf.push(b')');
}

/// Writes a STORE action.
pub fn write_store_action(buf: &mut Vec<u8>, action: &StoreAction, silent: bool) {
    let (prefix, flags) = match action {
        StoreAction::SetFlags(f) => ("FLAGS", f),
        StoreAction::AddFlags(f) => ("+FLAGS", f),
        StoreAction::RemoveFlags(f) => ("-FLAGS", f),
    };

    buf.extend_from_slice(prefix.as_bytes());
    if silent {
        buf.extend_from_slice(b".SILENT");
    }
    buf.extend_from_slice(b" (");
    for (i, flag) in flags.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        buf.extend_from_slice(flag.as_str().as_bytes());
    }
    buf.push(b')');
}

/// Writes SEARCH criteria.
pub fn write_search_criteria(buf: &mut Vec<u8>, criteria: &SearchCriteria) {
    let keyword: &[u8] = match criteria {
        SearchCriteria::All => b"ALL",
        SearchCriteria::Unseen => b"UNSEEN",
        SearchCriteria::Deleted => b"DELETED",
    };
    buf.extend_from_slice(keyword);
}
