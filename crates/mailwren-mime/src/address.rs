//! Email address extraction from header values.

/// Extracts the addr-spec from a single address header value.
///
/// `"Display Name" <user@example.com>` yields `user@example.com`; a bare
/// `user@example.com` passes through. Returns `None` when nothing
/// address-like is present; callers decide whether to fall back to the
/// raw value.
#[must_use]
pub fn parse_address(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(start) = raw.rfind('<') {
        let end = raw[start..].find('>')? + start;
        let addr = raw[start + 1..end].trim();
        if addr.is_empty() {
            return None;
        }
        return Some(addr.to_string());
    }

    if raw.contains('@') {
        return Some(raw.trim_matches('"').to_string());
    }

    None
}

/// Extracts addr-specs from a comma-separated address list.
///
/// Entries that carry no address are dropped.
#[must_use]
pub fn parse_address_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(parse_address)
        .collect()
}
