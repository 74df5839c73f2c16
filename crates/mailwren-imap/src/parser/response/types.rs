//! Response data types.

use crate::types::{Flags, SeqNum, Uid};

/// FETCH response item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// Message flags.
    Flags(Flags),
    /// UID.
    Uid(Uid),
    /// RFC822.HEADER raw header block.
    Rfc822Header(Vec<u8>),
    /// RFC822 full message.
    Rfc822(Vec<u8>),
    /// BODY[section] data. Servers answering an `RFC822` request with the
    /// equivalent `BODY[]` shape land here.
    Body {
        /// Section specifier (empty section is the full message).
        section: Option<String>,
        /// Body data (NIL for a missing section).
        data: Option<Vec<u8>>,
    },
}

impl FetchItem {
    /// Returns the message payload bytes, however the server framed them.
    #[must_use]
    pub fn message_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Rfc822(data) => Some(data),
            Self::Body {
                data: Some(data), ..
            } => Some(data),
            _ => None,
        }
    }
}

/// Untagged response data.
#[derive(Debug, Clone, PartialEq)]
pub enum UntaggedResponse {
    /// OK response with optional code.
    Ok {
        /// Optional response code.
        code: Option<crate::types::ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// NO response.
    No {
        /// Optional response code.
        code: Option<crate::types::ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// BAD response.
    Bad {
        /// Optional response code.
        code: Option<crate::types::ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// PREAUTH greeting.
    PreAuth {
        /// Optional response code.
        code: Option<crate::types::ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// BYE response.
    Bye {
        /// Optional response code.
        code: Option<crate::types::ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// CAPABILITY response.
    Capability(Vec<crate::types::Capability>),
    /// LIST response.
    List(crate::types::ListResponse),
    /// FLAGS response.
    Flags(Flags),
    /// EXISTS response (message count).
    Exists(u32),
    /// RECENT response.
    Recent(u32),
    /// EXPUNGE response (message removed).
    Expunge(SeqNum),
    /// FETCH response.
    Fetch {
        /// Message sequence number.
        seq: SeqNum,
        /// Fetch data items.
        items: Vec<FetchItem>,
    },
    /// SEARCH response. The numbers are UIDs for `UID SEARCH` and sequence
    /// numbers otherwise; only the issuing command knows which.
    Search(Vec<u32>),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Flag;

    #[test]
    fn fetch_item_message_bytes() {
        let rfc822 = FetchItem::Rfc822(b"raw".to_vec());
        assert_eq!(rfc822.message_bytes(), Some(b"raw".as_slice()));

        let body = FetchItem::Body {
            section: Some(String::new()),
            data: Some(b"raw".to_vec()),
        };
        assert_eq!(body.message_bytes(), Some(b"raw".as_slice()));

        let nil_body = FetchItem::Body {
            section: None,
            data: None,
        };
        assert!(nil_body.message_bytes().is_none());

        let flags = FetchItem::Flags(Flags::from_vec(vec![Flag::Seen]));
        assert!(flags.message_bytes().is_none());

        let uid = FetchItem::Uid(Uid::new(1).unwrap());
        assert!(uid.message_bytes().is_none());
    }
}
