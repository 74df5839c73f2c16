//! Sequence sets for message ranges.

use super::{SeqNum, Uid};

/// Sequence set for specifying message ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceSet {
    /// Single sequence number.
    Single(SeqNum),
    /// Range of sequence numbers (inclusive).
    Range(SeqNum, SeqNum),
    /// All messages (*).
    All,
    /// Multiple sequence specifications.
    Set(Vec<Self>),
}

impl SequenceSet {
    /// Creates a sequence set from a single number.
    #[must_use]
    pub fn single(n: u32) -> Option<Self> {
        SeqNum::new(n).map(Self::Single)
    }

    /// Creates a range sequence set.
    #[must_use]
    pub fn range(start: u32, end: u32) -> Option<Self> {
        Some(Self::Range(SeqNum::new(start)?, SeqNum::new(end)?))
    }
}

impl std::fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
            Self::All => write!(f, "*"),
            Self::Set(items) => {
                let s: Vec<_> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", s.join(","))
            }
        }
    }
}

/// UID-based sequence set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UidSet {
    /// Single UID.
    Single(Uid),
    /// Range of UIDs (inclusive).
    Range(Uid, Uid),
    /// All messages.
    All,
    /// Multiple UID specifications.
    Set(Vec<Self>),
}

impl UidSet {
    /// Creates a UID set from a single UID.
    #[must_use]
    pub fn single(uid: Uid) -> Self {
        Self::Single(uid)
    }

    /// Creates a UID set from a range.
    #[must_use]
    pub fn range(start: Uid, end: Uid) -> Self {
        Self::Range(start, end)
    }

    /// Builds a comma-joined set from an explicit UID list.
    ///
    /// This is the shape the batch header fetch sends: one combined
    /// `UID FETCH 10,11,12 …` round trip.
    ///
    /// Returns `None` for an empty list (an empty UID set is not
    /// representable on the wire).
    #[must_use]
    pub fn from_uids(uids: &[Uid]) -> Option<Self> {
        match uids {
            [] => None,
            [single] => Some(Self::Single(*single)),
            many => Some(Self::Set(many.iter().map(|u| Self::Single(*u)).collect())),
        }
    }

    /// Converts this UID set to a sequence set for command serialization.
    ///
    /// UID commands reuse the sequence-set grammar with UID values; both
    /// wrap `NonZeroU32`, so the conversion is infallible.
    #[must_use]
    pub fn as_sequence_set(&self) -> SequenceSet {
        match self {
            Self::Single(uid) => SequenceSet::Single(SeqNum(uid.0)),
            Self::Range(start, end) => SequenceSet::Range(SeqNum(start.0), SeqNum(end.0)),
            Self::All => SequenceSet::All,
            Self::Set(items) => SequenceSet::Set(items.iter().map(Self::as_sequence_set).collect()),
        }
    }
}

impl std::fmt::Display for UidSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
            Self::All => write!(f, "*"),
            Self::Set(items) => {
                let s: Vec<_> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", s.join(","))
            }
        }
    }
}
