//! Tag primitives shared by every layer of the codec.
//!
//! A NAMQR tag is two ASCII digits (`"00"`–`"99"`). Internally it is kept as
//! a number so that ordering is numeric, but it always displays and
//! serializes as the two-digit string found on the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A two-digit TLV tag.
///
/// # Example
///
/// ```
/// use namqr_lib::Tag;
///
/// let tag: Tag = "26".parse().unwrap();
/// assert_eq!(tag.value(), 26);
/// assert_eq!(tag.to_string(), "26");
/// assert!(Tag::new(99).is_some());
/// assert!(Tag::new(100).is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u8);

impl Tag {
    /// The largest representable tag.
    pub const MAX: u8 = 99;

    /// Payload format indicator, always the first node.
    pub const PAYLOAD_FORMAT: Tag = Tag(0);

    /// The checksum tag. Must be the last root node.
    pub const CRC: Tag = Tag(63);

    /// Create a tag from its numeric value, if it is within `0..=99`.
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// The numeric value of this tag.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Parse a tag from two ASCII digit characters.
    pub(crate) fn from_digits(hi: char, lo: char) -> Option<Self> {
        let hi = hi.to_digit(10)?;
        let lo = lo.to_digit(10)?;
        Some(Self((hi * 10 + lo) as u8))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Error returned when a string is not a two-digit tag.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid tag '{0}': expected two ASCII digits")]
pub struct ParseTagError(pub String);

impl FromStr for Tag {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ParseTagError(s.to_string()));
        }
        Ok(Self((bytes[0] - b'0') * 10 + (bytes[1] - b'0')))
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An inclusive range of tags, used to declare composite (template) tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagRange {
    /// First tag in the range.
    pub start: Tag,
    /// Last tag in the range (inclusive).
    pub end: Tag,
}

impl TagRange {
    /// Create a range covering `start..=end`.
    ///
    /// Returns `None` if either bound is above 99 or `start > end`.
    pub const fn new(start: u8, end: u8) -> Option<Self> {
        if start > end || end > Tag::MAX {
            return None;
        }
        Some(Self {
            start: Tag(start),
            end: Tag(end),
        })
    }

    /// A range holding exactly one tag.
    pub const fn single(tag: Tag) -> Self {
        Self {
            start: tag,
            end: tag,
        }
    }

    /// Whether `tag` falls inside this range.
    pub fn contains(&self, tag: Tag) -> bool {
        self.start <= tag && tag <= self.end
    }
}

impl fmt::Display for TagRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Location of a field in the TLV tree: a root tag, or a child tag inside
/// a root template.
///
/// Displays as `"58"` for root fields and `"26.01"` for template children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    /// Enclosing root template, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Tag>,
    /// Tag of the field itself.
    pub tag: Tag,
}

impl FieldPath {
    /// A root-level field.
    pub const fn root(tag: Tag) -> Self {
        Self { parent: None, tag }
    }

    /// A child field of the template at `parent`.
    pub const fn child(parent: Tag, tag: Tag) -> Self {
        Self {
            parent: Some(parent),
            tag,
        }
    }

    /// Whether this path points at a root-level field.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl From<Tag> for FieldPath {
    fn from(tag: Tag) -> Self {
        Self::root(tag)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) => write!(f, "{}.{}", parent, self.tag),
            None => write!(f, "{}", self.tag),
        }
    }
}
