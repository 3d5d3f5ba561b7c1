use super::TlvNode;
use crate::tag::Tag;
use crate::{NamqrError, Result};

/// Split `input` into a flat sequence of leaf nodes.
///
/// Offsets and lengths count characters, not bytes. The input must be
/// consumed exactly: any trailing partial node is an error. An empty input
/// yields an empty sequence; callers decide whether that is acceptable
/// (template values may legitimately be empty, whole payloads may not).
///
/// # Errors
///
/// - [`NamqrError::TruncatedTag`] if one character is left where a tag starts
/// - [`NamqrError::InvalidTag`] if the tag is not two ASCII digits
/// - [`NamqrError::TruncatedLength`] if fewer than two characters follow the tag
/// - [`NamqrError::InvalidLengthDigits`] if the length is not two ASCII digits
/// - [`NamqrError::TruncatedValue`] if fewer characters remain than declared
///
/// # Example
///
/// ```
/// use namqr_lib::tlv::tokenize;
///
/// let nodes = tokenize("000201010211").unwrap();
/// assert_eq!(nodes.len(), 2);
/// assert_eq!(nodes[1].as_leaf(), Some("11"));
/// ```
pub fn tokenize(input: &str) -> Result<Vec<TlvNode>> {
    let chars: Vec<char> = input.chars().collect();
    let mut nodes = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let remaining = chars.len() - pos;
        if remaining < 2 {
            return Err(NamqrError::TruncatedTag { offset: pos });
        }
        let tag = Tag::from_digits(chars[pos], chars[pos + 1])
            .ok_or(NamqrError::InvalidTag { offset: pos })?;

        let length_at = pos + 2;
        if chars.len() - length_at < 2 {
            return Err(NamqrError::TruncatedLength { offset: length_at });
        }
        let declared = parse_length(chars[length_at], chars[length_at + 1])
            .ok_or(NamqrError::InvalidLengthDigits { offset: length_at })?;

        let value_at = length_at + 2;
        let available = chars.len() - value_at;
        if available < declared {
            return Err(NamqrError::TruncatedValue {
                offset: value_at,
                declared,
                available,
            });
        }

        let value: String = chars[value_at..value_at + declared].iter().collect();
        nodes.push(TlvNode::leaf(tag, value));
        pos = value_at + declared;
    }

    Ok(nodes)
}

fn parse_length(hi: char, lo: char) -> Option<usize> {
    if !hi.is_ascii_digit() || !lo.is_ascii_digit() {
        return None;
    }
    let hi = hi.to_digit(10)? as usize;
    let lo = lo.to_digit(10)? as usize;
    Some(hi * 10 + lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_flat_payload() {
        let nodes = tokenize("0002015303516540525.00").unwrap();
        let tags: Vec<String> = nodes.iter().map(|n| n.tag.to_string()).collect();
        assert_eq!(tags, vec!["00", "53", "54"]);
        assert_eq!(nodes[2].as_leaf(), Some("25.00"));
    }

    #[test]
    fn test_tokenize_empty_value() {
        let nodes = tokenize("6200").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].as_leaf(), Some(""));
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_truncated_tag() {
        assert_eq!(
            tokenize("0002010").unwrap_err(),
            NamqrError::TruncatedTag { offset: 6 }
        );
    }

    #[test]
    fn test_truncated_length() {
        assert_eq!(
            tokenize("00020101").unwrap_err(),
            NamqrError::TruncatedLength { offset: 8 }
        );
        assert_eq!(
            tokenize("000201010").unwrap_err(),
            NamqrError::TruncatedLength { offset: 8 }
        );
    }

    #[test]
    fn test_invalid_length_digits() {
        assert_eq!(
            tokenize("00A201").unwrap_err(),
            NamqrError::InvalidLengthDigits { offset: 2 }
        );
        assert_eq!(
            tokenize("00+101").unwrap_err(),
            NamqrError::InvalidLengthDigits { offset: 2 }
        );
    }

    #[test]
    fn test_invalid_tag() {
        assert_eq!(
            tokenize("X00201").unwrap_err(),
            NamqrError::InvalidTag { offset: 0 }
        );
    }

    #[test]
    fn test_truncated_value() {
        assert_eq!(
            tokenize("5910Joe's").unwrap_err(),
            NamqrError::TruncatedValue {
                offset: 4,
                declared: 10,
                available: 5,
            }
        );
    }

    #[test]
    fn test_lengths_count_characters() {
        // "Café" is four characters but five bytes.
        let nodes = tokenize("5904Café6002NA").unwrap();
        assert_eq!(nodes[0].as_leaf(), Some("Café"));
        assert_eq!(nodes[1].as_leaf(), Some("NA"));
    }
}
