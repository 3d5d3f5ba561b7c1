//! CRC16/CCITT-FALSE checksum over the payload text.
//!
//! Parameters: polynomial `0x1021`, initial value `0xFFFF`, no input or
//! output reflection, no final XOR. The checksum is computed over the UTF-8
//! bytes of every payload character up to and including the `6304` prefix
//! of the checksum field itself.

use crate::{NamqrError, Result};
use ::crc::{Crc, CRC_16_IBM_3740};

/// Prefix of the checksum field: tag `63`, length `04`.
pub const CRC_PREFIX: &str = "6304";

/// Characters taken by the whole checksum field.
pub const CRC_FIELD_LEN: usize = 8;

/// CRC-16/CCITT-FALSE, catalogued as CRC-16/IBM-3740.
const NAMQR_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Compute CRC16/CCITT-FALSE over `bytes`.
///
/// ```
/// assert_eq!(namqr_lib::crc::crc16(b"123456789"), 0x29B1);
/// ```
pub fn crc16(bytes: &[u8]) -> u16 {
    NAMQR_CRC.checksum(bytes)
}

/// Render a checksum as four uppercase hex digits.
pub fn format_crc(crc: u16) -> String {
    format!("{crc:04X}")
}

/// Append the checksum field to a payload.
///
/// The result always passes [`verify_crc`].
pub fn append_crc(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len() + CRC_FIELD_LEN);
    out.push_str(payload);
    out.push_str(CRC_PREFIX);
    let crc = crc16(out.as_bytes());
    out.push_str(&format_crc(crc));
    out
}

/// Verify the trailing checksum field of `raw`.
///
/// # Errors
///
/// - [`NamqrError::MissingChecksum`] if `raw` does not end in `6304` plus
///   four hex digits
/// - [`NamqrError::ChecksumMismatch`] if the digits disagree with the
///   computed CRC (compared case-insensitively)
pub fn verify_crc(raw: &str) -> Result<()> {
    let (body, found) = split_trailer(raw).ok_or(NamqrError::MissingChecksum)?;

    let computed = crc16(body.as_bytes());
    let carried = u16::from_str_radix(found, 16).map_err(|_| NamqrError::MissingChecksum)?;
    if computed != carried {
        return Err(NamqrError::ChecksumMismatch {
            expected: format_crc(computed),
            found: found.to_string(),
        });
    }
    Ok(())
}

/// Split `raw` into the checksummed prefix (ending in `6304`) and the
/// four hex digits after it.
pub(crate) fn split_trailer(raw: &str) -> Option<(&str, &str)> {
    // The trailer is pure ASCII, so a char boundary sits four bytes from the end
    // whenever the last four characters are hex digits.
    if raw.len() < CRC_FIELD_LEN {
        return None;
    }
    let split = raw.len() - 4;
    if !raw.is_char_boundary(split) {
        return None;
    }
    let (body, digits) = raw.split_at(split);
    if !body.ends_with(CRC_PREFIX) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some((body, digits))
}
