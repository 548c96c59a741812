//! Codepoint codec.
//!
//! Encodes and decodes single Unicode code points to and from UTF-8. The reader and
//! writer move text one code point at a time through this module; raw binary payloads
//! are the only bytes that bypass it.
//!
//! Decoding is table driven: the leading byte selects the sequence length from
//! [`UTF8_LENGTH`], the continuation bytes are folded in six bits at a time, and the
//! tag bits of the whole sequence are removed with a single subtraction of
//! [`UTF8_TAG`]. Continuation bytes are not checked for the `10xxxxxx` pattern.

use crate::{Error, Result};

/// Length of a UTF-8 sequence indexed by its leading byte. Zero marks a byte that
/// cannot start a sequence.
pub const UTF8_LENGTH: [u8; 256] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, //
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, //
    3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, //
    4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
];

/// Tag bits accumulated by a sequence of each length, removed with one subtraction.
pub const UTF8_TAG: [u32; 5] = [0x0000_0000, 0x0000_0000, 0x0000_3080, 0x000E_2080, 0x03C8_2080];

/// Largest code point representable in UTF-8.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// Returns the expected sequence length for a leading byte, or 0 if the byte
/// cannot start a sequence.
#[inline]
#[must_use]
pub fn sequence_length(lead: u8) -> usize {
    UTF8_LENGTH[lead as usize] as usize
}

/// Folds one continuation byte into a partially decoded sequence.
#[inline]
#[must_use]
pub fn accumulate(acc: u32, continuation: u8) -> u32 {
    (acc << 6).wrapping_add(continuation as u32)
}

/// Removes the tag bits of a fully accumulated sequence of `len` bytes.
#[inline]
#[must_use]
pub fn strip_tag(acc: u32, len: usize) -> u32 {
    acc.wrapping_sub(UTF8_TAG[len])
}

/// Encodes a code point into `buf`, returning the encoded bytes.
///
/// # Errors
///
/// Fails with [`Error::Encoding`] for values above `0x10FFFF`.
///
/// # Examples
///
/// ```rust
/// use sigma::utf8;
///
/// let mut buf = [0u8; 4];
/// assert_eq!(utf8::encode(0x20AC, &mut buf).unwrap(), &[0xE2, 0x82, 0xAC]);
/// assert!(utf8::encode(0x110000, &mut buf).is_err());
/// ```
pub fn encode(cp: u32, buf: &mut [u8; 4]) -> Result<&[u8]> {
    let len = if cp <= 0x7F {
        buf[0] = cp as u8;
        1
    } else if cp <= 0x7FF {
        buf[0] = (0xC0 | (cp >> 6)) as u8;
        buf[1] = (0x80 | (cp & 0x3F)) as u8;
        2
    } else if cp <= 0xFFFF {
        buf[0] = (0xE0 | (cp >> 12)) as u8;
        buf[1] = (0x80 | ((cp >> 6) & 0x3F)) as u8;
        buf[2] = (0x80 | (cp & 0x3F)) as u8;
        3
    } else if cp <= MAX_CODE_POINT {
        buf[0] = (0xF0 | (cp >> 18)) as u8;
        buf[1] = (0x80 | ((cp >> 12) & 0x3F)) as u8;
        buf[2] = (0x80 | ((cp >> 6) & 0x3F)) as u8;
        buf[3] = (0x80 | (cp & 0x3F)) as u8;
        4
    } else {
        return Err(Error::encoding(
            0,
            &format!("code point U+{:X} out of range for UTF-8 encoding", cp),
        ));
    };
    Ok(&buf[..len])
}

/// Decodes the code point at the start of `bytes`.
///
/// Returns `Ok(None)` for an empty slice (end of stream), otherwise the decoded
/// character and the number of bytes consumed.
///
/// # Errors
///
/// Fails with [`Error::Encoding`] for an invalid leading byte, a truncated sequence,
/// or a sequence that decodes to a surrogate or out-of-range value.
///
/// # Examples
///
/// ```rust
/// use sigma::utf8;
///
/// assert_eq!(utf8::decode("é!".as_bytes()).unwrap(), Some(('é', 2)));
/// assert_eq!(utf8::decode(&[]).unwrap(), None);
/// ```
pub fn decode(bytes: &[u8]) -> Result<Option<(char, usize)>> {
    let lead = match bytes.first() {
        Some(&b) => b,
        None => return Ok(None),
    };
    let len = sequence_length(lead);
    if len == 0 {
        return Err(Error::encoding(
            0,
            &format!("invalid UTF-8 leading byte 0x{:02X}", lead),
        ));
    }
    if bytes.len() < len {
        return Err(Error::encoding(bytes.len(), "truncated UTF-8 sequence"));
    }
    let acc = bytes[1..len]
        .iter()
        .fold(lead as u32, |acc, &b| accumulate(acc, b));
    let cp = strip_tag(acc, len);
    let ch = char::from_u32(cp)
        .ok_or_else(|| Error::encoding(0, &format!("invalid code point U+{:X}", cp)))?;
    Ok(Some((ch, len)))
}
