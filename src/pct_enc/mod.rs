//! Percent-encoding utilities.
//!
//! Unlike a strict validator, the functions here accept any text: an `%`
//! that does not start a well-formed escape is treated as a literal
//! percent sign, and bytes that do not form valid UTF-8 after decoding are
//! kept percent-encoded rather than replaced.

pub mod table;

pub use table::Table;

use alloc::{borrow::Cow, string::String, vec::Vec};
use core::str;
use unicode_normalization::UnicodeNormalization;

pub(crate) const fn decode_hexdigit(x: u8) -> Option<u8> {
    match x {
        b'0'..=b'9' => Some(x - b'0'),
        b'A'..=b'F' => Some(x - b'A' + 10),
        b'a'..=b'f' => Some(x - b'a' + 10),
        _ => None,
    }
}

/// Decodes the escape starting at `i`, if there is a well-formed one.
fn decode_escape(bytes: &[u8], i: usize) -> Option<u8> {
    match bytes.get(i..i + 3) {
        Some(&[b'%', hi, lo]) => Some(decode_hexdigit(hi)? << 4 | decode_hexdigit(lo)?),
        _ => None,
    }
}

pub(crate) fn encode_byte(x: u8) -> &'static str {
    const TABLE: &[u8; 256 * 3] = &{
        const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

        let mut i = 0;
        let mut table = [0; 256 * 3];
        while i < 256 {
            table[i * 3] = b'%';
            table[i * 3 + 1] = HEX_DIGITS[i >> 4];
            table[i * 3 + 2] = HEX_DIGITS[i & 0b1111];
            i += 1;
        }
        table
    };

    const TABLE_STR: &str = match str::from_utf8(TABLE) {
        Ok(s) => s,
        Err(_) => unreachable!(),
    };

    &TABLE_STR[x as usize * 3..x as usize * 3 + 3]
}

/// Returns the length of the run of escapes at `i` spelling one of the
/// characters in `leave_encoded`.
fn leave_len(bytes: &[u8], i: usize, leave_encoded: &str) -> Option<usize> {
    leave_encoded.chars().find_map(|ch| {
        let mut buf = [0; 4];
        let seq = ch.encode_utf8(&mut buf).as_bytes();
        seq.iter()
            .enumerate()
            .all(|(j, &x)| decode_escape(bytes, i + j * 3) == Some(x))
            .then_some(seq.len() * 3)
    })
}

/// Percent-decodes a string into bytes.
///
/// Escapes spelling a character in `leave_encoded` are kept verbatim,
/// and a `%` that does not start a well-formed escape is kept as is.
///
/// # Examples
///
/// ```
/// use fluid_uri::pct_enc::unencode;
///
/// assert_eq!(unencode("%%25~%7e+%2b", ""), b"%%~~++");
/// assert_eq!(unencode("%%25~%7e+%2b", "~"), b"%%~%7e++");
/// assert_eq!(unencode("%%25~%7e+%2b", "%~+"), b"%%25~%7e+%2b");
/// ```
#[must_use]
pub fn unencode(s: &str, leave_encoded: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(len) = leave_len(bytes, i, leave_encoded) {
                out.extend_from_slice(&bytes[i..i + len]);
                i += len;
                continue;
            }
            if let Some(x) = decode_escape(bytes, i) {
                out.push(x);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Percent-decodes a string, replacing invalid UTF-8 with `U+FFFD`.
///
/// See [`unencode`] for the handling of `leave_encoded`.
#[must_use]
pub fn unencode_component<'a>(s: &'a str, leave_encoded: &str) -> Cow<'a, str> {
    if !s.contains('%') {
        return Cow::Borrowed(s);
    }
    match String::from_utf8(unencode(s, leave_encoded)) {
        Ok(s) => Cow::Owned(s),
        Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

/// Width of the UTF-8 sequence introduced by `x`.
const fn utf8_width(x: u8) -> usize {
    match x {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}

fn next_char(bytes: &[u8], i: usize) -> Option<(char, usize)> {
    let width = utf8_width(bytes[i]);
    let seq = bytes.get(i..i + width).filter(|_| width != 0)?;
    let ch = str::from_utf8(seq).ok()?.chars().next()?;
    Some((ch, width))
}

/// Appends `bytes` to `buf`, percent-encoding everything `table` does not allow.
pub(crate) fn encode_bytes_to(buf: &mut String, bytes: &[u8], table: Table, leave_encoded: &str) {
    let mut i = 0;
    while i < bytes.len() {
        let x = bytes[i];
        if x == b'%' {
            if let Some(len) = leave_len(bytes, i, leave_encoded) {
                for seq in bytes[i..i + len].chunks(3) {
                    buf.push('%');
                    buf.push(seq[1].to_ascii_uppercase() as char);
                    buf.push(seq[2].to_ascii_uppercase() as char);
                }
                i += len;
                continue;
            }
        }

        if x < 128 {
            if table.allows_ascii(x) {
                buf.push(x as char);
            } else {
                buf.push_str(encode_byte(x));
            }
            i += 1;
        } else {
            match next_char(bytes, i) {
                Some((ch, len)) if table.allows(ch) => {
                    buf.push(ch);
                    i += len;
                }
                Some((_, len)) => {
                    for &y in &bytes[i..i + len] {
                        buf.push_str(encode_byte(y));
                    }
                    i += len;
                }
                None => {
                    buf.push_str(encode_byte(x));
                    i += 1;
                }
            }
        }
    }
}

/// Percent-encodes every character of `s` not allowed by `table`.
///
/// Existing escapes are not trusted: their `%` is itself encoded, unless
/// the escape spells a character in `leave_encoded`, in which case it is
/// kept with its hexadecimal digits uppercased.
///
/// # Examples
///
/// ```
/// use fluid_uri::pct_enc::{encode_component, table::{Table, UNRESERVED}};
///
/// assert_eq!(encode_component("one two/three", UNRESERVED, ""), "one%20two%2Fthree");
///
/// const CLASS: Table = Table::new(b"0123456789ABCDEFGHIKMNOPQRSTUVWXYZ");
/// assert_eq!(encode_component("JK%4c", CLASS, "L"), "%4AK%4C");
/// ```
#[must_use]
pub fn encode_component(s: &str, table: Table, leave_encoded: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    encode_bytes_to(&mut buf, s.as_bytes(), table, leave_encoded);
    buf
}

/// Appends the normalized form of `s` to `buf`.
pub(crate) fn normalize_component_to(buf: &mut String, s: &str, table: Table, leave_encoded: &str) {
    match String::from_utf8(unencode(s, leave_encoded)) {
        Ok(text) => {
            if unicode_normalization::is_nfc(&text) {
                encode_bytes_to(buf, text.as_bytes(), table, leave_encoded);
            } else {
                let text: String = text.nfc().collect();
                encode_bytes_to(buf, text.as_bytes(), table, leave_encoded);
            }
        }
        // Octets that are not UTF-8 are re-encoded one by one.
        Err(e) => encode_bytes_to(buf, e.as_bytes(), table, leave_encoded),
    }
}

/// Normalizes the percent-encoding of a component.
///
/// The component is decoded (except for escapes of characters in
/// `leave_encoded`), brought into Unicode Normalization Form C when it
/// decodes to UTF-8, and re-encoded under `table`. Octets that do not decode
/// to UTF-8 stay encoded, and a stray `%` becomes `%25`.
///
/// The result is stable: normalizing it again yields the same string.
///
/// # Examples
///
/// ```
/// use fluid_uri::pct_enc::{normalize_component, table::PCHAR};
///
/// assert_eq!(normalize_component("%7euser%2fC%CC%A7", PCHAR, ""), "~user%2F%C3%87");
/// assert_eq!(normalize_component("partially % encoded%21", PCHAR, ""), "partially%20%25%20encoded!");
/// assert_eq!(normalize_component("%E8", PCHAR, ""), "%E8");
/// ```
#[must_use]
pub fn normalize_component(s: &str, table: Table, leave_encoded: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    normalize_component_to(&mut buf, s, table, leave_encoded);
    buf
}
