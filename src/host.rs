//! Conversion of internationalized host names.
//!
//! Host names are converted label by label: a label with non-ASCII
//! characters is brought into Normalization Form KC, lowercased and
//! encoded with Punycode behind the `xn--` prefix, while ASCII labels are
//! only lowercased. The conversion back to Unicode never fails: labels
//! that are not valid Punycode are left as they are.

use alloc::string::String;
use idna::punycode;
use unicode_normalization::UnicodeNormalization;

const ACE_PREFIX: &str = "xn--";

/// Converts a host name to its ASCII-compatible form.
///
/// # Examples
///
/// ```
/// use fluid_uri::host::to_ascii;
///
/// assert_eq!(to_ascii("www.\u{8a79}\u{59c6}\u{65af}.com"), "www.xn--8ws00zhy3a.com");
/// assert_eq!(to_ascii("WWW.Example.COM"), "www.example.com");
/// ```
#[must_use]
pub fn to_ascii(host: &str) -> String {
    let mut buf = String::with_capacity(host.len());
    for (i, label) in host.split('.').enumerate() {
        if i > 0 {
            buf.push('.');
        }
        label_to_ascii(&mut buf, label);
    }
    buf
}

fn label_to_ascii(buf: &mut String, label: &str) {
    if label.is_ascii() {
        buf.extend(label.chars().map(|c| c.to_ascii_lowercase()));
        return;
    }

    let folded: String = label.nfkc().flat_map(char::to_lowercase).collect();
    if folded.is_ascii() {
        buf.push_str(&folded);
        return;
    }
    match punycode::encode_str(&folded) {
        Some(encoded) => {
            buf.push_str(ACE_PREFIX);
            buf.push_str(&encoded);
        }
        None => {
            tracing::debug!(label, "label could not be encoded with punycode");
            buf.push_str(&folded);
        }
    }
}

/// Converts a host name to its Unicode form for display.
///
/// # Examples
///
/// ```
/// use fluid_uri::host::to_display;
///
/// assert_eq!(to_display("www.xn--8ws00zhy3a.com"), "www.\u{8a79}\u{59c6}\u{65af}.com");
/// assert_eq!(to_display("xn--bad-!"), "xn--bad-!");
/// ```
#[must_use]
pub fn to_display(host: &str) -> String {
    let mut buf = String::with_capacity(host.len());
    for (i, label) in host.split('.').enumerate() {
        if i > 0 {
            buf.push('.');
        }
        let decoded = label
            .get(..ACE_PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(ACE_PREFIX))
            .and_then(|_| punycode::decode_to_string(&label[ACE_PREFIX.len()..]));
        match decoded {
            Some(decoded) => buf.push_str(&decoded),
            None => buf.push_str(label),
        }
    }
    if unicode_normalization::is_nfc(&buf) {
        buf
    } else {
        buf.nfc().collect()
    }
}
