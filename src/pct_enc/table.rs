//! Character classes from RFC 3986 and RFC 3987.
//!
//! The predefined table constants in this module are documented with
//! the ABNF notation of [RFC 5234].
//!
//! [RFC 5234]: https://datatracker.ietf.org/doc/html/rfc5234

use super::decode_hexdigit;

const MASK_PCT_ENCODED: u64 = 1 << b'%';
const MASK_UCSCHAR: u64 = 1;
const MASK_IPRIVATE: u64 = 2;
const MASK_UNENCODED_ASCII: u64 = !(MASK_PCT_ENCODED | MASK_UCSCHAR | MASK_IPRIVATE);

const fn is_ucschar(x: u32) -> bool {
    matches!(x, 0xa0..=0xd7ff | 0xf900..=0xfdcf | 0xfdf0..=0xffef)
        || (x >= 0x10000 && x <= 0xdffff && (x & 0xffff) <= 0xfffd)
        || (x >= 0xe1000 && x <= 0xefffd)
}

const fn is_iprivate(x: u32) -> bool {
    (x >= 0xe000 && x <= 0xf8ff) || (x >= 0xf0000 && (x & 0xffff) <= 0xfffd)
}

/// A character class: the set of characters a component may carry unencoded.
///
/// Encoding functions percent-encode every character outside the class.
/// Whether a class allows percent-encoded octets only matters to
/// [`validate`](Self::validate); encoding never trusts existing escapes
/// unless asked to leave them alone.
///
/// # Examples
///
/// ```
/// use fluid_uri::pct_enc::{encode_component, table::{Table, DIGIT}};
///
/// const DIGIT_OR_X: Table = DIGIT.or(Table::new(b"x"));
/// assert_eq!(encode_component("12x4y", DIGIT_OR_X, ""), "12x4%79");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Table(u64, u64);

impl Table {
    /// Creates a table that only allows the given unencoded bytes.
    ///
    /// # Panics
    ///
    /// Panics if any of the bytes is not ASCII or equals `0`, `1`, or `b'%'`.
    #[must_use]
    pub const fn new(mut bytes: &[u8]) -> Self {
        let mut table = 0;
        while let [cur, rem @ ..] = bytes {
            assert!(
                !matches!(cur, 0 | 1 | b'%' | 128..),
                "cannot allow non-ASCII byte, 0, 1, or %"
            );
            table |= 1u128.wrapping_shl(*cur as u32);
            bytes = rem;
        }
        Self(table as u64, (table >> 64) as u64)
    }

    /// Combines two tables into one.
    ///
    /// Returns a new table that allows all the characters allowed
    /// by `self` or by `other`.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0, self.1 | other.1)
    }

    /// Marks this table as allowing percent-encoded octets.
    #[must_use]
    pub const fn or_pct_encoded(self) -> Self {
        Self(self.0 | MASK_PCT_ENCODED, self.1)
    }

    /// Marks this table as allowing characters matching the [`ucschar`]
    /// ABNF rule from RFC 3987.
    ///
    /// [`ucschar`]: https://datatracker.ietf.org/doc/html/rfc3987#section-2.2
    #[must_use]
    pub const fn or_ucschar(self) -> Self {
        Self(self.0 | MASK_UCSCHAR, self.1)
    }

    /// Marks this table as allowing characters matching the [`iprivate`]
    /// ABNF rule from RFC 3987.
    ///
    /// [`iprivate`]: https://datatracker.ietf.org/doc/html/rfc3987#section-2.2
    #[must_use]
    pub const fn or_iprivate(self) -> Self {
        Self(self.0 | MASK_IPRIVATE, self.1)
    }

    /// Subtracts from this table.
    ///
    /// Returns a new table that allows all the characters allowed
    /// by `self` but not allowed by `other`.
    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        Self(self.0 & !other.0, self.1 & !other.1)
    }

    /// Checks whether the table is a subset of another.
    #[must_use]
    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & other.0 == self.0 && self.1 & other.1 == self.1
    }

    #[inline]
    pub(crate) const fn allows_ascii(self, x: u8) -> bool {
        let table = if x < 64 {
            self.0 & MASK_UNENCODED_ASCII
        } else if x < 128 {
            self.1
        } else {
            0
        };
        table & 1u64.wrapping_shl(x as u32) != 0
    }

    #[inline]
    const fn allows_code_point(self, x: u32) -> bool {
        if x < 128 {
            return self.allows_ascii(x as u8);
        }
        if self.0 & MASK_UCSCHAR != 0 && is_ucschar(x) {
            return true;
        }
        if self.0 & MASK_IPRIVATE != 0 && is_iprivate(x) {
            return true;
        }
        false
    }

    /// Checks whether the given unencoded character is allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows(self, ch: char) -> bool {
        self.allows_code_point(ch as u32)
    }

    /// Checks whether percent-encoded octets are allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows_pct_encoded(self) -> bool {
        self.0 & MASK_PCT_ENCODED != 0
    }

    /// Checks whether a string consists only of characters allowed by the
    /// table and, if the table allows them, well-formed percent-encoded octets.
    #[must_use]
    pub fn validate(self, s: &str) -> bool {
        let bytes = s.as_bytes();
        let mut iter = s.char_indices();
        while let Some((i, ch)) = iter.next() {
            if ch == '%' && self.allows_pct_encoded() {
                match bytes.get(i + 1..i + 3) {
                    Some(&[hi, lo])
                        if decode_hexdigit(hi).is_some() && decode_hexdigit(lo).is_some() =>
                    {
                        iter.nth(1);
                    }
                    _ => return false,
                }
            } else if !self.allows(ch) {
                return false;
            }
        }
        true
    }
}

const fn new(bytes: &[u8]) -> Table {
    Table::new(bytes)
}

// Rules from RFC 3986:

/// `ALPHA = %x41-5A / %x61-7A`
pub const ALPHA: Table = new(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");

/// `DIGIT = %x30-39`
pub const DIGIT: Table = new(b"0123456789");

/// `HEXDIG = DIGIT / "A" / "B" / "C" / "D" / "E" / "F"`
pub const HEXDIG: Table = DIGIT.or(new(b"ABCDEFabcdef"));

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub const SCHEME: Table = ALPHA.or(DIGIT).or(new(b"+-."));

/// `userinfo = *( unreserved / pct-encoded / sub-delims / ":" )`
pub const USERINFO: Table = UNRESERVED.or(SUB_DELIMS).or(new(b":")).or_pct_encoded();

/// `IPvFuture = "v" 1*HEXDIG "." 1*( unreserved / sub-delims / ":" )`
pub const IPV_FUTURE: Table = UNRESERVED.or(SUB_DELIMS).or(new(b":"));

/// `reg-name = *( unreserved / pct-encoded / sub-delims )`
pub const REG_NAME: Table = UNRESERVED.or(SUB_DELIMS).or_pct_encoded();

/// `path = *( pchar / "/" )`
pub const PATH: Table = PCHAR.or(new(b"/"));

/// `pchar = unreserved / pct-encoded / sub-delims / ":" / "@"`
pub const PCHAR: Table = UNRESERVED.or(SUB_DELIMS).or(new(b":@")).or_pct_encoded();

/// `segment = *pchar`
pub const SEGMENT: Table = PCHAR;

/// `query = *( pchar / "/" / "?" )`
pub const QUERY: Table = PCHAR.or(new(b"/?"));

/// `fragment = *( pchar / "/" / "?" )`
pub const FRAGMENT: Table = QUERY;

/// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"`
pub const UNRESERVED: Table = ALPHA.or(DIGIT).or(new(b"-._~"));

/// `reserved = gen-delims / sub-delims`
pub const RESERVED: Table = GEN_DELIMS.or(SUB_DELIMS);

/// `gen-delims = ":" / "/" / "?" / "#" / "[" / "]" / "@"`
pub const GEN_DELIMS: Table = new(b":/?#[]@");

/// `sub-delims = "!" / "$" / "&" / "'" / "(" / ")"
///             / "*" / "+" / "," / ";" / "="`
pub const SUB_DELIMS: Table = new(b"!$&'()*+,;=");

/// A single `key=value` pair of a query: `query` without `"&"` and `";"`.
///
/// `";"` is escaped because historical form encodings treat it as a pair
/// separator.
pub const QUERY_PAIR: Table = QUERY.sub(new(b"&;"));

// Rules from RFC 3987:

/// `iuserinfo = *( iunreserved / pct-encoded / sub-delims / ":" )`
pub const IUSERINFO: Table = USERINFO.or_ucschar();

/// `ireg-name = *( iunreserved / pct-encoded / sub-delims )`
pub const IREG_NAME: Table = REG_NAME.or_ucschar();

/// `ipath = *( ipchar / "/" )`
pub const IPATH: Table = PATH.or_ucschar();

/// `ipchar = iunreserved / pct-encoded / sub-delims / ":" / "@"`
pub const IPCHAR: Table = PCHAR.or_ucschar();

/// `iquery = *( ipchar / iprivate / "/" / "?" )`
pub const IQUERY: Table = QUERY.or_ucschar().or_iprivate();

/// `ifragment = *( ipchar / "/" / "?" )`
pub const IFRAGMENT: Table = FRAGMENT.or_ucschar();
