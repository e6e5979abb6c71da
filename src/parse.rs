use crate::{
    component::{Host, Scheme},
    error::{Error, Result},
    pct_enc::{
        self,
        table::{self, Table},
    },
    Uri,
};
use alloc::string::{String, ToString};

/// Returns immediately with an [`InvalidUri`] error.
///
/// [`InvalidUri`]: crate::ErrorKind::InvalidUri
macro_rules! err {
    ($index:expr, $msg:expr) => {
        return Err(Error::invalid_at($index, $msg))
    };
}

/// Byte offsets of the generic components of a URI reference.
///
/// Components are split the way Appendix B of RFC 3986 splits them: the
/// split never fails, and the characters inside a component are not
/// checked. Only the scheme, host and port are validated afterwards.
#[derive(Clone, Copy, Debug, Default)]
struct Meta {
    scheme_end: Option<usize>,
    auth_bounds: Option<(usize, usize)>,
    path_bounds: (usize, usize),
    query_bounds: Option<(usize, usize)>,
    fragment_start: Option<usize>,
}

/// Reader over the bytes of a URI reference or one of its components.
///
/// # Invariants
///
/// `pos <= len`, `pos` is non-decreasing and on a character boundary
/// whenever it stops on a non-ASCII byte.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

enum Seg {
    // *1":" 1*4HEXDIG
    Normal(u16, bool),
    // "::"
    Ellipsis,
    // *1":" 1*4HEXDIG "."
    MaybeV4(bool),
    // ":"
    SingleColon,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn has_remaining(&self) -> bool {
        self.pos < self.len()
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    // Any call to this method must keep the invariants.
    fn skip(&mut self, n: usize) {
        self.pos += n;
        debug_assert!(self.pos <= self.len());
    }

    /// Skips to the first byte in `delims`, or to the end.
    fn skip_until(&mut self, delims: &[u8]) {
        let n = self.bytes[self.pos..]
            .iter()
            .position(|x| delims.contains(x))
            .unwrap_or(self.len() - self.pos);
        self.skip(n);
    }

    /// Reads ASCII bytes allowed by `table`, returning whether any was read.
    fn read(&mut self, table: Table) -> bool {
        let start = self.pos;
        while self.peek(0).is_some_and(|x| table.allows_ascii(x)) {
            self.skip(1);
        }
        self.pos > start
    }

    fn read_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    pub(crate) fn read_v6(&mut self) -> Option<[u16; 8]> {
        let mut segs = [0; 8];
        let mut ellipsis_idx = 8;

        let mut i = 0;
        while i < 8 {
            match self.read_v6_segment() {
                Some(Seg::Normal(seg, colon)) => {
                    if colon == (i == 0 || i == ellipsis_idx) {
                        // Leading colon, triple colons, or no colon.
                        return None;
                    }
                    segs[i] = seg;
                    i += 1;
                }
                Some(Seg::Ellipsis) => {
                    if ellipsis_idx != 8 {
                        // Multiple ellipses.
                        return None;
                    }
                    ellipsis_idx = i;
                }
                Some(Seg::MaybeV4(colon)) => {
                    if i > 6 || colon == (i == ellipsis_idx) {
                        // Not enough space, triple colons, or no colon.
                        return None;
                    }
                    let octets = self.read_v4()?.to_be_bytes();
                    segs[i] = u16::from_be_bytes([octets[0], octets[1]]);
                    segs[i + 1] = u16::from_be_bytes([octets[2], octets[3]]);
                    i += 2;
                    break;
                }
                Some(Seg::SingleColon) => return None,
                None => break,
            }
        }

        if ellipsis_idx == 8 {
            // No ellipsis.
            if i != 8 {
                // Too short.
                return None;
            }
        } else if i == 8 {
            // Eliding nothing.
            return None;
        } else {
            // Shift the segments after the ellipsis to the right.
            for j in (ellipsis_idx..i).rev() {
                segs[8 - (i - j)] = segs[j];
                segs[j] = 0;
            }
        }

        Some(segs)
    }

    fn read_v6_segment(&mut self) -> Option<Seg> {
        let colon = self.read_str(":");
        let Some(first) = self.peek(0) else {
            return colon.then_some(Seg::SingleColon);
        };

        let mut x = match pct_enc::decode_hexdigit(first) {
            Some(v) => v as u16,
            _ => {
                return colon.then(|| {
                    if first == b':' {
                        self.skip(1);
                        Seg::Ellipsis
                    } else {
                        Seg::SingleColon
                    }
                });
            }
        };
        let mut i = 1;

        while i < 4 {
            let Some(b) = self.peek(i) else {
                self.skip(i);
                return None;
            };
            match pct_enc::decode_hexdigit(b) {
                Some(v) => {
                    x = (x << 4) | v as u16;
                    i += 1;
                }
                _ if b == b'.' => return Some(Seg::MaybeV4(colon)),
                _ => break,
            }
        }
        self.skip(i);
        Some(Seg::Normal(x, colon))
    }

    pub(crate) fn read_v4(&mut self) -> Option<u32> {
        let mut addr = self.read_v4_octet()? << 24;
        for i in (0..3).rev() {
            if !self.read_str(".") {
                return None;
            }
            addr |= self.read_v4_octet()? << (i * 8);
        }
        Some(addr)
    }

    fn read_v4_octet(&mut self) -> Option<u32> {
        let mut res = self.peek_digit(0)?;
        if res == 0 {
            self.skip(1);
            return Some(0);
        }

        for i in 1..3 {
            let Some(x) = self.peek_digit(i) else {
                self.skip(i);
                return Some(res);
            };
            res = res * 10 + x;
        }
        self.skip(3);

        u8::try_from(res).is_ok().then_some(res)
    }

    fn peek_digit(&self, i: usize) -> Option<u32> {
        self.peek(i).and_then(|x| (x as char).to_digit(10))
    }

    fn read_ipv_future(&mut self) -> Result<()> {
        if let Some(b'v' | b'V') = self.peek(0) {
            self.skip(1);
            if self.read(table::HEXDIG) && self.read_str(".") && self.read(table::IPV_FUTURE) {
                return Ok(());
            }
        }
        err!(self.pos, "invalid IPvFuture address");
    }

    fn read_ip_literal(&mut self) -> Result<Host> {
        let start = self.pos;
        self.skip(1);

        let literal_start = self.pos;
        let kind: fn(String) -> Host = if self.read_v6().is_some() {
            Host::Ipv6
        } else if self.pos == literal_start {
            self.read_ipv_future()?;
            Host::IpvFuture
        } else {
            err!(literal_start, "invalid IPv6 address");
        };

        if !self.read_str("]") {
            err!(self.pos, "unexpected character in IP literal");
        }
        if self.has_remaining() {
            err!(self.pos, "unexpected character after IP literal");
        }
        Ok(kind(bytes_to_string(&self.bytes[start..])))
    }

    fn read_v4_or_reg_name(&mut self) -> Result<Host> {
        if self.read_v4().is_some() && !self.has_remaining() {
            return Ok(Host::Ipv4(bytes_to_string(self.bytes)));
        }
        self.pos = 0;

        // Reg-names are accepted leniently: everything but delimiters,
        // whitespace and controls, so that unencoded IRIs pass.
        while let Some(x) = self.peek(0) {
            if x.is_ascii_control()
                || x == b' '
                || matches!(x, b'<' | b'>' | b'{' | b'}' | b'/' | b'?' | b'#' | b'@' | b'[' | b']')
            {
                err!(self.pos, "invalid character in host");
            }
            self.skip(1);
        }
        Ok(Host::RegName(bytes_to_string(self.bytes)))
    }
}

fn bytes_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Classifies and validates a host.
///
/// Error indexes are relative to the start of `s`.
pub(crate) fn parse_host(s: &str) -> Result<Host> {
    let mut reader = Reader::new(s.as_bytes());
    if s.starts_with('[') {
        reader.read_ip_literal()
    } else {
        reader.read_v4_or_reg_name()
    }
}

/// Parses a port, percent-decoding it first. An empty port is absent.
pub(crate) fn parse_port(s: &str) -> Result<Option<u16>> {
    let decoded = pct_enc::unencode_component(s, "");
    if decoded.is_empty() {
        return Ok(None);
    }
    if let Some(i) = decoded.bytes().position(|x| !x.is_ascii_digit()) {
        err!(i, "invalid port number");
    }
    match decoded.parse::<u16>() {
        Ok(port) => Ok(Some(port)),
        Err(_) => err!(0, "port number out of range"),
    }
}

/// Splits the authority into userinfo, host and port, returning the
/// offset of the host along with them.
///
/// Userinfo ends at the last `@` before any bracket; the port is the part
/// after the last `:` that is not followed by `@`, `[` or `]`.
pub(crate) fn split_authority(s: &str) -> (Option<&str>, usize, &str, Option<&str>) {
    let limit = s.find(['[', ']']).unwrap_or(s.len());
    let (userinfo, host_start) = match s[..limit].rfind('@') {
        Some(i) => (Some(&s[..i]), i + 1),
        None => (None, 0),
    };

    let rest = &s[host_start..];
    match rest.rfind(':') {
        Some(i) if !rest[i + 1..].contains(['@', '[', ']']) => {
            (userinfo, host_start, &rest[..i], Some(&rest[i + 1..]))
        }
        _ => (userinfo, host_start, rest, None),
    }
}

/// Splits userinfo at the first `:` into user and password.
pub(crate) fn split_userinfo(s: &str) -> (&str, Option<&str>) {
    match s.split_once(':') {
        Some((user, password)) => (user, Some(password)),
        None => (s, None),
    }
}

impl Reader<'_> {
    fn split(&mut self) -> Meta {
        let mut out = Meta::default();

        // A scheme is whatever precedes the first ":", provided that no
        // "/", "?" or "#" comes before it.
        self.skip_until(b":/?#");
        if self.pos > 0 && self.peek(0) == Some(b':') {
            out.scheme_end = Some(self.pos);
            self.skip(1);
        } else {
            self.pos = 0;
        }

        if self.read_str("//") {
            let start = self.pos;
            self.skip_until(b"/?#");
            out.auth_bounds = Some((start, self.pos));
        }

        let path_start = self.pos;
        self.skip_until(b"?#");
        out.path_bounds = (path_start, self.pos);

        if self.read_str("?") {
            let start = self.pos;
            self.skip_until(b"#");
            out.query_bounds = Some((start, self.pos));
        }

        if self.read_str("#") {
            out.fragment_start = Some(self.pos);
        }
        out
    }
}

/// Splits a site (`[scheme ":"] ["//" authority]`) into its scheme and
/// authority, returning `None` if anything follows the authority.
pub(crate) fn split_site(s: &str) -> Option<(Option<&str>, Option<&str>)> {
    let meta = Reader::new(s.as_bytes()).split();
    let (path_start, path_end) = meta.path_bounds;
    if path_start != path_end || meta.query_bounds.is_some() || meta.fragment_start.is_some() {
        return None;
    }
    let scheme = meta.scheme_end.map(|end| &s[..end]);
    let authority = meta.auth_bounds.map(|(start, end)| &s[start..end]);
    Some((scheme, authority))
}

pub(crate) fn parse(s: &str) -> Result<Uri> {
    let meta = Reader::new(s.as_bytes()).split();
    let mut uri = Uri::new();

    if let Some(end) = meta.scheme_end {
        let scheme = &s[..end];
        if Scheme::new(scheme).is_none() {
            err!(0, "invalid scheme");
        }
        uri.scheme = Some(scheme.to_string());
    }

    if let Some((start, end)) = meta.auth_bounds {
        let (userinfo, host_start, host, port) = split_authority(&s[start..end]);
        if let Some(userinfo) = userinfo {
            let (user, password) = split_userinfo(userinfo);
            uri.user = Some(user.to_string());
            uri.password = password.map(ToString::to_string);
        }
        uri.host = Some(parse_host(host).map_err(|e| e.offset(start + host_start))?);
        if let Some(port) = port {
            let port_start = start + host_start + host.len() + 1;
            uri.port = parse_port(port).map_err(|e| e.offset(port_start))?;
        }
    }

    let (path_start, path_end) = meta.path_bounds;
    uri.path = s[path_start..path_end].to_string();
    uri.query = meta.query_bounds.map(|(start, end)| s[start..end].to_string());
    uri.fragment = meta.fragment_start.map(|start| s[start..].to_string());

    uri.validate()?;
    Ok(uri)
}
