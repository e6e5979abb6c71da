//! Module for normalization.

use crate::{
    component::{Host, Scheme},
    error::{Error, Result},
    host, parse,
    pct_enc::{
        self,
        table::{self, Table},
    },
    resolve::remove_dot_segments,
    uri::first_segment_has_colon,
    Uri,
};
use alloc::{
    borrow::ToOwned,
    format,
    string::{String, ToString},
};
use unicode_normalization::UnicodeNormalization;

/// Characters of a user or password that need no encoding.
const USER: Table = table::UNRESERVED.or(table::SUB_DELIMS);

/// A configurable URI normalizer.
///
/// # Examples
///
/// ```
/// use fluid_uri::{normalize::Normalizer, Uri};
///
/// let uri = Uri::parse("HTTP://www.\u{8a79}\u{59c6}\u{65af}.com:80/")?;
/// assert_eq!(Normalizer::new().normalize(&uri).to_string(), "http://www.xn--8ws00zhy3a.com/");
/// assert_eq!(
///     Normalizer::new().idna(false).normalize(&uri).to_string(),
///     "http://www.\u{8a79}\u{59c6}\u{65af}.com/"
/// );
/// # Ok::<_, fluid_uri::Error>(())
/// ```
#[derive(Clone, Copy)]
#[allow(missing_debug_implementations)]
#[must_use]
pub struct Normalizer {
    default_port_f: fn(&Scheme) -> Option<u16>,
    idna: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Creates a new `Normalizer` with default configuration.
    pub fn new() -> Self {
        Self {
            default_port_f: Scheme::default_port,
            idna: true,
        }
    }

    /// Sets the function with which to get the default port of a scheme.
    ///
    /// This defaults to [`Scheme::default_port`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::{component::Scheme, normalize::Normalizer, Uri};
    ///
    /// const SCHEME_FOO: &Scheme = Scheme::new_or_panic("foo");
    ///
    /// let normalizer = Normalizer::new().default_port_with(|scheme| {
    ///     if scheme == SCHEME_FOO {
    ///         Some(4673)
    ///     } else {
    ///         scheme.default_port()
    ///     }
    /// });
    /// let uri = Uri::parse("foo://localhost:4673")?;
    ///
    /// assert_eq!(normalizer.normalize(&uri).to_string(), "foo://localhost/");
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    pub fn default_port_with(mut self, f: fn(&Scheme) -> Option<u16>) -> Self {
        self.default_port_f = f;
        self
    }

    /// Sets whether to convert internationalized host names to Punycode.
    ///
    /// This defaults to `true`. When set to `false`, non-ASCII characters
    /// of a registered name are kept as they are.
    pub fn idna(mut self, value: bool) -> Self {
        self.idna = value;
        self
    }

    /// Normalizes the given URI.
    ///
    /// See [`Uri::normalize`] for the exact behavior of this method.
    #[must_use]
    pub fn normalize(&self, uri: &Uri) -> Uri {
        if let Some(inner) = feed_inner(uri) {
            return self.normalize(&inner);
        }

        let host = self.host(uri).map(|text| {
            parse::parse_host(&text).unwrap_or(Host::RegName(text))
        });
        let mut out = Uri {
            scheme: self.scheme(uri),
            user: self.user(uri),
            password: self.password(uri),
            port: self.port(uri),
            path: String::new(),
            query: self.query(uri),
            fragment: self.fragment(uri),
            host,
            frozen: false,
        };
        if out.password.is_some() && out.user.is_none() {
            out.user = Some(String::new());
        }
        out.path = self.path(uri);
        out
    }

    fn scheme(&self, uri: &Uri) -> Option<String> {
        let scheme = uri.scheme.as_deref()?;
        if scheme.eq_ignore_ascii_case("ssh+svn") {
            return Some("svn+ssh".to_owned());
        }
        Some(scheme.to_ascii_lowercase())
    }

    fn user(&self, uri: &Uri) -> Option<String> {
        let user = uri.user.as_deref()?.trim();
        let password_empty = uri.password.as_deref().map_or(true, |p| p.trim().is_empty());
        if user.is_empty() && password_empty {
            return None;
        }
        Some(pct_enc::normalize_component(user, table::UNRESERVED, ""))
    }

    fn password(&self, uri: &Uri) -> Option<String> {
        let password = uri.password.as_deref()?.trim();
        let user_empty = uri.user.as_deref().map_or(true, |u| u.trim().is_empty());
        if password.is_empty() && user_empty {
            return None;
        }
        Some(pct_enc::normalize_component(password, table::UNRESERVED, ""))
    }

    fn host(&self, uri: &Uri) -> Option<String> {
        let host = uri.host.as_ref()?;
        let text = host.as_str().trim();
        if text.is_empty() {
            return Some(String::new());
        }
        if !matches!(host, Host::RegName(_)) {
            return Some(text.to_ascii_lowercase());
        }

        let mut out = match String::from_utf8(pct_enc::unencode(text, "")) {
            Ok(decoded) if self.idna => {
                pct_enc::encode_component(&host::to_ascii(&decoded), table::REG_NAME, "")
            }
            Ok(decoded) => {
                let folded: String = decoded.to_lowercase().nfc().collect();
                pct_enc::encode_component(&folded, table::IREG_NAME, "")
            }
            // Octets that are not UTF-8 stay encoded; lowercasing the raw
            // bytes keeps the hex digits of their escapes uppercase.
            Err(e) => {
                let mut bytes = e.into_bytes();
                bytes.make_ascii_lowercase();
                let allowed = if self.idna { table::REG_NAME } else { table::IREG_NAME };
                let mut buf = String::new();
                pct_enc::encode_bytes_to(&mut buf, &bytes, allowed, "");
                buf
            }
        };
        // A single trailing dot is unnecessary.
        let bytes = out.as_bytes();
        if bytes.len() >= 2 && bytes[bytes.len() - 1] == b'.' && bytes[bytes.len() - 2] != b'.' {
            out.pop();
        }
        Some(out)
    }

    fn port(&self, uri: &Uri) -> Option<u16> {
        let port = uri.port?;
        let default = self
            .scheme(uri)
            .and_then(|s| Scheme::new(&s).and_then(self.default_port_f));
        (default != Some(port)).then_some(port)
    }

    fn path(&self, uri: &Uri) -> String {
        let path = uri.path.trim();
        let mut buf = String::with_capacity(path.len());
        for (i, seg) in path.split('/').enumerate() {
            if i > 0 {
                buf.push('/');
            }
            pct_enc::normalize_component_to(&mut buf, seg, table::PCHAR, "");
        }
        let mut path = remove_dot_segments(&buf);

        if uri.scheme.is_none() && uri.host.is_none() && first_segment_has_colon(&path) {
            // Rootless paths with a colon in the first segment would be
            // read back as having a scheme.
            let end = path.find('/').unwrap_or(path.len());
            let first = path[..end].replace(':', "%3A");
            path.replace_range(..end, &first);
        }
        if uri.host.is_some() {
            if path.is_empty() {
                path.push('/');
            }
        } else if path.starts_with("//") {
            path.insert_str(0, "/.");
        }
        path
    }

    fn query(&self, uri: &Uri) -> Option<String> {
        let query = uri.query.as_deref()?;
        let mut buf = String::with_capacity(query.len());
        for (i, pair) in query.split('&').enumerate() {
            if i > 0 {
                buf.push('&');
            }
            pct_enc::normalize_component_to(&mut buf, pair, table::QUERY_PAIR, "+");
        }
        (!buf.is_empty()).then_some(buf)
    }

    fn fragment(&self, uri: &Uri) -> Option<String> {
        let fragment = uri.fragment.as_deref()?;
        let buf = pct_enc::normalize_component(fragment, table::FRAGMENT, "");
        (!buf.is_empty()).then_some(buf)
    }
}

/// Unwraps a `feed:` URI that wraps an `http:` URI.
fn feed_inner(uri: &Uri) -> Option<Uri> {
    if !uri.scheme.as_deref()?.eq_ignore_ascii_case("feed") {
        return None;
    }
    let text = uri.to_string();
    let rest = text[5..].trim_start_matches('/');
    if !rest.get(..5)?.eq_ignore_ascii_case("http:") {
        return None;
    }
    Uri::parse(rest).ok()
}

impl Uri {
    /// Normalizes the URI, returning a new value.
    ///
    /// This method applies the syntax-based normalization described in
    /// [Section 6.2.2 of RFC 3986] and the scheme-based normalization
    /// described in [Section 6.2.3], along with the following:
    ///
    /// - The scheme is lowercased, and `ssh+svn` becomes `svn+ssh`.
    /// - A `feed:` URI wrapping an `http:` URI normalizes to the latter.
    /// - An empty user without a password, and an empty password without
    ///   a user, are removed.
    /// - A registered name is percent-decoded, lowercased and converted to
    ///   Punycode, and loses a single trailing dot.
    /// - A port equal to the default port of the scheme is removed.
    /// - Percent-encoding is normalized per component, with decoded
    ///   octets brought into Unicode Normalization Form C. Octets that do
    ///   not decode to UTF-8 are kept encoded.
    /// - Dot segments are removed from every path, relative or not.
    /// - An empty path becomes `/` when there is an authority.
    /// - In a query, `&`, `;` and an encoded `+` stay encoded.
    /// - An empty query or fragment is removed.
    ///
    /// Normalization is idempotent and legal on frozen values.
    ///
    /// [Section 6.2.2 of RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986#section-6.2.2
    /// [Section 6.2.3]: https://datatracker.ietf.org/doc/html/rfc3986#section-6.2.3
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::Uri;
    ///
    /// let uri = Uri::parse("http://example.com:%38%30/%70a%74%68?a=%31#1%323")?;
    /// assert_eq!(uri.normalize().to_string(), "http://example.com/path?a=1#123");
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    #[must_use]
    pub fn normalize(&self) -> Uri {
        Normalizer::new().normalize(self)
    }

    /// Normalizes the URI in place.
    ///
    /// # Errors
    ///
    /// Returns a [`Frozen`] error if the URI is frozen.
    ///
    /// [`Frozen`]: crate::ErrorKind::Frozen
    pub fn normalize_mut(&mut self) -> Result<()> {
        if self.frozen {
            return Err(Error::frozen());
        }
        *self = self.normalize();
        Ok(())
    }

    /// Returns the normalized scheme.
    #[must_use]
    pub fn normalized_scheme(&self) -> Option<String> {
        Normalizer::new().scheme(self)
    }

    /// Returns the normalized user.
    #[must_use]
    pub fn normalized_user(&self) -> Option<String> {
        Normalizer::new().user(self)
    }

    /// Returns the normalized password.
    #[must_use]
    pub fn normalized_password(&self) -> Option<String> {
        Normalizer::new().password(self)
    }

    /// Returns the normalized userinfo.
    #[must_use]
    pub fn normalized_userinfo(&self) -> Option<String> {
        let user = self.normalized_user();
        let password = self.normalized_password();
        match (user, password) {
            (user, Some(password)) => Some(format!("{}:{password}", user.unwrap_or_default())),
            (user, None) => user,
        }
    }

    /// Returns the normalized host.
    #[must_use]
    pub fn normalized_host(&self) -> Option<String> {
        Normalizer::new().host(self)
    }

    /// Returns the normalized port, absent when equal to the default port.
    #[must_use]
    pub fn normalized_port(&self) -> Option<u16> {
        Normalizer::new().port(self)
    }

    /// Returns the normalized authority.
    #[must_use]
    pub fn normalized_authority(&self) -> Option<String> {
        let mut buf = String::new();
        if let Some(userinfo) = self.normalized_userinfo() {
            buf.push_str(&userinfo);
            buf.push('@');
        }
        buf.push_str(&self.normalized_host()?);
        if let Some(port) = self.normalized_port() {
            buf.push(':');
            buf.push_str(&port.to_string());
        }
        Some(buf)
    }

    /// Returns the normalized scheme and authority part.
    #[must_use]
    pub fn normalized_site(&self) -> Option<String> {
        self.normalize().site()
    }

    /// Returns the normalized path.
    #[must_use]
    pub fn normalized_path(&self) -> String {
        Normalizer::new().path(self)
    }

    /// Returns the normalized query.
    #[must_use]
    pub fn normalized_query(&self) -> Option<String> {
        Normalizer::new().query(self)
    }

    /// Returns the normalized fragment.
    #[must_use]
    pub fn normalized_fragment(&self) -> Option<String> {
        Normalizer::new().fragment(self)
    }

    /// Percent-encodes every component of a possibly unencoded URI.
    ///
    /// Every character not allowed in its component is encoded, including
    /// the `%` of existing escapes. IP literals are left as they are.
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::Uri;
    ///
    /// let uri = Uri::parse("http://example.com/%C3%87 x")?;
    /// assert_eq!(uri.encode().to_string(), "http://example.com/%25C3%2587%20x");
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    #[must_use]
    pub fn encode(&self) -> Uri {
        self.map_components(|s, table| pct_enc::encode_component(s, table, ""))
    }

    /// Percent-encodes every component of a possibly unencoded URI after
    /// decoding it, keeping existing escapes stable.
    ///
    /// Decoded text is brought into Unicode Normalization Form C, and the
    /// host is not converted to Punycode. Unlike [`normalize`](Self::normalize),
    /// nothing else changes: the port, case and dot segments stay.
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::Uri;
    ///
    /// let uri = Uri::parse("http://example.com:80/C\u{327}?%F6")?;
    /// assert_eq!(uri.normalized_encode().to_string(), "http://example.com:80/%C3%87?%F6");
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    #[must_use]
    pub fn normalized_encode(&self) -> Uri {
        self.map_components(|s, table| pct_enc::normalize_component(s, table, ""))
    }

    fn map_components(&self, f: impl Fn(&str, Table) -> String) -> Uri {
        let host = self.host.as_ref().map(|host| match host {
            Host::RegName(name) => {
                let text = f(name, table::REG_NAME);
                parse::parse_host(&text).unwrap_or(Host::RegName(text))
            }
            _ => host.clone(),
        });
        Uri {
            scheme: self.scheme.clone(),
            user: self.user.as_deref().map(|s| f(s, USER)),
            password: self.password.as_deref().map(|s| f(s, USER)),
            host,
            port: self.port,
            path: f(&self.path, table::PATH),
            query: self.query.as_deref().map(|s| f(s, table::QUERY)),
            fragment: self.fragment.as_deref().map(|s| f(s, table::FRAGMENT)),
            frozen: false,
        }
    }
}
