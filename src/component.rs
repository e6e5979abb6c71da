//! URI components.

use crate::{
    error::{Error, Result},
    parse,
    query::QueryValue,
};
use alloc::string::{String, ToString};
use core::str::FromStr;
use ref_cast::{ref_cast_custom, RefCastCustom};

#[cfg(feature = "net")]
use core::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Registered default ports of the IP-based schemes.
const PORT_MAPPING: &[(&str, u16)] = &[
    ("http", 80),
    ("https", 443),
    ("ftp", 21),
    ("tftp", 69),
    ("sftp", 22),
    ("ssh", 22),
    ("svn+ssh", 22),
    ("telnet", 23),
    ("nntp", 119),
    ("gopher", 70),
    ("wais", 210),
    ("ldap", 389),
    ("prospero", 1525),
];

/// A [scheme] component.
///
/// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
///
/// # Comparison
///
/// `Scheme`s are compared case-insensitively. You should do a case-insensitive
/// comparison if the scheme specification allows both letter cases in the scheme name.
///
/// # Examples
///
/// ```
/// use fluid_uri::{component::Scheme, Uri};
///
/// const SCHEME_HTTP: &Scheme = Scheme::new_or_panic("http");
///
/// let uri = Uri::parse("HTTP://EXAMPLE.COM/")?;
/// let scheme = uri.scheme().unwrap();
///
/// // Case-insensitive comparison.
/// assert_eq!(scheme, SCHEME_HTTP);
/// // Case-sensitive comparison.
/// assert_eq!(scheme.as_str(), "HTTP");
/// assert_eq!(scheme.default_port(), Some(80));
/// # Ok::<_, fluid_uri::Error>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct Scheme {
    inner: str,
}

impl Scheme {
    #[ref_cast_custom]
    #[inline]
    pub(crate) const fn new_validated(scheme: &str) -> &Scheme;

    /// Converts a string slice to `&Scheme`.
    ///
    /// # Panics
    ///
    /// Panics if the string is not a valid scheme name according to
    /// [Section 3.1 of RFC 3986][scheme]. For a non-panicking variant,
    /// use [`new`](Self::new).
    ///
    /// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
    #[inline]
    #[must_use]
    pub const fn new_or_panic(s: &str) -> &Scheme {
        match Self::new(s) {
            Some(scheme) => scheme,
            None => panic!("invalid scheme"),
        }
    }

    /// Converts a string slice to `&Scheme`, returning `None` if the conversion fails.
    #[inline]
    #[must_use]
    pub const fn new(s: &str) -> Option<&Scheme> {
        let [first, rem @ ..] = s.as_bytes() else {
            return None;
        };
        if !first.is_ascii_alphabetic() {
            return None;
        }
        let mut rem = rem;
        while let [x, rest @ ..] = rem {
            if !(x.is_ascii_alphanumeric() || matches!(x, b'+' | b'-' | b'.')) {
                return None;
            }
            rem = rest;
        }
        Some(Scheme::new_validated(s))
    }

    /// Returns the scheme component as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the registered default port of the scheme, if any.
    ///
    /// The lookup is case-insensitive.
    #[must_use]
    pub fn default_port(&self) -> Option<u16> {
        PORT_MAPPING
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.inner))
            .map(|&(_, port)| port)
    }

    /// Checks whether the scheme is one of the IP-based schemes whose
    /// hierarchical part must not be empty.
    #[must_use]
    pub fn is_ip_based(&self) -> bool {
        self.default_port().is_some()
    }
}

impl PartialEq for Scheme {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq_ignore_ascii_case(&other.inner)
    }
}

impl Eq for Scheme {}

/// A host component, classified by its syntax.
///
/// IP literals keep their enclosing brackets. Registered names are kept as
/// written, including percent-encoded octets and Unicode characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Host {
    /// A registered name, such as `example.com` or an empty host.
    RegName(String),
    /// An IPv4 address in dotted-decimal form.
    Ipv4(String),
    /// A bracketed IPv6 address, such as `[::1]`.
    Ipv6(String),
    /// A bracketed address of a future version, such as `[v7.data]`.
    IpvFuture(String),
}

impl Host {
    /// Validates and classifies a host.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidUri`] error if a bracketed literal is neither an
    /// IPv6 nor an IPvFuture address, or if a registered name contains a
    /// delimiter, whitespace or a control character.
    ///
    /// [`InvalidUri`]: crate::ErrorKind::InvalidUri
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::{component::Host, ErrorKind};
    ///
    /// assert_eq!(Host::parse("[::1]")?, Host::Ipv6("[::1]".into()));
    /// assert_eq!(Host::parse("192.0.2.16")?, Host::Ipv4("192.0.2.16".into()));
    /// assert_eq!(Host::parse("[va0.::1]")?, Host::IpvFuture("[va0.::1]".into()));
    /// assert_eq!(Host::parse("[<invalid>]").unwrap_err().kind(), ErrorKind::InvalidUri);
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    pub fn parse(s: &str) -> Result<Host> {
        parse::parse_host(s)
    }

    /// Returns the host as written, with brackets around IP literals.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Host::RegName(s) | Host::Ipv4(s) | Host::Ipv6(s) | Host::IpvFuture(s) => s,
        }
    }

    /// Returns the host with the brackets of an IP literal stripped.
    #[must_use]
    pub fn hostname(&self) -> &str {
        match self {
            Host::Ipv6(s) | Host::IpvFuture(s) => &s[1..s.len() - 1],
            Host::RegName(s) | Host::Ipv4(s) => s,
        }
    }

    /// Checks whether the host is a bracketed IP literal.
    #[must_use]
    pub fn is_ip_literal(&self) -> bool {
        matches!(self, Host::Ipv6(_) | Host::IpvFuture(_))
    }

    /// Converts the host into an IP address, if it is an IPv4 or IPv6 address.
    #[cfg(feature = "net")]
    #[must_use]
    pub fn ip_addr(&self) -> Option<IpAddr> {
        let mut reader = parse::Reader::new(self.hostname().as_bytes());
        let addr = match self {
            Host::Ipv4(_) => IpAddr::V4(Ipv4Addr::from(reader.read_v4()?)),
            Host::Ipv6(_) => IpAddr::V6(Ipv6Addr::from(reader.read_v6()?)),
            _ => return None,
        };
        (!reader.has_remaining()).then_some(addr)
    }
}

impl FromStr for Host {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Host::parse(s)
    }
}

/// A component name, used to omit components from a URI.
///
/// Parsing a component name from a string fails with an [`Argument`] error
/// for unknown names.
///
/// [`Argument`]: crate::ErrorKind::Argument
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Component {
    Scheme,
    User,
    Password,
    Userinfo,
    Host,
    Port,
    Authority,
    Path,
    Query,
    Fragment,
}

impl FromStr for Component {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "scheme" => Component::Scheme,
            "user" => Component::User,
            "password" => Component::Password,
            "userinfo" => Component::Userinfo,
            "host" => Component::Host,
            "port" => Component::Port,
            "authority" => Component::Authority,
            "path" => Component::Path,
            "query" => Component::Query,
            "fragment" => Component::Fragment,
            _ => return Err(Error::argument(alloc::format!("invalid component: {s:?}"))),
        })
    }
}

/// The raw components of a URI, as exported by [`Uri::to_hash`].
///
/// Every field is present even when the component is absent.
///
/// [`Uri::to_hash`]: crate::Uri::to_hash
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct Components {
    pub scheme: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

/// A field of [`Parts`]: unspecified, specified as absent, or specified.
pub(crate) type Field<T> = Option<Option<T>>;

/// A record of components to construct a URI from or to merge into one.
///
/// Each component is either left unspecified, set, or explicitly
/// [`unset`](Self::unset). Unspecified components of a merge are taken
/// from the original URI, whereas unset ones are cleared.
///
/// # Examples
///
/// ```
/// use fluid_uri::{component::Parts, Uri};
///
/// let uri = Uri::from_parts(
///     Parts::new().scheme("http").host("example.com").path("path"),
/// )?;
/// assert_eq!(uri.to_string(), "http://example.com/path");
/// # Ok::<_, fluid_uri::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Parts {
    pub(crate) scheme: Field<String>,
    pub(crate) user: Field<String>,
    pub(crate) password: Field<String>,
    pub(crate) userinfo: Field<String>,
    pub(crate) host: Field<String>,
    pub(crate) port: Field<String>,
    pub(crate) authority: Field<String>,
    pub(crate) path: Field<String>,
    pub(crate) query: Field<String>,
    pub(crate) query_values: Option<QueryValue>,
    pub(crate) fragment: Field<String>,
}

macro_rules! setters {
    ($($(#[$attr:meta])* $name:ident,)*) => {
        $(
            $(#[$attr])*
            pub fn $name(mut self, value: impl Into<String>) -> Self {
                self.$name = Some(Some(value.into()));
                self
            }
        )*
    };
}

impl Parts {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    setters! {
        /// Sets the scheme.
        scheme,
        /// Sets the user.
        user,
        /// Sets the password.
        password,
        /// Sets the userinfo, which is split at the first `":"`.
        userinfo,
        /// Sets the host.
        host,
        /// Sets the authority, which is split like a parsed authority.
        authority,
        /// Sets the path.
        path,
        /// Sets the query.
        query,
        /// Sets the fragment.
        fragment,
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(Some(port.to_string()));
        self
    }

    /// Sets the port from text, which is percent-decoded and must be numeric.
    pub fn port_str(mut self, port: impl Into<String>) -> Self {
        self.port = Some(Some(port.into()));
        self
    }

    /// Sets the query from structured values, like [`Uri::set_query_values`].
    ///
    /// [`Uri::set_query_values`]: crate::Uri::set_query_values
    pub fn query_values(mut self, values: QueryValue) -> Self {
        self.query_values = Some(values);
        self
    }

    /// Marks a component as explicitly absent.
    pub fn unset(mut self, component: Component) -> Self {
        match component {
            Component::Scheme => self.scheme = Some(None),
            Component::User => self.user = Some(None),
            Component::Password => self.password = Some(None),
            Component::Userinfo => self.userinfo = Some(None),
            Component::Host => self.host = Some(None),
            Component::Port => self.port = Some(None),
            Component::Authority => self.authority = Some(None),
            Component::Path => self.path = Some(None),
            Component::Query => self.query = Some(None),
            Component::Fragment => self.fragment = Some(None),
        }
        self
    }

    /// Checks the combinations of components that cannot be specified together.
    pub(crate) fn check_conflicts(&self) -> Result<()> {
        if self.authority.is_some()
            && (self.userinfo.is_some()
                || self.user.is_some()
                || self.password.is_some()
                || self.host.is_some()
                || self.port.is_some())
        {
            return Err(Error::argument(
                "cannot specify both an authority and any of the components within the authority",
            ));
        }
        if self.userinfo.is_some() && (self.user.is_some() || self.password.is_some()) {
            return Err(Error::argument(
                "cannot specify both a userinfo and either the user or password",
            ));
        }
        Ok(())
    }
}

impl From<Components> for Parts {
    fn from(c: Components) -> Self {
        Parts {
            scheme: Some(c.scheme),
            user: Some(c.user),
            password: Some(c.password),
            host: Some(c.host),
            port: Some(c.port.map(|port| port.to_string())),
            path: Some(Some(c.path)),
            query: Some(c.query),
            fragment: Some(c.fragment),
            ..Parts::default()
        }
    }
}
