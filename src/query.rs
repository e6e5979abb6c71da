//! Structured query values and the form codec.

use crate::{
    error::{Error, Result},
    pct_enc::{self, table::UNRESERVED},
    Uri,
};
use alloc::{
    borrow::ToOwned,
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec::Vec,
};

/// A structured value to be encoded into a query.
///
/// The value to encode must be either a [`Map`](Self::Map) or a
/// [`List`](Self::List) of pairs, each pair being a list of a key and an
/// optional value. The values within must be flat: a scalar, `Null`, or a
/// list of scalars whose items repeat the key.
///
/// # Examples
///
/// ```
/// use fluid_uri::{query::QueryValue, Uri};
///
/// let mut uri = Uri::parse("http://example.com/")?;
///
/// // Mappings are sorted by key.
/// uri.set_query_values(Some(&QueryValue::map([
///     ("b", QueryValue::from(vec!["c", "d", "e"])),
///     ("a", QueryValue::from("a")),
/// ])))?;
/// assert_eq!(uri.query(), Some("a=a&b=c&b=d&b=e"));
///
/// // Pairs keep their order.
/// uri.set_query_values(Some(&QueryValue::pairs([("b", "c"), ("b", "a"), ("a", "a")])))?;
/// assert_eq!(uri.query(), Some("b=c&b=a&a=a"));
/// # Ok::<_, fluid_uri::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum QueryValue {
    /// No value: the key is encoded alone.
    Null,
    /// A text value.
    Text(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A list of values.
    List(Vec<QueryValue>),
    /// A mapping from keys to values, in the order given.
    Map(Vec<(String, QueryValue)>),
}

impl QueryValue {
    /// Creates a mapping from key-value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> QueryValue
    where
        K: Into<String>,
        V: Into<QueryValue>,
    {
        QueryValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Creates an ordered list of pairs.
    pub fn pairs<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> QueryValue
    where
        K: Into<String>,
        V: Into<QueryValue>,
    {
        QueryValue::List(
            entries
                .into_iter()
                .map(|(k, v)| QueryValue::List(Vec::from([QueryValue::Text(k.into()), v.into()])))
                .collect(),
        )
    }

    /// Returns the text form of a scalar.
    fn scalar_text(&self) -> Option<String> {
        match self {
            QueryValue::Text(s) => Some(s.clone()),
            QueryValue::Integer(i) => Some(i.to_string()),
            // Whole floats below 1e16 keep a trailing ".0".
            QueryValue::Float(x) if -1e16 < *x && *x < 1e16 && *x == (*x as i64) as f64 => {
                Some(format!("{x:.1}"))
            }
            QueryValue::Float(x) => Some(x.to_string()),
            _ => None,
        }
    }

    /// Flattens into key-value pairs, returning whether the value was a mapping.
    fn flatten(&self) -> Result<(Vec<(String, Option<String>)>, bool)> {
        let mut out = Vec::new();
        match self {
            QueryValue::Map(entries) => {
                for (key, value) in entries {
                    push_flat(&mut out, key, value)?;
                }
                Ok((out, true))
            }
            QueryValue::List(items) => {
                for item in items {
                    let (key, value) = match item {
                        QueryValue::List(pair) => match &pair[..] {
                            [key] => (key, &QueryValue::Null),
                            [key, value] => (key, value),
                            _ => return Err(Error::type_mismatch("expected a key-value pair")),
                        },
                        _ => return Err(Error::type_mismatch("expected a key-value pair")),
                    };
                    let key = key
                        .scalar_text()
                        .ok_or_else(|| Error::type_mismatch("expected a scalar key"))?;
                    push_flat(&mut out, &key, value)?;
                }
                Ok((out, false))
            }
            _ => Err(Error::type_mismatch(
                "can't convert a scalar into query values",
            )),
        }
    }

    /// Encodes into a query string, as [`Uri::set_query_values`] does.
    ///
    /// # Errors
    ///
    /// Returns a [`Type`] error if the value is not a mapping or a list of
    /// pairs, or if it nests beyond a list of scalars.
    ///
    /// [`Type`]: crate::ErrorKind::Type
    pub fn to_query(&self) -> Result<String> {
        let (mut pairs, is_map) = self.flatten()?;
        if is_map {
            pairs.sort();
        }

        let mut buf = String::new();
        for (i, (key, value)) in pairs.iter().enumerate() {
            if i > 0 {
                buf.push('&');
            }
            buf.push_str(&pct_enc::encode_component(key, UNRESERVED, ""));
            if let Some(value) = value {
                buf.push('=');
                buf.push_str(&pct_enc::encode_component(value, UNRESERVED, ""));
            }
        }
        Ok(buf)
    }
}

fn push_flat(out: &mut Vec<(String, Option<String>)>, key: &str, value: &QueryValue) -> Result<()> {
    match value {
        QueryValue::Null => out.push((key.to_owned(), None)),
        QueryValue::List(items) => {
            for item in items {
                match item {
                    QueryValue::Null => out.push((key.to_owned(), None)),
                    _ => {
                        let text = item.scalar_text().ok_or_else(|| {
                            Error::type_mismatch(format!("can't encode nested value for key {key:?}"))
                        })?;
                        out.push((key.to_owned(), Some(text)));
                    }
                }
            }
        }
        QueryValue::Map(_) => {
            return Err(Error::type_mismatch(format!(
                "can't encode nested mapping for key {key:?}"
            )))
        }
        _ => out.push((key.to_owned(), value.scalar_text())),
    }
    Ok(())
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Text(s.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Text(s)
    }
}

impl From<i64> for QueryValue {
    fn from(i: i64) -> Self {
        QueryValue::Integer(i)
    }
}

impl From<i32> for QueryValue {
    fn from(i: i32) -> Self {
        QueryValue::Integer(i.into())
    }
}

impl From<f64> for QueryValue {
    fn from(x: f64) -> Self {
        QueryValue::Float(x)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(items: Vec<T>) -> Self {
        QueryValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<QueryValues> for QueryValue {
    fn from(values: QueryValues) -> Self {
        match values {
            QueryValues::Map(map) => QueryValue::map(map),
            QueryValues::Pairs(pairs) => QueryValue::pairs(pairs),
        }
    }
}

/// The shape in which to decode a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryShape {
    /// A mapping in which the last value of a duplicate key wins.
    Map,
    /// An ordered list of pairs, keeping duplicates.
    Pairs,
}

/// A decoded query, in the [shape](QueryShape) requested.
///
/// A key without `=` has no value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValues {
    /// A mapping in which the last value of a duplicate key wins.
    Map(BTreeMap<String, Option<String>>),
    /// An ordered list of pairs.
    Pairs(Vec<(String, Option<String>)>),
}

impl QueryValues {
    /// Returns the mapping, if decoded as one.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Option<String>>> {
        match self {
            QueryValues::Map(map) => Some(map),
            QueryValues::Pairs(_) => None,
        }
    }

    /// Returns the pairs, if decoded as such.
    #[must_use]
    pub fn as_pairs(&self) -> Option<&[(String, Option<String>)]> {
        match self {
            QueryValues::Pairs(pairs) => Some(pairs),
            QueryValues::Map(_) => None,
        }
    }
}

impl Uri {
    /// Decodes the query into structured values.
    ///
    /// The query is split at `&`, skipping empty pairs, and each pair at
    /// its first `=`. A `+` in a value is read as a space.
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::{query::{QueryShape, QueryValues}, Uri};
    ///
    /// let uri = Uri::parse("?q=one&q=two&flag&one=1=uno")?;
    /// let map = uri.query_values(QueryShape::Map).unwrap();
    /// assert_eq!(map.as_map().unwrap()["q"].as_deref(), Some("two"));
    /// assert_eq!(map.as_map().unwrap()["flag"], None);
    /// assert_eq!(map.as_map().unwrap()["one"].as_deref(), Some("1=uno"));
    ///
    /// let pairs = uri.query_values(QueryShape::Pairs).unwrap();
    /// assert_eq!(pairs.as_pairs().unwrap()[..2], [
    ///     ("q".to_owned(), Some("one".to_owned())),
    ///     ("q".to_owned(), Some("two".to_owned())),
    /// ]);
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    #[must_use]
    pub fn query_values(&self, shape: QueryShape) -> Option<QueryValues> {
        let query = self.query.as_deref()?;
        let pairs = query.split('&').filter(|pair| !pair.is_empty()).map(|pair| {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (pair, None),
            };
            let key = pct_enc::unencode_component(key, "").into_owned();
            let value = value.map(|value| {
                pct_enc::unencode_component(&value.replace('+', " "), "").into_owned()
            });
            (key, value)
        });
        Some(match shape {
            QueryShape::Map => QueryValues::Map(pairs.collect()),
            QueryShape::Pairs => QueryValues::Pairs(pairs.collect()),
        })
    }
}

/// Normalizes line breaks to CRLF.
fn crlf(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                buf.push_str("\r\n");
            }
            '\n' => buf.push_str("\r\n"),
            _ => buf.push(c),
        }
    }
    buf
}

fn form_encode_component(s: &str) -> String {
    pct_enc::encode_component(&crlf(s), UNRESERVED, "").replace("%20", "+")
}

/// Encodes values as `application/x-www-form-urlencoded` content.
///
/// Spaces become `+` and line breaks become `%0D%0A`. A `Null` value is
/// encoded as empty, and list values repeat the key. Pairs are sorted when
/// `sort` is set.
///
/// # Errors
///
/// Returns a [`Type`] error under the same conditions as
/// [`QueryValue::to_query`].
///
/// [`Type`]: crate::ErrorKind::Type
///
/// # Examples
///
/// ```
/// use fluid_uri::query::{form_encode, QueryValue};
///
/// let form = QueryValue::pairs([("&one", "/1"), ("=two", "?2"), (":three", "#3")]);
/// assert_eq!(form_encode(&form, false)?, "%26one=%2F1&%3Dtwo=%3F2&%3Athree=%233");
///
/// let form = QueryValue::map([("text", "one two\nthree")]);
/// assert_eq!(form_encode(&form, false)?, "text=one+two%0D%0Athree");
/// # Ok::<_, fluid_uri::Error>(())
/// ```
pub fn form_encode(values: &QueryValue, sort: bool) -> Result<String> {
    let (mut pairs, _) = values.flatten()?;
    if sort {
        pairs.sort();
    }

    let mut buf = String::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            buf.push('&');
        }
        buf.push_str(&form_encode_component(key));
        buf.push('=');
        buf.push_str(&form_encode_component(value.as_deref().unwrap_or_default()));
    }
    Ok(buf)
}

fn form_unencode_component(s: &str) -> String {
    let decoded = pct_enc::unencode_component(&s.replace('+', "%20"), "").into_owned();
    decoded.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decodes `application/x-www-form-urlencoded` content into ordered pairs.
///
/// # Examples
///
/// ```
/// use fluid_uri::query::form_unencode;
///
/// assert_eq!(
///     form_unencode("text=one+two%0D%0Athree&flag"),
///     [
///         ("text".to_owned(), Some("one two\nthree".to_owned())),
///         ("flag".to_owned(), None),
///     ]
/// );
/// ```
#[must_use]
pub fn form_unencode(encoded: &str) -> Vec<(String, Option<String>)> {
    encoded
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (
                form_unencode_component(key),
                Some(form_unencode_component(value)),
            ),
            None => (form_unencode_component(pair), None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn scalars() {
        assert_eq!(
            QueryValue::map([("a", QueryValue::from(1)), ("b", QueryValue::from(1.5))])
                .to_query()
                .unwrap(),
            "a=1&b=1.5"
        );
        assert_eq!(QueryValue::map([("x", 2.0)]).to_query().unwrap(), "x=2.0");
        assert_eq!(QueryValue::map([("x", -3.0)]).to_query().unwrap(), "x=-3.0");
        assert_eq!(QueryValue::map([("x", 1e20)]).to_query().unwrap(), "x=100000000000000000000");
        assert_eq!(QueryValue::Map(Vec::new()).to_query().unwrap(), "");
    }

    #[test]
    fn nested() {
        let nested = QueryValue::map([("a", QueryValue::map([("b", vec!["c"])]))]);
        assert_eq!(nested.to_query().unwrap_err().kind(), ErrorKind::Type);

        let list_of_maps = QueryValue::map([(
            "b",
            QueryValue::List(Vec::from([QueryValue::map([("c", "c")])])),
        )]);
        assert_eq!(list_of_maps.to_query().unwrap_err().kind(), ErrorKind::Type);

        assert_eq!(QueryValue::from("bogus").to_query().unwrap_err().kind(), ErrorKind::Type);
    }

    #[test]
    fn line_breaks() {
        assert_eq!(crlf("a\rb\nc\r\nd"), "a\r\nb\r\nc\r\nd");
        assert_eq!(form_unencode_component("a%0Db%0Ac%0D%0Ad"), "a\nb\nc\nd");
    }
}
