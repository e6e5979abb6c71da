//! Lenient constructors for loosely written input.

use crate::{component::Host, error::Result, parse, Uri};
use alloc::{
    borrow::ToOwned,
    format,
    string::{String, ToString},
};

/// Strips `prefix` followed by one or more slashes.
fn strip_slashes<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(prefix)?;
    rest.starts_with('/').then(|| rest.trim_start_matches('/'))
}

/// Rewrites a run of slashes after well-known schemes.
fn collapse_slashes(s: &str) -> String {
    if let Some(rest) = strip_slashes(s, "http:") {
        format!("http://{rest}")
    } else if let Some(rest) = strip_slashes(s, "https:") {
        format!("https://{rest}")
    } else if let Some(rest) = strip_slashes(s, "feed:")
        .and_then(|rest| strip_slashes(rest, "http:"))
    {
        format!("feed:http://{rest}")
    } else if let Some(rest) = strip_slashes(s, "feed:") {
        format!("feed://{rest}")
    } else if let Some(rest) = strip_slashes(s, "file:") {
        format!("file:///{rest}")
    } else {
        s.to_owned()
    }
}

/// Checks whether the would-be scheme of `s` is a dotted host name,
/// as in `example.com:21`.
fn scheme_is_host(s: &str) -> bool {
    let Some(end) = s.find([':', '/', '?', '#']) else {
        return false;
    };
    if s.as_bytes()[end] != b':' {
        return false;
    }
    let prefix = &s[..end];
    matches!(prefix.find('.'), Some(i) if i > 0)
}

/// Returns the leading segment of a relative path if it looks like a
/// dotted host name.
fn host_in_path(path: &str) -> Option<&str> {
    let segment = path.split('/').next()?;
    matches!(segment.find('.'), Some(i) if i > 0).then_some(segment)
}

/// Drive letter of a Windows path like `C:\` or `/c|/`, starting at `i`.
fn drive_letter(s: &str, i: usize) -> Option<char> {
    match s.as_bytes().get(i..i + 3)? {
        [x, b':' | b'|', b'/' | b'\\'] if x.is_ascii_alphabetic() => {
            Some(char::from(x.to_ascii_lowercase()))
        }
        _ => None,
    }
}

impl Uri {
    /// Parses loosely written input, guessing what was meant.
    ///
    /// The scheme defaults to `scheme_hint`, or `http` when no hint is
    /// given, and is only applied when the input carries no scheme of its
    /// own. In particular:
    ///
    /// - Extra slashes after `http:`, `https:`, `feed:` and `file:` are
    ///   collapsed, and `feed://http://` becomes `feed:http://`.
    /// - A dotted host followed by a port, like `example.com:21`, has the
    ///   scheme prepended.
    /// - A relative path starting with a dotted host, like
    ///   `example.com/path`, has the host pulled out of the path.
    ///
    /// Any other input is parsed as is.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidUri`] error if the rewritten input fails to parse.
    ///
    /// [`InvalidUri`]: crate::ErrorKind::InvalidUri
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::Uri;
    ///
    /// assert_eq!(Uri::heuristic_parse("example.com", None)?.to_string(), "http://example.com");
    /// assert_eq!(Uri::heuristic_parse("http:///example.com", None)?.to_string(), "http://example.com");
    /// assert_eq!(
    ///     Uri::heuristic_parse("example.com:21", Some("ftp"))?.to_string(),
    ///     "ftp://example.com:21"
    /// );
    /// assert_eq!(
    ///     Uri::heuristic_parse("https:example.com/", Some("ftp"))?.to_string(),
    ///     "https://example.com/"
    /// );
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    pub fn heuristic_parse(input: &str, scheme_hint: Option<&str>) -> Result<Uri> {
        let hint = scheme_hint.unwrap_or("http");

        let mut text = collapse_slashes(input);
        if text != input {
            tracing::trace!(input, rewritten = %text, "collapsed slashes after scheme");
        }
        if scheme_is_host(&text) {
            text = format!("{hint}://{text}");
            tracing::trace!(input, rewritten = %text, "guessed scheme for host and port");
        }

        let mut uri = Uri::parse(&text)?;
        if uri.host.is_some() {
            return Ok(uri);
        }

        let Some(candidate) = host_in_path(&uri.path) else {
            return Ok(uri);
        };
        let Ok(host @ (Host::RegName(_) | Host::Ipv4(_))) = parse::parse_host(candidate) else {
            return Ok(uri);
        };

        let mut guess = uri.clone();
        guess.path = uri.path[candidate.len()..].to_owned();
        guess.host = Some(host);
        if guess.scheme.is_none() {
            guess.scheme = Some(hint.to_owned());
        }
        match guess.validate() {
            Ok(()) => {
                tracing::trace!(input, host = candidate, "pulled host out of path");
                uri = guess;
            }
            Err(_) => tracing::trace!(input, host = candidate, "kept host-like path as is"),
        }
        Ok(uri)
    }

    /// Converts a file system path into a `file` URI.
    ///
    /// Both Unix and Windows paths are accepted: backslashes become
    /// slashes, drive letters like `C:\` or `C|/` are lowercased and an
    /// absolute path gets the `file` scheme with an empty host. The result
    /// is normalized, so that characters like spaces are percent-encoded.
    ///
    /// Input that already has a scheme other than `file` is parsed as is,
    /// and a relative path stays relative.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidUri`] error if the converted path fails to parse.
    ///
    /// [`InvalidUri`]: crate::ErrorKind::InvalidUri
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::Uri;
    ///
    /// assert_eq!(Uri::convert_path("/one/two/")?.to_string(), "file:///one/two/");
    /// assert_eq!(
    ///     Uri::convert_path("c:\\windows\\My Documents 100%20\\foo.txt")?.to_string(),
    ///     "file:///c:/windows/My%20Documents%20100%20/foo.txt"
    /// );
    /// assert_eq!(Uri::convert_path("http://example.com/")?.to_string(), "http://example.com/");
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    pub fn convert_path(path: &str) -> Result<Uri> {
        let mut text = path.trim();
        if let Some(rest) = text.strip_prefix("file:") {
            let rest = rest.strip_prefix('/').unwrap_or(rest);
            text = rest.strip_prefix('/').unwrap_or(rest);
        }

        let text = if drive_letter(text, 0).is_some() {
            format!("/{text}")
        } else {
            text.to_owned()
        };

        let mut uri = Uri::parse(&text)?;
        if uri.scheme.is_none() {
            if uri.path.starts_with('/') {
                if let Some(letter) = drive_letter(&uri.path, 1) {
                    tracing::trace!(path, drive = %letter, "rewrote drive letter");
                    uri.path.replace_range(1..4, &format!("{letter}:/"));
                }
            }
            uri.path = uri.path.replace('\\', "/");
            if uri.path.starts_with('/') {
                uri.scheme = Some("file".to_string());
                uri.host = Some(Host::RegName(String::new()));
            }
            uri = uri.normalize();
        }
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slashes() {
        assert_eq!(collapse_slashes("http:////a"), "http://a");
        assert_eq!(collapse_slashes("http:a"), "http:a");
        assert_eq!(collapse_slashes("feed:///http:/a"), "feed:http://a");
        assert_eq!(collapse_slashes("file://a/b"), "file:///a/b");
    }

    #[test]
    fn host_guesses() {
        assert!(scheme_is_host("example.com:21"));
        assert!(scheme_is_host("192.0.2.16:8000/path"));
        assert!(!scheme_is_host("http://example.com"));
        assert!(!scheme_is_host("/a.b:c"));
        assert_eq!(host_in_path("example.com/path"), Some("example.com"));
        assert_eq!(host_in_path(".hidden/path"), None);
        assert_eq!(host_in_path("/example.com/"), None);
    }

    #[test]
    fn drive_letters() {
        assert_eq!(drive_letter("C:\\", 0), Some('c'));
        assert_eq!(drive_letter("/c|/x", 1), Some('c'));
        assert_eq!(drive_letter("C:", 0), None);
        assert_eq!(drive_letter("1:/", 0), None);
    }
}
