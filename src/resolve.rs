//! Reference resolution and its inverse.

use crate::{
    error::{Error, Result},
    uri::first_segment_has_colon,
    Uri,
};
use alloc::{
    borrow::ToOwned,
    format,
    string::String,
    vec::Vec,
};
use core::ops::Add;

/// Removes the dot segments from a path, following [Section 5.2.4 of RFC 3986].
///
/// Excess `..` segments are dropped, and a path ending in `/.` or `/..`
/// keeps a trailing slash. Relative paths are processed the same way.
///
/// [Section 5.2.4 of RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986#section-5.2.4
///
/// # Examples
///
/// ```
/// use fluid_uri::resolve::remove_dot_segments;
///
/// assert_eq!(remove_dot_segments("/a/b/c/./../../g"), "/a/g");
/// assert_eq!(remove_dot_segments("mid/content=5/../6"), "mid/6");
/// assert_eq!(remove_dot_segments("/a/b/.."), "/a/");
/// ```
#[must_use]
pub fn remove_dot_segments(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut input = path;
    let mut out = String::with_capacity(path.len());

    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_segment(&mut out);
        } else if input == "/.." {
            input = "/";
            pop_segment(&mut out);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..].find('/').map_or(input.len(), |i| i + start);
            // A relative path must not become rooted once its leading
            // segments are popped.
            if out.is_empty() && !rooted {
                out.push_str(&input[start..end]);
            } else {
                out.push_str(&input[..end]);
            }
            input = &input[end..];
        }
    }
    out
}

fn pop_segment(out: &mut String) {
    let i = out.rfind('/').unwrap_or(0);
    out.truncate(i);
}

/// Merges a relative-path reference with the path of its base.
fn merge_paths(base: &Uri, path: &str) -> String {
    match base.path.rfind('/') {
        Some(i) => format!("{}{path}", &base.path[..=i]),
        None if base.host.is_some() => format!("/{path}"),
        None => path.to_owned(),
    }
}

impl Uri {
    /// Resolves a reference against `self` as the base, following
    /// [Section 5.2.2 of RFC 3986].
    ///
    /// The base may itself be relative, in which case the paths are merged
    /// all the same. An empty reference yields a copy of the base.
    ///
    /// [Section 5.2.2 of RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986#section-5.2.2
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidUri`] error if the result is inconsistent, as
    /// when an `http` base is joined with `//`.
    ///
    /// [`InvalidUri`]: crate::ErrorKind::InvalidUri
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::Uri;
    ///
    /// let base = Uri::parse("http://a/b/c/d;p?q")?;
    /// assert_eq!(base.join_str("../../../g")?.to_string(), "http://a/g");
    /// assert_eq!(base.join_str("?y")?.to_string(), "http://a/b/c/d;p?y");
    /// assert_eq!(base.join_str("g;x=1/../y")?.to_string(), "http://a/b/c/y");
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    pub fn join(&self, reference: &Uri) -> Result<Uri> {
        if reference.is_empty() || reference.eql(self) {
            return Ok(self.clone());
        }

        let mut t = Uri::new();
        if reference.scheme.is_some() {
            t.scheme = reference.scheme.clone();
            t.take_authority(reference);
            t.path = remove_dot_segments(&reference.path);
            t.query = reference.query.clone();
        } else {
            if reference.host.is_some() {
                t.take_authority(reference);
                t.path = remove_dot_segments(&reference.path);
                t.query = reference.query.clone();
            } else {
                t.take_authority(self);
                if reference.path.is_empty() {
                    t.path = self.path.clone();
                    t.query = reference.query.clone().or_else(|| self.query.clone());
                } else {
                    let path = if reference.path.starts_with('/') {
                        remove_dot_segments(&reference.path)
                    } else {
                        remove_dot_segments(&merge_paths(self, &reference.path))
                    };
                    t.apply_path(Some(&path));
                    t.query = reference.query.clone();
                }
            }
            t.scheme = self.scheme.clone();
        }
        t.fragment = reference.fragment.clone();

        t.validate()?;
        Ok(t)
    }

    fn take_authority(&mut self, from: &Uri) {
        self.user = from.user.clone();
        self.password = from.password.clone();
        self.host = from.host.clone();
        self.port = from.port;
    }

    /// Parses a reference and resolves it against `self`.
    pub fn join_str(&self, reference: &str) -> Result<Uri> {
        self.join(&Uri::parse(reference)?)
    }

    /// Resolves a reference against `self` in place.
    pub fn join_mut(&mut self, reference: &Uri) -> Result<()> {
        if self.frozen {
            return Err(Error::frozen());
        }
        *self = self.join(reference)?;
        Ok(())
    }

    /// Returns the shortest reference that resolves to `self` against `base`.
    ///
    /// Both URIs are normalized first. If their schemes or authorities
    /// differ, the result is the normalized `self`.
    ///
    /// # Errors
    ///
    /// Returns an [`Argument`] error naming the offending URI if either URI
    /// is relative.
    ///
    /// [`Argument`]: crate::ErrorKind::Argument
    ///
    /// # Examples
    ///
    /// ```
    /// use fluid_uri::Uri;
    ///
    /// let uri = Uri::parse("http://example.com/path/to/resource/")?;
    /// let base = Uri::parse("http://example.com/to/resource/")?;
    /// assert_eq!(uri.route_from(&base)?.to_string(), "../../path/to/resource/");
    /// assert_eq!(base.join(&uri.route_from(&base)?)?, uri);
    /// # Ok::<_, fluid_uri::Error>(())
    /// ```
    pub fn route_from(&self, base: &Uri) -> Result<Uri> {
        let target = self.normalize();
        if target.is_relative() {
            return Err(expected_absolute(self));
        }
        let base = base.normalize();
        if base.is_relative() {
            return Err(expected_absolute(&base));
        }
        if target == base {
            let mut same = Uri::new();
            same.fragment = Some(target.fragment.unwrap_or_default());
            return Ok(same);
        }
        if target.scheme != base.scheme || target.authority() != base.authority() {
            return Ok(target);
        }

        let mut route = Uri::new();
        // An empty reference would keep the query and fragment of the base.
        let keeps_base = target.query.is_none() && base.query.is_some()
            || target.query == base.query && target.fragment.is_none();
        if target.path != base.path || keeps_base {
            route.path = relative_path(&base.path, &target.path);
            route.query = target.query.clone();
        } else if target.query != base.query {
            route.query = target.query.clone();
        }
        route.fragment = target.fragment.clone();

        // Rootless base paths are not always reachable by a relative path.
        match base.join(&route) {
            Ok(joined) if joined == target => Ok(route),
            _ => Ok(target),
        }
    }

    /// Returns the shortest reference that resolves to `target` against `self`.
    ///
    /// See [`route_from`](Self::route_from).
    pub fn route_to(&self, target: &Uri) -> Result<Uri> {
        target.route_from(self)
    }
}

fn expected_absolute(uri: &Uri) -> Error {
    Error::argument(format!("expected absolute URI, got: {uri}"))
}

/// Computes a relative path from the directory of `base` to `target`,
/// both being absolute paths.
fn relative_path(base: &str, target: &str) -> String {
    if base == "/" || base.is_empty() {
        return target.to_owned();
    }

    let base_dirs: Vec<&str> = match base.rfind('/') {
        Some(i) => base[..i].split('/').collect(),
        None => Vec::new(),
    };
    let target_segs: Vec<&str> = target.split('/').collect();
    let (target_dirs, last) = target_segs.split_at(target_segs.len() - 1);

    let common = base_dirs
        .iter()
        .zip(target_dirs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut path = String::new();
    for _ in common..base_dirs.len() {
        path.push_str("../");
    }
    for seg in &target_dirs[common..] {
        path.push_str(seg);
        path.push('/');
    }
    path.push_str(last[0]);

    if path.is_empty() {
        path.push_str("./");
    } else if first_segment_has_colon(&path) || path.starts_with("//") {
        path.insert_str(0, "./");
    }
    path
}

impl Add<&Uri> for &Uri {
    type Output = Result<Uri>;

    fn add(self, reference: &Uri) -> Result<Uri> {
        self.join(reference)
    }
}

impl Add<&str> for &Uri {
    type Output = Result<Uri>;

    fn add(self, reference: &str) -> Result<Uri> {
        self.join_str(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_segments() {
        assert_eq!(remove_dot_segments(""), "");
        assert_eq!(remove_dot_segments("///../"), "//");
        assert_eq!(remove_dot_segments("/../../../g"), "/g");
        assert_eq!(remove_dot_segments("../a"), "a");
        assert_eq!(remove_dot_segments("a/b/../../.."), "");
        assert_eq!(remove_dot_segments("a/../b"), "b");
        assert_eq!(remove_dot_segments("a/b/../../../c/d"), "c/d");
        assert_eq!(remove_dot_segments("/a/../b"), "/b");
        assert_eq!(remove_dot_segments("/a/b/."), "/a/b/");
        assert_eq!(remove_dot_segments("/a/.b/..c/d"), "/a/.b/..c/d");
    }

    #[test]
    fn relative_paths() {
        assert_eq!(relative_path("/path/to/", "/path/to/resource/"), "resource/");
        assert_eq!(relative_path("/path/to/resource/sub", "/path/to/resource/"), "./");
        assert_eq!(relative_path("/path/to/", "/"), "../../");
        assert_eq!(relative_path("/a/b", "/a/c:d"), "./c:d");
        assert_eq!(relative_path("/", "/path/"), "/path/");
        assert_eq!(relative_path("/a/b/c", "/a/b"), "../b");
    }

    #[test]
    fn merge_with_relative_base() {
        let base = Uri::parse("relative/path/to/resource").unwrap();
        assert_eq!(
            base.join_str("another/relative/path").unwrap().to_string(),
            "relative/path/to/another/relative/path"
        );
        let base = Uri::parse("no_slash").unwrap();
        assert_eq!(base.join_str("x").unwrap().to_string(), "x");
    }
}
