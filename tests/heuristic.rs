use fluid_uri::{ErrorKind, Uri};

#[track_caller]
fn guess(input: &str, hint: Option<&str>) -> String {
    Uri::heuristic_parse(input, hint).unwrap().to_string()
}

#[test]
fn guess_scheme() {
    assert_eq!(guess("example.com", None), "http://example.com");
    assert_eq!(guess("example.com", Some("ftp")), "ftp://example.com");
    assert_eq!(guess("example.com/path?q#f", None), "http://example.com/path?q#f");
    assert_eq!(guess("example.com:21", Some("ftp")), "ftp://example.com:21");

    let u = Uri::heuristic_parse("192.0.2.16:8000/path", None).unwrap();
    assert_eq!(u.scheme().map(|s| s.as_str()), Some("http"));
    assert_eq!(u.host(), Some("192.0.2.16"));
    assert_eq!(u.port(), Some(8000));
    assert_eq!(u.path(), "/path");

    let u = Uri::heuristic_parse("192.0.2.16/path", None).unwrap();
    assert_eq!(u.to_string(), "http://192.0.2.16/path");
}

#[test]
fn keep_scheme() {
    assert_eq!(guess("http:example.com/", None), "http://example.com/");
    assert_eq!(guess("http:example.com/", Some("ftp")), "http://example.com/");
    assert_eq!(guess("https:example.com/", None), "https://example.com/");
    assert_eq!(guess("http://example.com/", Some("ftp")), "http://example.com/");
}

#[test]
fn collapse_slashes() {
    assert_eq!(guess("http:///example.com", None), "http://example.com");
    assert_eq!(guess("http:/example.com", None), "http://example.com");
    assert_eq!(guess("https:////example.com/", None), "https://example.com/");
    assert_eq!(guess("feed:///example.com", None), "feed://example.com");
    assert_eq!(guess("feed://http://example.com", None), "feed:http://example.com");
    assert_eq!(guess("feed:///http:///example.com", None), "feed:http://example.com");
    assert_eq!(guess("file://path/to/resource/", None), "file:///path/to/resource/");
}

#[test]
fn leave_alone() {
    assert_eq!(guess("/path/to/resource", None), "/path/to/resource");
    assert_eq!(guess("relative/path/to/resource", None), "relative/path/to/resource");
    assert_eq!(guess("http://example.com/example.com/", None), "http://example.com/example.com/");
    assert_eq!(guess("mailto:user@example.com", None), "mailto:user@example.com");
    assert_eq!(guess("", None), "");

    // Not a valid host name.
    assert_eq!(guess("exa mple.com/path", None), "exa mple.com/path");
}

#[test]
fn input_kept() {
    let input = String::from("example.com");
    let mut u = Uri::heuristic_parse(&input, None).unwrap();
    u.set_path(Some("/changed")).unwrap();
    assert_eq!(input, "example.com");
    assert_eq!(u.to_string(), "http://example.com/changed");
}

#[test]
fn invalid() {
    let e = Uri::heuristic_parse("example.com:65536", None).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidUri);
}
