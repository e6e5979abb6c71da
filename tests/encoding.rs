use fluid_uri::{
    host::{to_ascii, to_display},
    pct_enc::{
        encode_component, normalize_component, table::*, unencode, unencode_component,
    },
    Uri,
};

#[test]
fn encode() {
    assert_eq!(encode_component("g\u{fc}nther", UNRESERVED, ""), "g%C3%BCnther");
    assert_eq!(encode_component("a b/c?d", PATH, ""), "a%20b/c%3Fd");
    assert_eq!(encode_component("100%", QUERY, ""), "100%25");

    // Existing escapes are encoded again.
    assert_eq!(encode_component("%20", PATH, ""), "%2520");
    assert_eq!(encode_component("%2f", PATH, "/"), "%2F");

    // Characters outside ASCII are kept by the IRI tables.
    assert_eq!(encode_component("\u{e9}t\u{e9}", IPATH, ""), "\u{e9}t\u{e9}");
    assert_eq!(encode_component("\u{e9}t\u{e9}", PATH, ""), "%C3%A9t%C3%A9");

    // A single segment escapes its separator.
    assert_eq!(encode_component("a/b:c", SEGMENT, ""), "a%2Fb:c");
}

#[test]
fn tables() {
    assert!(SEGMENT.is_subset(PATH));
    assert!(!PATH.is_subset(SEGMENT));
    assert!(QUERY_PAIR.is_subset(QUERY));
    assert!(REG_NAME.is_subset(IREG_NAME));
    assert!(!IREG_NAME.is_subset(REG_NAME));

    assert!(IUSERINFO.allows('\u{e9}') && !USERINFO.allows('\u{e9}'));
    assert!(IQUERY.allows('\u{e000}') && !IFRAGMENT.allows('\u{e000}'));
    assert!(IPCHAR.validate("\u{2603}:@%20") && !IPCHAR.validate("a/b"));
}

#[test]
fn unencode_str() {
    assert_eq!(unencode("%41%42%43", ""), b"ABC");
    assert_eq!(unencode("%E8", ""), [0xe8]);
    assert_eq!(unencode("%4", ""), b"%4");
    assert_eq!(unencode("%zz%41", ""), b"%zzA");
    assert_eq!(unencode("a%2Fb%2fc", "/"), b"a%2Fb%2fc");

    assert_eq!(unencode_component("%E2%98%83", ""), "\u{2603}");
    assert_eq!(unencode_component("no escapes", ""), "no escapes");
    assert_eq!(unencode_component("%E8x", ""), "\u{fffd}x");
}

#[test]
fn normalize() {
    assert_eq!(normalize_component("%7Efoo%2dbar", PATH, ""), "~foo-bar");
    assert_eq!(normalize_component("a%2fb", PATH, ""), "a/b");
    assert_eq!(normalize_component("a%2fb", PATH, "/"), "a%2Fb");
    assert_eq!(normalize_component("C%CC%A7", PATH, ""), "%C3%87");
    assert_eq!(normalize_component("C\u{327}", IPATH, ""), "\u{c7}");
    assert_eq!(normalize_component("50% off", PATH, ""), "50%25%20off");

    // Stable under repetition.
    for s in ["%E8%41", "a%25b", "%", "\u{2603} %2"] {
        let once = normalize_component(s, QUERY, "");
        assert_eq!(normalize_component(&once, QUERY, ""), once);
    }
}

#[test]
fn uri_encode() {
    let u = Uri::parse("http://example.com/%C3%87").unwrap();
    assert_eq!(u.encode().to_string(), "http://example.com/%25C3%2587");

    let u = Uri::parse("http://example.com/path to?q=a b#f g").unwrap();
    assert_eq!(
        u.encode().to_string(),
        "http://example.com/path%20to?q=a%20b#f%20g"
    );

    // IP literals are kept.
    let u = Uri::parse("http://[::1]/ x").unwrap();
    assert_eq!(u.encode().to_string(), "http://[::1]/%20x");
}

#[test]
fn uri_normalized_encode() {
    let u = Uri::parse("http://example.com:80/%E8?%F6#%F6").unwrap();
    assert_eq!(u.normalized_encode().to_string(), "http://example.com:80/%E8?%F6#%F6");

    let u = Uri::parse("HTTP://Example.com/%7euser/./a b").unwrap();
    assert_eq!(u.normalized_encode().to_string(), "HTTP://Example.com/~user/./a%20b");

    let u = Uri::parse("http://example.com/C%CC%A7").unwrap();
    assert_eq!(u.normalized_encode().to_string(), "http://example.com/%C3%87");
}

#[test]
fn hosts() {
    assert_eq!(to_ascii("www.\u{8a79}\u{59c6}\u{65af}.com"), "www.xn--8ws00zhy3a.com");
    assert_eq!(to_ascii("WWW.EXAMPLE.COM"), "www.example.com");
    assert_eq!(to_ascii("\u{2603}.net"), "xn--n3h.net");
    assert_eq!(to_display("www.xn--8ws00zhy3a.com"), "www.\u{8a79}\u{59c6}\u{65af}.com");
    assert_eq!(to_display("xn--n3h.net"), "\u{2603}.net");
    assert_eq!(to_display("www.example.com"), "www.example.com");

    let u = Uri::parse("http://www.xn--8ws00zhy3a.com/").unwrap();
    assert_eq!(
        u.display_uri().to_string(),
        "http://www.\u{8a79}\u{59c6}\u{65af}.com/"
    );
}
