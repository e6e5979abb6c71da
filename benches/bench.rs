use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fluid_uri::{
    pct_enc::{normalize_component, table::QUERY, unencode_component},
    Uri,
};
use url::Url;

criterion_group!(
    benches,
    bench_normalize_component,
    bench_unencode,
    bench_parse,
    bench_parse_url,
    bench_normalize,
    bench_join,
    bench_join_url,
    bench_route,
);
criterion_main!(benches);

const NORM_CASE: &str = "te\u{1f603}a %E6%B5%8B1`~!@%e8%af%95#$%25st^&+=C%CC%A7";

fn bench_normalize_component(c: &mut Criterion) {
    c.bench_function("normalize_component", |b| {
        b.iter(|| normalize_component(black_box(NORM_CASE), QUERY, ""))
    });
}

const DEC_CASE: &str = "te%F0%9F%98%83a%20%E6%B5%8B1%60~!@%E8%AF%95%23$%25st%5E&+=";

fn bench_unencode(c: &mut Criterion) {
    c.bench_function("unencode", |b| {
        b.iter(|| unencode_component(black_box(DEC_CASE), ""))
    });
}

const PARSE_CASE: &str = "https://user@example.com/search?q=%E6%B5%8B%E8%AF%95#fragment";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", |b| b.iter(|| Uri::parse(black_box(PARSE_CASE))));
}

fn bench_parse_url(c: &mut Criterion) {
    c.bench_function("parse_url", |b| {
        b.iter(|| Url::parse(black_box(PARSE_CASE)))
    });
}

const NORMALIZE_CASE: &str = "HTTP://User@www.EXAMPLE.com:80/a/./b/../b/%63/%7bfoo%7d?q=%41#%62";

fn bench_normalize(c: &mut Criterion) {
    let uri = Uri::parse(NORMALIZE_CASE).unwrap();
    c.bench_function("normalize", |b| b.iter(|| black_box(&uri).normalize()));
}

const BASE_CASE: &str = "http://example.com/foo/bar/baz?q#f";
const REF_CASE: &str = "../../../qux/./quux/../corge?grault#garply";

fn bench_join(c: &mut Criterion) {
    let base = Uri::parse(BASE_CASE).unwrap();
    let r = Uri::parse(REF_CASE).unwrap();
    c.bench_function("join", |b| b.iter(|| black_box(&base).join(black_box(&r))));
}

fn bench_join_url(c: &mut Criterion) {
    let base = Url::parse(BASE_CASE).unwrap();
    c.bench_function("join_url", |b| {
        b.iter(|| black_box(&base).join(black_box(REF_CASE)))
    });
}

fn bench_route(c: &mut Criterion) {
    let base = Uri::parse("http://example.com/path/to/another/resource").unwrap();
    let target = Uri::parse("http://example.com/path/from/here?q#f").unwrap();
    c.bench_function("route", |b| {
        b.iter(|| black_box(&target).route_from(black_box(&base)))
    });
}
