use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::{Method, StatusCode};
use std::time::Duration;
use url::Url;
use wirehop::http::request::RequestMetadata;
use wirehop::{
    redirect_method_for, ExecutionPolicy, HttpRequest, OrderedHeaders, RawResponse, RequestBody,
    RedirectResolver,
};

fn benchmark_method_rewrite(c: &mut Criterion) {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    let statuses = [
        StatusCode::MOVED_PERMANENTLY,
        StatusCode::FOUND,
        StatusCode::SEE_OTHER,
        StatusCode::TEMPORARY_REDIRECT,
    ];
    c.bench_function("redirect_method_for", |b| {
        b.iter(|| {
            for method in &methods {
                for status in statuses {
                    black_box(redirect_method_for(method, status));
                }
            }
        })
    });
}

fn benchmark_resolve_hop(c: &mut Criterion) {
    let resolver = RedirectResolver::new(ExecutionPolicy::default());
    let request = HttpRequest {
        url: Url::parse("https://svc.test/start").unwrap(),
        method: Method::GET,
        headers: OrderedHeaders::new(),
        body: RequestBody::Empty,
        timeout: Duration::from_secs(30),
        metadata: RequestMetadata::new(),
    };
    let response =
        RawResponse::new(StatusCode::FOUND).with_header("location", "https://svc.test/next");

    c.bench_function("resolve_followed_hop", |b| {
        b.iter(|| black_box(resolver.resolve(&response, &request)))
    });
}

criterion_group!(benches, benchmark_method_rewrite, benchmark_resolve_hop);
criterion_main!(benches);
