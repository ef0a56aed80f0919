use chainroute::{Context, Engine, HandlersChain, Request};
use chainroute::{handler, router::Router};
use criterion::{criterion_group, criterion_main, Criterion};
use http::{Method, StatusCode};
use std::hint::black_box;

fn example_routes() -> Vec<(Method, &'static str)> {
    vec![
        (Method::GET, "/"),
        (Method::GET, "/zoo/animals"),
        (Method::POST, "/zoo/animals"),
        (Method::GET, "/zoo/animals/:id"),
        (Method::PUT, "/zoo/animals/:id"),
        (Method::PATCH, "/zoo/animals/:id"),
        (Method::DELETE, "/zoo/animals/:id"),
        (Method::GET, "/zoo/animals/:id/toys/:toy_id"),
        (
            Method::GET,
            "/zoo/:category/animals/:id/habitats/:habitat_id/sections/:section_id",
        ),
        (
            Method::POST,
            "/inventory/:warehouse_id/feeds/:feed_id/items/:item_id/batches/:batch_id",
        ),
        (Method::GET, "/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i"),
        (Method::HEAD, "/zoo/health"),
        (Method::OPTIONS, "/zoo/health"),
        (Method::GET, "/static/*filepath"),
    ]
}

fn noop() -> HandlersChain {
    vec![handler(|_c: &mut Context| {})]
}

fn bench_route_throughput(c: &mut Criterion) {
    let mut router = Router::new();
    for (method, pattern) in example_routes() {
        router
            .insert(method, pattern, noop())
            .expect("benchmark routes are conflict free");
    }

    c.bench_function("route_match", |b| {
        let test_paths = [
            (Method::GET, "/zoo/animals/123"),
            (Method::GET, "/zoo/animals/123/toys/456"),
            (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
            (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
            (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
            (Method::GET, "/static/css/site/main.css"),
        ];
        b.iter(|| {
            for (method, path) in test_paths.iter() {
                let res = router.route(method, path);
                black_box(&res);
            }
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let mut engine = Engine::new();
    engine
        .use_middleware(|c: &mut Context| c.next())
        .get("/zoo/animals/:id", |c: &mut Context| {
            let body = format!("animal {}", c.param("id").unwrap_or_default());
            c.string(StatusCode::OK, body);
        })
        .expect("benchmark route registers");

    c.bench_function("dispatch_with_middleware", |b| {
        b.iter(|| {
            let res = engine.handle(Request::new(Method::GET, "/zoo/animals/123"));
            black_box(res);
        })
    });
}

criterion_group!(benches, bench_route_throughput, bench_dispatch);
criterion_main!(benches);
