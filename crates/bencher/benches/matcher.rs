use std::hint::black_box;

use bencher::{RouteTable, TestCase};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use http::Method;
use micro_router::{Router, handlers};

static API_ROUTES: RouteTable = RouteTable::new(
    &[
        ("GET", "/"),
        ("GET", "/users"),
        ("POST", "/users"),
        ("GET", "/users/{user_id}"),
        ("PUT", "/users/{user_id}"),
        ("DELETE", "/users/{user_id}"),
        ("GET", "/users/{user_id}/posts"),
        ("GET", "/users/{user_id}/posts/{post_id}"),
        ("GET", "/teams/{team_id}/members/{member_id}/roles"),
        ("GET", "/health"),
    ],
    &[
        ("GET", "/"),
        ("GET", "/users/42"),
        ("DELETE", "/users/42"),
        ("GET", "/users/42/posts/7/"),
        ("GET", "/teams/core/members/alice/roles"),
        ("PATCH", "/users/42"),
        ("GET", "/no/such/route"),
    ],
);

static LAST_ROUTE: RouteTable = RouteTable::new(
    &[
        ("GET", "/a/{x}"),
        ("GET", "/b/{x}"),
        ("GET", "/c/{x}"),
        ("GET", "/d/{x}"),
        ("GET", "/e/{x}"),
        ("GET", "/f/{x}"),
        ("GET", "/g/{x}"),
        ("GET", "/h/{x}"),
        ("GET", "/i/{x}"),
        ("GET", "/j/{x}"),
        ("GET", "/k/{x}"),
        ("GET", "/l/{x}"),
        ("GET", "/m/{x}"),
        ("GET", "/n/{x}"),
        ("GET", "/o/{x}"),
        ("POST", "/o/{x}"),
    ],
    &[("POST", "/o/1"), ("GET", "/z/1")],
);

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::normal("api_routes", API_ROUTES), TestCase::large("last_route", LAST_ROUTE)]
}

fn build_router(table: &RouteTable) -> Router {
    table
        .routes()
        .iter()
        .fold(Router::builder(), |builder, (method, path)| {
            let method = Method::from_bytes(method.as_bytes()).expect("benchmark methods are valid");
            builder.route(method, *path, handlers![|ctx| ctx.send("ok")])
        })
        .build()
        .expect("benchmark templates compile")
}

fn benchmark_router_find(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("router_find");

    for case in create_test_cases() {
        let router = build_router(case.table());
        let lookups = case
            .table()
            .lookups()
            .iter()
            .map(|(method, path)| (Method::from_bytes(method.as_bytes()).expect("benchmark methods are valid"), *path))
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(lookups.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &lookups, |b, lookups| {
            b.iter(|| {
                for (method, path) in lookups {
                    let _ = black_box(router.find(method, path));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_build(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("router_build");

    for case in create_test_cases() {
        group.throughput(Throughput::Elements(case.table().routes().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter(|| black_box(build_router(case.table())));
        });
    }

    group.finish();
}

criterion_group!(matcher, benchmark_router_find, benchmark_build);
criterion_main!(matcher);
