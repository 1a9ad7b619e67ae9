use crudrules::coerce::{coerce, Type};
use crudrules::resource::{Resource, TypeDescriptor};
use crudrules::router::Router;
use crudrules::rules::{Rule, RuleSet};
use crudrules::{payload, project_inbound, project_outbound, Payload, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Method;

fn account_rules() -> RuleSet {
    RuleSet::new(
        TypeDescriptor::map("Account"),
        [
            Rule::new("id").output_only(),
            Rule::new("name").with_type(Type::String).required(),
            Rule::new("balance").with_type(Type::Float64),
            Rule::new("age").with_type(Type::Uint8),
            Rule::new("created").with_alias("createdAt").with_type(Type::Time),
            Rule::new("ttl").with_type(Type::Duration).with_versions(["2"]),
        ],
    )
}

fn account_payload() -> Payload {
    payload! {
        "id" => "acc-1",
        "name" => "Ada",
        "balance" => "1024.5",
        "age" => 36.0,
        "createdAt" => "2024-03-01T12:00:00Z",
        "ttl" => "1h30m",
        "ignored" => true,
    }
}

fn bench_coerce(c: &mut Criterion) {
    c.bench_function("coerce_string_to_int32", |b| {
        b.iter(|| coerce(black_box(Value::from("123456")), Type::Int32))
    });
    c.bench_function("coerce_string_to_duration", |b| {
        b.iter(|| coerce(black_box(Value::from("2h45m30.5s")), Type::Duration))
    });
}

fn bench_projection(c: &mut Criterion) {
    let rules = account_rules();
    let input = account_payload();
    c.bench_function("project_inbound_v2", |b| {
        b.iter(|| project_inbound(Some(black_box(input.clone())), &rules, "2"))
    });

    let stored = project_inbound(Some(input), &rules, "2").unwrap_or_default();
    let list = Resource::list((0..100).map(|_| Resource::Map(stored.clone())));
    c.bench_function("project_outbound_list_100", |b| {
        b.iter(|| project_outbound(black_box(list.clone()), &rules, "2"))
    });
}

fn bench_route(c: &mut Criterion) {
    let mut router = Router::new("");
    for name in ["accounts", "orders", "invoices", "users"] {
        let collection = format!("/api/v{{version}}/{name}");
        let item = format!("{collection}/{{resource_id}}");
        for (method, template) in [
            (Method::GET, &collection),
            (Method::POST, &collection),
            (Method::GET, &item),
            (Method::PUT, &item),
            (Method::DELETE, &item),
        ] {
            let _ = router.add(method, template, name);
        }
    }
    c.bench_function("route_item_match", |b| {
        b.iter(|| router.route(&Method::PUT, black_box("/api/v2/users/42")).is_some())
    });
}

criterion_group!(benches, bench_coerce, bench_projection, bench_route);
criterion_main!(benches);
