use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use tollgate_compare::config::{ComparisonPolicy, EngineOptions};
use tollgate_compare::predicate::{Operator, Predicate};
use tollgate_compare::value::DataType;
use tollgate_compare::variables::{self, VariableBindings};
use tollgate_compare::ComparisonAssertion;

fn create_assertion(expression: &str, predicates: Vec<Predicate>) -> ComparisonAssertion {
    ComparisonAssertion::new(
        ComparisonPolicy::new(expression, predicates),
        EngineOptions::default(),
    )
    .unwrap()
}

fn numeric_chain() -> Vec<Predicate> {
    vec![
        Predicate::data_type(DataType::Integer),
        Predicate::binary(Operator::GreaterThan, "0"),
        Predicate::numeric_range(Some(Decimal::from(0)), Some(Decimal::from(1_000_000))),
        Predicate::binary(Operator::LessThanOrEqual, "${limits.max}"),
    ]
}

fn bench_single_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_value");
    group.throughput(Throughput::Elements(1));

    let assertion = create_assertion("${request.size}", numeric_chain());
    let vars = VariableBindings::new()
        .with("request.size", "4096")
        .with("limits.max", 65536i64);
    group.bench_function("numeric_chain", |b| {
        b.iter(|| assertion.check_policy(black_box(&vars)))
    });

    let assertion = create_assertion(
        "${request.path}",
        vec![
            Predicate::string_length(1, Some(256)),
            Predicate::regex(r"^/api/v\d+/"),
            Predicate::binary(Operator::Contains, "orders").ignore_case(),
        ],
    );
    let vars = VariableBindings::new().with("request.path", "/api/v2/Orders/1234");
    group.bench_function("string_chain", |b| {
        b.iter(|| assertion.check_policy(black_box(&vars)))
    });

    // First predicate fails (best case)
    let vars = VariableBindings::new().with("request.size", "not-a-number");
    let assertion = create_assertion("${request.size}", numeric_chain());
    group.bench_function("early_failure", |b| {
        b.iter(|| assertion.check_policy(black_box(&vars)))
    });

    group.finish();
}

fn bench_multi_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_value");

    for size in [1usize, 10, 100, 1000].iter() {
        let values: Vec<String> = (0..*size).map(|i| (i + 1).to_string()).collect();
        let vars = VariableBindings::new()
            .with("items", values)
            .with("limits.max", 65536i64);
        let assertion = create_assertion("${items}", numeric_chain());

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("numeric_chain", size), size, |b, _| {
            b.iter(|| assertion.check_policy(black_box(&vars)))
        });
    }

    group.finish();
}

fn bench_variable_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("variables");
    let options = EngineOptions::default();
    let vars = VariableBindings::new()
        .with("client.id", "tenant-42")
        .with("scopes", vec!["read", "write", "admin"]);

    group.bench_function("resolve_reference", |b| {
        b.iter(|| variables::resolve(black_box("${scopes}"), &vars, &options))
    });
    group.bench_function("expand_template", |b| {
        b.iter(|| {
            variables::expand(
                black_box("client=${client.id} scopes=${scopes|;} first=${scopes[0]}"),
                &vars,
                &options,
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_value,
    bench_multi_value,
    bench_variable_expansion
);
criterion_main!(benches);
