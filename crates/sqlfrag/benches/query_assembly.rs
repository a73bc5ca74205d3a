use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlfrag::{DmlQueryBuilder, QueryEscaper, Value};

/// SELECT col0, col1, ... FROM t WHERE col0 = 0 AND col1 = 1 ...
fn build_select(n: usize) -> DmlQueryBuilder {
    let e: QueryEscaper = QueryEscaper::default();
    let mut q = DmlQueryBuilder::new();
    q.from(&e.table("t", ""));
    for i in 0..n {
        let col = e.column(&format!("t.col{i}"), "");
        q.select([col.as_str()]).where_(&col, &i.to_string());
    }
    q
}

fn bench_get_select_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_assembly/get_select_query");

    for n in [1, 5, 10, 50, 100] {
        let q = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.get_select_query()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_assembly/build_and_render");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).get_select_query()));
        });
    }

    group.finish();
}

fn bench_joins(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_assembly/joins");

    for n in [1, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut q = DmlQueryBuilder::new();
                q.select(["*"]).from("t0");
                for i in 1..=n {
                    let table = format!("t{i}");
                    q.join(&table, "LEFT")
                        .start_on_group()
                        .on(&format!("t{}.id", i - 1), &format!("{table}.parent_id"))
                        .sql_or()
                        .on(&format!("{table}.shared"), "1")
                        .end_on_group()
                        .sql_and();
                }
                black_box(q.get_select_query());
            });
        });
    }

    group.finish();
}

fn bench_insert_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_assembly/insert_values");

    for n in [5, 20, 100, 500] {
        let rows: Vec<Vec<Option<String>>> = (0..n)
            .map(|i| vec![Some(i.to_string()), Some(format!("'name{i}'")), None])
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| {
                let mut q = DmlQueryBuilder::new();
                q.into_table("t")
                    .column_names(&["id", "name", "note"])
                    .values(rows.iter().cloned());
                black_box(q.get_insert_query());
            });
        });
    }

    group.finish();
}

fn bench_list_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_assembly/where_in");

    for n in [5, 20, 100, 500] {
        let values: Value = (0..n as i64).collect::<Vec<i64>>().into();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let mut q = DmlQueryBuilder::new();
                q.select(["id"]).from("t").where_in("id", values.clone(), false);
                black_box(q.get_select_query());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_get_select_query,
    bench_build_and_render,
    bench_joins,
    bench_insert_values,
    bench_list_value
);
criterion_main!(benches);
