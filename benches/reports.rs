//! Benchmarks for report assembly over a cleaned dataset.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_data_reports::config::EngineConfig;
use rust_data_reports::report::ReportAssembler;
use rust_data_reports::types::{DataSet, DataType, Field, Schema, Value};

fn clean_tickets(rows: usize) -> DataSet {
    let centers = ["los angeles/ca", "denver/co", "baltimore/md"];
    let channels = ["call-center", "chatbot", "email", "web"];
    let reasons = ["billing question", "payments", "service outage"];
    let states = ["ca", "co", "md", "ny", "tx", "wa"];
    let sla = ["within sla", "above sla", "below sla"];
    let data = (0..rows)
        .map(|i| {
            vec![
                Value::text(centers[i % centers.len()]),
                Value::text(states[i % states.len()]),
                Value::text(channels[i % channels.len()]),
                Value::text(reasons[i % reasons.len()]),
                Value::text(if i % 2 == 0 { "negative" } else { "positive" }),
                Value::Float64((i % 5 + 1) as f64),
                Value::Float64((i % 45) as f64 + 0.5),
                Value::text(sla[i % sla.len()]),
            ]
        })
        .collect();
    let mut fields: Vec<Field> = ["call_center", "state", "channel", "reason", "sentiment"]
        .into_iter()
        .map(|n| Field::new(n, DataType::Utf8))
        .collect();
    fields.push(Field::new("csat_score", DataType::Float64));
    fields.push(Field::new("call_duration_in_minutes", DataType::Float64));
    fields.push(Field::new("response_time", DataType::Utf8));
    DataSet::new(Schema::new(fields), data)
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_assembly");
    for rows in [1_000usize, 50_000] {
        let ds = clean_tickets(rows);
        for parallel in [false, true] {
            let cfg = EngineConfig::builder().parallel_groups(parallel).build().unwrap();
            let assembler = ReportAssembler::new(cfg);
            let name = if parallel { "parallel_groups" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(name, rows), &ds, |b, ds| {
                b.iter(|| assembler.assemble(black_box(ds)).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_assemble);
criterion_main!(benches);
