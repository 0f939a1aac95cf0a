use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use clusterhub::adapters::clusterers::ClustererRegistry;
use clusterhub::domain::models::{parse_option_string, AlgorithmKind, Attribute, Dataset, Value};
use clusterhub::infrastructure::arff::parse_arff;
use clusterhub::services::{envelope_codec, AlgorithmRegistry, Dispatcher};

fn grid(n: usize) -> Dataset {
    let rows = (0..n)
        .map(|i| {
            let blob = (i % 3) as f64 * 10.0;
            vec![
                Value::Numeric(blob + (i % 7) as f64 * 0.3),
                Value::Numeric(blob - (i % 5) as f64 * 0.2),
            ]
        })
        .collect();
    Dataset::new("grid", vec![Attribute::numeric("x"), Attribute::numeric("y")], rows).unwrap()
}

fn dispatch_benchmark(c: &mut Criterion) {
    let dispatcher = Dispatcher::new(
        Arc::new(AlgorithmRegistry::standard()),
        Arc::new(ClustererRegistry::new()),
    );
    let dataset = grid(120);
    let options = parse_option_string("N 3");

    let mut group = c.benchmark_group("dispatch");
    for kind in AlgorithmKind::ALL {
        let code = i64::from(kind.code());
        let tokens = if kind == AlgorithmKind::Cobweb { Vec::new() } else { options.clone() };
        group.bench_function(kind.name(), |b| {
            b.iter(|| dispatcher.run(black_box(code), black_box(&dataset), black_box(&tokens)));
        });
    }
    group.finish();
}

fn codec_benchmark(c: &mut Criterion) {
    let dispatcher = Dispatcher::new(
        Arc::new(AlgorithmRegistry::standard()),
        Arc::new(ClustererRegistry::new()),
    );
    let envelope = dispatcher.run(1, &grid(120), &parse_option_string("O;N 3"));
    let encoded = envelope_codec::encode(&envelope).unwrap();
    let arff = grid(120).to_string();

    let mut group = c.benchmark_group("codec");
    group.bench_function("encode_envelope", |b| {
        b.iter(|| envelope_codec::encode(black_box(&envelope)).unwrap());
    });
    group.bench_function("decode_envelope", |b| {
        b.iter(|| envelope_codec::decode(black_box(&encoded)).unwrap());
    });
    group.bench_function("parse_arff", |b| {
        b.iter(|| parse_arff(black_box(&arff)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, dispatch_benchmark, codec_benchmark);
criterion_main!(benches);
