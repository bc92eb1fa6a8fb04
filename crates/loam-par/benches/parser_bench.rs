//! Parser benchmarks.
//!
//! Run with: `cargo bench --package loam-par`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use loam_par::parse_document;

const CONFIG_DOC: &str = "\
server:\n\
  host: example.com\n\
  port: 8080\n\
  tls: true\n\
defaults: &d\n\
  retries: 3\n\
  timeout: 2.5\n\
clients:\n\
  - name: alpha\n\
    <<: *d\n\
  - name: beta\n\
    retries: 5\n\
limits: {cpu: 4, mem: 2048}\n\
banner: |\n\
  line one\n\
  line two\n";

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(CONFIG_DOC.len() as u64));

    group.bench_function("simple_mapping", |b| {
        b.iter(|| parse_document(black_box("name: Alice\nage: 30\n")).unwrap())
    });

    group.bench_function("config_document", |b| {
        b.iter(|| parse_document(black_box(CONFIG_DOC)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
