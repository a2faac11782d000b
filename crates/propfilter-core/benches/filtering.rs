//! Compares unfiltered output, the streaming filter, and the tree filter on
//! the same generated records.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use propfilter_core::{to_writer, to_writer_filtered, to_writer_pruned, NameSet};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

const RECORDS: usize = 1_000;
const NESTING: usize = 3;

#[derive(Serialize)]
struct Record {
    id: i32,
    name: String,
    field3: String,
    field4: String,
    field5: String,
    field6: String,
    field7: String,
    field8: String,
    field9: String,
    field10: String,
    field11: String,
    field12: String,
    field13: String,
    field14: String,
    field15: String,
    nested: Option<Box<Record>>,
}

fn random_string(rng: &mut impl Rng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

fn record(rng: &mut impl Rng, nesting: usize) -> Record {
    Record {
        id: rng.gen(),
        name: random_string(rng),
        field3: random_string(rng),
        field4: random_string(rng),
        field5: random_string(rng),
        field6: random_string(rng),
        field7: random_string(rng),
        field8: random_string(rng),
        field9: random_string(rng),
        field10: random_string(rng),
        field11: random_string(rng),
        field12: random_string(rng),
        field13: random_string(rng),
        field14: random_string(rng),
        field15: random_string(rng),
        nested: (nesting > 0).then(|| Box::new(record(rng, nesting - 1))),
    }
}

fn bench_filtering(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let records: Vec<Record> = (0..RECORDS).map(|_| record(&mut rng, NESTING)).collect();
    let names = NameSet::new(["id", "name"]);

    let mut group = c.benchmark_group("property_filter");
    group.bench_function("baseline", |b| {
        b.iter(|| to_writer(std::io::sink(), black_box(&records)).unwrap())
    });
    group.bench_function("streaming", |b| {
        b.iter(|| to_writer_filtered(std::io::sink(), black_box(&records), &names).unwrap())
    });
    group.bench_function("tree", |b| {
        b.iter(|| to_writer_pruned(std::io::sink(), black_box(&records), &names).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_filtering);
criterion_main!(benches);
