use criterion::{
    black_box, criterion_group, criterion_main, Bencher, BenchmarkId, Criterion, Throughput,
};
use itertools::Itertools;
use once_cell::sync::Lazy;
use rand::Rng;

use resident::{IntId, Link, Resource, ResourceTable, TableConfig};

const INITIAL_BITS: [u32; 3] = [5, 10, 14];
const TOTAL_KEYS: [usize; 2] = [1000, 100000];
const TOTAL_OPERATIONS: u64 = 1000;

static RANDOM_INDEXES: Lazy<Vec<usize>> = Lazy::new(|| {
    let mut rng = rand::thread_rng();
    let mut indexes = Vec::with_capacity(TOTAL_OPERATIONS as usize);
    for _i in 0..TOTAL_OPERATIONS {
        indexes.push(rng.gen_range(0, 100000));
    }
    indexes
});

#[derive(Resource)]
struct Channel {
    id: IntId<u32>,
    link: Link<Channel>,
}

fn channels(count: usize) -> Vec<Box<Channel>> {
    (0..count)
        .map(|n| {
            Box::new(Channel {
                id: IntId::new(n as u32),
                link: Link::new(),
            })
        })
        .collect()
}

fn table(c: &mut Criterion) {
    let mut group = c.benchmark_group("table");
    group.throughput(Throughput::Elements(TOTAL_OPERATIONS));

    for input in INITIAL_BITS.iter().cartesian_product(TOTAL_KEYS.iter()) {
        let (bits, keys) = input;
        let description = format!("initial_bits: {}, keys: {}", bits, keys);

        group.bench_with_input(
            BenchmarkId::new("Random Lookup", description.clone()),
            &(bits, keys),
            |b, (&bits, &keys)| random_lookup(b, bits, keys),
        );
        group.bench_with_input(
            BenchmarkId::new("Add Remove Cycle", description.clone()),
            &(bits, keys),
            |b, (&bits, &keys)| add_remove_cycle(b, bits, keys),
        );
    }
    group.finish()
}

fn random_lookup(b: &mut Bencher, bits: u32, keys: usize) {
    let config = TableConfig::with_initial_index_bits(bits);
    let mut table: ResourceTable<Channel> = ResourceTable::with_config(&config).unwrap();
    let mut recs = channels(keys);
    for rec in recs.iter_mut() {
        unsafe {
            table.add(&mut **rec).unwrap();
        }
    }
    b.iter(|| {
        for &i in RANDOM_INDEXES.iter() {
            let id = IntId::new((i % keys) as u32);
            black_box(table.lookup(&id));
        }
    });
}

fn add_remove_cycle(b: &mut Bencher, bits: u32, keys: usize) {
    let config = TableConfig::with_initial_index_bits(bits);
    let mut table: ResourceTable<Channel> = ResourceTable::with_config(&config).unwrap();
    let mut recs = channels(keys);
    b.iter(|| {
        for &i in RANDOM_INDEXES.iter() {
            let rec = &mut recs[i % keys];
            let id = *rec.id();
            if table.remove(&id).is_none() {
                unsafe {
                    table.add(&mut **rec).unwrap();
                }
            }
        }
    });
}

criterion_group!(benches, table);
criterion_main!(benches);
