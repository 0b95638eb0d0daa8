use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rawcol::RawVec;

const OPS_PER_ITER: u64 = 10_000;

struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

fn make_u64_keys(count: usize, seed: u64) -> Vec<u64> {
    let mut rng = XorShift64::new(seed);
    (0..count).map(|_| rng.next_u64()).collect()
}

/// Append throughput from a cold (unallocated) vector.
fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_vec");
    group.throughput(Throughput::Elements(OPS_PER_ITER));

    group.bench_function("push_from_cold", |b| {
        b.iter(|| {
            let mut v = RawVec::new();
            for i in 0..OPS_PER_ITER {
                v.push(black_box(i));
            }
            black_box(v.len())
        })
    });

    group.bench_function("push_preallocated", |b| {
        b.iter(|| {
            let mut v = RawVec::with_capacity(OPS_PER_ITER as usize);
            for i in 0..OPS_PER_ITER {
                v.push(black_box(i));
            }
            black_box(v.len())
        })
    });

    group.finish();
}

/// Introsort against pre-shuffled keys at several sizes.
fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_vec_sort");

    for size in [64usize, 1024, 65_536] {
        let keys = make_u64_keys(size, 0xDEAD_BEEF);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &keys, |b, keys| {
            b.iter(|| {
                let mut v = RawVec::from_slice(keys);
                v.sort();
                black_box(v[size / 2])
            })
        });
    }

    group.finish();
}

/// Mid-buffer insert/remove pressure (shift-heavy path).
fn bench_insert_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_vec_shift");
    group.throughput(Throughput::Elements(1_000));

    group.bench_function("insert_middle_1000", |b| {
        b.iter(|| {
            let mut v = RawVec::from_slice(&[0u64; 1_000]);
            for i in 0..1_000 {
                v.insert(v.len() / 2, black_box(i));
            }
            black_box(v.len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_push, bench_sort, bench_insert_remove);
criterion_main!(benches);
