#![allow(clippy::pedantic)]

use criterion::Criterion;
use criterion::Throughput;
use criterion::{criterion_group, criterion_main};
use flathash::Map;
use rand::{thread_rng, Rng};
use std::hash::BuildHasherDefault;

const CAPACITY: usize = i16::MAX as usize;
const NUM_OPS: u64 = i16::MAX as u64;

type HashFn = std::collections::hash_map::DefaultHasher;

fn bench_flathash_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("flathash_map");
    group.throughput(Throughput::Elements(NUM_OPS * 6 * 2_u64));
    group.sample_size(10);
    group.bench_function("insert_and_update", |b| {
        let mut map = Map::with_capacity_and_load_and_hasher(
            CAPACITY,
            0.75,
            BuildHasherDefault::<HashFn>::default(),
        );
        let mut rng = thread_rng();
        let mut bits: u64 = rng.gen();
        let mut mask = 0u64;

        b.iter(|| {
            for _ in 0..6 {
                mask <<= 4;
                mask |= bits & 0b0000_1111;
                bits >>= 4;

                for i in 0..NUM_OPS {
                    let key = rng.gen::<u64>() & mask;
                    map.put(key, i as u16);
                    let key = rng.gen::<u64>() & mask;
                    map.put(key, i as u16);
                }
            }
        })
    });
    group.finish();
}

fn bench_std_hashmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("std_hashmap");
    group.throughput(Throughput::Elements(NUM_OPS * 6 * 2_u64));
    group.sample_size(10);
    group.bench_function("insert_and_update", |b| {
        let mut map = std::collections::HashMap::with_capacity_and_hasher(
            CAPACITY,
            BuildHasherDefault::<HashFn>::default(),
        );

        let mut rng = thread_rng();
        let mut bits: u64 = rng.gen();
        let mut mask = 0u64;

        b.iter(|| {
            for _ in 0..6 {
                mask <<= 4;
                mask |= bits & 0b0000_1111;
                bits >>= 4;

                for i in 0..NUM_OPS {
                    let key = rng.gen::<u64>() & mask;
                    map.insert(key, i as u16);
                    let key = rng.gen::<u64>() & mask;
                    map.insert(key, i as u16);
                }
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_flathash_map, bench_std_hashmap);
criterion_main!(benches);
