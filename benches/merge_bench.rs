// Copyright (c) 2026 Adrian Robinson. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

use criterion::{criterion_group, criterion_main, Criterion};
use delta_crdt_types::*;
use std::hint::black_box;

fn setup_orsets(n: usize) -> (ORSet<String>, ORSet<String>) {
    let mut a = ORSet::new(1);
    let mut b = ORSet::new(2);

    for i in 0..n {
        a.insert(format!("elem_{}", i));
        b.insert(format!("elem_{}", i + n / 2)); // Some overlap
    }

    (a, b)
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("ORSet Merge");
    for n in [100, 1000].iter() {
        let (a, b) = setup_orsets(*n);

        group.bench_function(format!("Full-State Converge (N={})", n), |bencher| {
            bencher.iter(|| {
                let mut a_clone = a.clone();
                a_clone.converge(black_box(&b));
            })
        });

        group.bench_function(format!("Token Encode (N={})", n), |bencher| {
            bencher.iter(|| black_box(&a).to_tokens())
        });

        let tokens = a.to_tokens();

        group.bench_function(format!("Token Decode (N={})", n), |bencher| {
            bencher.iter(|| {
                ORSet::<String>::from_tokens(black_box(tokens.clone())).unwrap()
            })
        });

        let streams = vec![a.to_tokens(), b.to_tokens()];

        group.bench_function(format!("Token Compaction (N={})", n), |bencher| {
            bencher.iter(|| {
                compaction::compact_tokens::<ORSet<String>>(0, black_box(&streams)).unwrap()
            })
        });

        let json_a = serde_json::to_value(&a).unwrap();
        let json_b = serde_json::to_value(&b).unwrap();

        group.bench_function(format!("JSON Compaction (N={})", n), |bencher| {
            bencher.iter(|| {
                compaction::compact_json_values(
                    CrdtType::ORSet,
                    black_box(&[json_a.clone(), json_b.clone()]),
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_counter_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("GCounter Merge");
    for replicas in [10, 100].iter() {
        let mut a = GCounter::<u64>::new(1);
        for id in 1..=*replicas {
            let mut peer = GCounter::<u64>::new(id);
            peer.increment_by(id);
            a.converge(&peer);
        }
        let mut b = a.clone();
        let mut bumper = GCounter::<u64>::new(*replicas / 2 + 1);
        bumper.increment_by(1_000_000);
        b.converge(&bumper);

        group.bench_function(format!("Converge ({} replicas)", replicas), |bencher| {
            bencher.iter(|| {
                let mut a_clone = a.clone();
                a_clone.converge(black_box(&b));
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_merge, bench_counter_merge);
criterion_main!(benches);
