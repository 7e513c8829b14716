//! Benchmark: cost of `record` on the evacuation-failure hot path.
//!
//! Measures the uncontended fast path, the losing path when a region has
//! already been recorded, and many workers racing over the same regions.

use criterion::{criterion_group, criterion_main, Criterion};
use evac_failure::{EvacFailureRegions, RegionHeap, RegionTable};
use std::hint::black_box;
use std::thread;

const REGIONS: u32 = 4096;

fn bench_record_uncontended(c: &mut Criterion) {
    let heap = RegionHeap::new(REGIONS);
    let mut tracker = EvacFailureRegions::new(&heap);

    c.bench_function("record_all_regions_single_thread", |b| {
        b.iter(|| {
            tracker.pre_collection(heap.max_regions());
            for idx in 0..REGIONS {
                black_box(tracker.record(idx));
            }
            tracker.post_collection();
            heap.clear_evacuation_failures();
        });
    });
}

fn bench_record_already_failed(c: &mut Criterion) {
    let heap = RegionHeap::new(REGIONS);
    let mut tracker = EvacFailureRegions::new(&heap);
    tracker.pre_collection(heap.max_regions());
    for idx in 0..REGIONS {
        tracker.record(idx);
    }

    c.bench_function("record_losing_claims", |b| {
        b.iter(|| {
            for idx in 0..REGIONS {
                black_box(tracker.record(idx));
            }
        });
    });

    tracker.post_collection();
}

fn bench_record_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_contended");
    group.sample_size(20);

    for workers in [2usize, 4, 8] {
        let heap = RegionHeap::new(REGIONS);
        let mut tracker = EvacFailureRegions::new(&heap);

        group.bench_function(format!("{workers}_workers"), |b| {
            b.iter(|| {
                tracker.pre_collection(heap.max_regions());
                thread::scope(|s| {
                    for w in 0..workers {
                        let tracker = &tracker;
                        s.spawn(move || {
                            // Workers overlap on every region, each from its own start.
                            let start = (w as u32 * REGIONS) / workers as u32;
                            for i in 0..REGIONS {
                                black_box(tracker.record((start + i) % REGIONS));
                            }
                        });
                    }
                });
                black_box(tracker.post_collection());
                heap.clear_evacuation_failures();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_record_uncontended,
    bench_record_already_failed,
    bench_record_contended
);
criterion_main!(benches);
