//! vmgc Benchmarks
//!
//! Allocation, full passes and young passes over chains and wide trees.
//! Run with: `cargo bench --package vmgc`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use vmgc::object::{ObjectRef, ObjectType};
use vmgc::roots::RootType;
use vmgc::{GcConfig, GcGeneration, SharedState};

fn bench_config() -> GcConfig {
    GcConfig {
        young_space_size: 8 * 1024 * 1024,
        mature_space_size: 64 * 1024 * 1024,
        verify_after_gc: false,
        log_phases: false,
        ..Default::default()
    }
}

fn create_state() -> SharedState {
    SharedState::new(bench_config()).unwrap()
}

/// Rooted linked list of `length` young tuples
fn build_chain(state: &SharedState, length: usize) {
    let memory = state.memory();
    let mut head = ObjectRef::NIL;
    for i in 0..length {
        head = memory
            .allocate(ObjectType::Tuple, vec![head, ObjectRef::fixnum(i as i64)])
            .unwrap();
    }
    state.roots().add(head, RootType::Global, Some("chain"));
}

/// Rooted tuple with `width` leaves plus the same amount of garbage
fn build_wide(state: &SharedState, width: usize) {
    let memory = state.memory();
    let leaves: Vec<ObjectRef> = (0..width)
        .map(|_| memory.allocate(ObjectType::Object, vec![]).unwrap())
        .collect();
    let holder = memory.allocate(ObjectType::Tuple, leaves).unwrap();
    state.roots().add(holder, RootType::Global, Some("wide"));
    for _ in 0..width {
        memory.allocate(ObjectType::Object, vec![]).unwrap();
    }
}

fn bench_state_creation(c: &mut Criterion) {
    c.bench_function("state_creation", |b| {
        b.iter(|| black_box(SharedState::new(bench_config()).unwrap()))
    });
}

fn bench_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation");

    for &slots in &[0usize, 4, 16] {
        group.throughput(Throughput::Elements(1000));
        group.bench_function(format!("tuple_{}_slots", slots), |b| {
            b.iter_batched(
                create_state,
                |state| {
                    for _ in 0..1000 {
                        let obj = state
                            .memory()
                            .allocate(ObjectType::Tuple, vec![ObjectRef::NIL; slots])
                            .unwrap();
                        black_box(obj);
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pass");

    for &length in &[100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(length as u64));
        group.bench_function(format!("chain_{}", length), |b| {
            b.iter_batched(
                || {
                    let state = create_state();
                    build_chain(&state, length);
                    state
                },
                |state| black_box(state.collect(GcGeneration::Full)),
                BatchSize::SmallInput,
            )
        });
    }

    group.bench_function("wide_1000_half_garbage", |b| {
        b.iter_batched(
            || {
                let state = create_state();
                build_wide(&state, 1_000);
                state
            },
            |state| black_box(state.collect(GcGeneration::Full)),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_young_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("young_pass");

    for &length in &[100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(length as u64));
        group.bench_function(format!("promote_chain_{}", length), |b| {
            b.iter_batched(
                || {
                    let state = create_state();
                    build_chain(&state, length);
                    state
                },
                |state| black_box(state.collect(GcGeneration::Young)),
                BatchSize::SmallInput,
            )
        });
    }

    group.bench_function("all_garbage_1000", |b| {
        b.iter_batched(
            || {
                let state = create_state();
                for _ in 0..1_000 {
                    state.memory().allocate(ObjectType::Object, vec![]).unwrap();
                }
                state
            },
            |state| black_box(state.collect(GcGeneration::Young)),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_weak_refs(c: &mut Criterion) {
    c.bench_function("weak_refs_1000_cleared", |b| {
        b.iter_batched(
            || {
                let state = create_state();
                let memory = state.memory();
                let weaks: Vec<ObjectRef> = (0..1_000)
                    .map(|_| {
                        let target = memory.allocate(ObjectType::Object, vec![]).unwrap();
                        memory.allocate(ObjectType::WeakRef, vec![target]).unwrap()
                    })
                    .collect();
                let holder = memory.allocate(ObjectType::Tuple, weaks).unwrap();
                state.roots().add(holder, RootType::Global, Some("weaks"));
                state
            },
            |state| black_box(state.collect(GcGeneration::Full)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_state_creation,
    bench_allocation,
    bench_full_pass,
    bench_young_pass,
    bench_weak_refs,
);
criterion_main!(benches);
