// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Benchmarks for applying changes and materializing patches.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use accord::{Backend, Change, Op, PatchMode, ROOT_ID};

const LIST: &str = "text";

/// One actor typing `size` elements front to back, one change per element.
fn typing(actor: &str, size: u64) -> Vec<Change> {
    let mut changes = vec![Change::new(
        actor,
        1,
        vec![Op::make_list(LIST), Op::link(ROOT_ID, "text", LIST)],
    )];
    let mut origin = "_head".to_string();
    for counter in 1..=size {
        let elem = format!("{actor}:{counter}");
        changes.push(Change::new(
            actor,
            counter + 1,
            vec![Op::ins(LIST, origin.as_str(), counter), Op::set(LIST, elem.as_str(), counter as i64)],
        ));
        origin = elem;
    }
    return changes;
}

/// `actors` replicas each overwriting the same handful of keys concurrently.
fn contended_keys(actors: usize, rounds: u64) -> Vec<Change> {
    let mut changes = Vec::new();
    for round in 1..=rounds {
        for a in 0..actors {
            let actor = format!("actor{a}");
            let key = format!("key{}", round % 4);
            changes.push(Change::new(actor.as_str(), round, vec![Op::set(ROOT_ID, key, round as i64)]));
        }
    }
    return changes;
}

fn bench_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("typing");
    for size in [100u64, 1_000, 5_000] {
        let changes = typing("typist", size);
        group.throughput(Throughput::Elements(size));
        for (name, mode) in [("incremental", PatchMode::Incremental), ("materialize", PatchMode::Materialize)] {
            group.bench_with_input(BenchmarkId::new(name, size), &changes, |b, changes| {
                b.iter(|| {
                    let mut backend = Backend::new();
                    black_box(backend.apply_changes(changes, mode).unwrap());
                });
            });
        }
    }
    group.finish();
}

fn bench_contended_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_keys");
    for actors in [2usize, 8, 32] {
        let changes = contended_keys(actors, 50);
        group.throughput(Throughput::Elements(changes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(actors), &changes, |b, changes| {
            b.iter(|| {
                let mut backend = Backend::new();
                black_box(backend.apply_changes(changes, PatchMode::Incremental).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_get_patch(c: &mut Criterion) {
    let mut backend = Backend::new();
    backend.apply_changes(&typing("typist", 5_000), PatchMode::Incremental).unwrap();
    c.bench_function("get_patch_5000", |b| b.iter(|| black_box(backend.get_patch())));
}

criterion_group!(benches, bench_typing, bench_contended_keys, bench_get_patch);
criterion_main!(benches);
