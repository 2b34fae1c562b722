use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use talent_hub::buffer::{LinkedItem, LocalId};
use talent_hub::EditBufferStore;

fn remote_items(count: usize) -> Vec<LinkedItem> {
    (0..count)
        .map(|index| {
            LinkedItem::new(format!("q{}", index), index as u32 + 1).with_id(format!("r{}", index))
        })
        .collect()
}

fn bench_reorder_reversed(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit_buffer_reorder");
    group.bench_function("reverse_512", |b| {
        b.iter_batched(
            || {
                let mut store = EditBufferStore::new();
                store.enter_edit_mode(remote_items(512));
                let ids: Vec<LocalId> = store
                    .local_items()
                    .iter()
                    .rev()
                    .map(|local| local.local_id.clone())
                    .collect();
                (store, ids)
            },
            |(mut store, ids)| {
                store.reorder_local_items(&ids).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_compute_operations(c: &mut Criterion) {
    let mut store = EditBufferStore::new();
    store.enter_edit_mode(remote_items(512));
    for index in 0..128 {
        store.add_local_item(LinkedItem::new(format!("n{}", index), 600 + index));
    }

    c.bench_function("compute_operations_640", |b| {
        b.iter(|| black_box(store.compute_operations()));
    });
}

criterion_group!(benches, bench_reorder_reversed, bench_compute_operations);
criterion_main!(benches);
