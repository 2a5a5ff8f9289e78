//! Benchmarks for dispatch and selector notification.
//!
//! Run with: `cargo bench --package reflux-core --bench dispatch`

use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reflux_core::binding::{use_selector, Context, SelectorSubscription};
use reflux_core::store::{apply_middleware, create_store, middleware, Dispatch, Store, StoreConfig};
use reflux_core::AnyAction;

#[derive(Clone, PartialEq)]
struct Board {
    counters: Vec<i64>,
}

fn board_reducer(state: Option<&Board>, action: &AnyAction) -> Board {
    let mut board = state.cloned().unwrap_or(Board {
        counters: vec![0; 64],
    });
    if action.action_type == "BUMP" {
        let slot = action.get("slot").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
        if let Some(counter) = board.counters.get_mut(slot) {
            *counter += 1;
        }
    }
    board
}

fn board_store() -> Store<Board, AnyAction> {
    create_store(StoreConfig::new(board_reducer)).unwrap()
}

// ============================================================================
// Dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let store = board_store();
    let bump = AnyAction::new("BUMP").with("slot", 3);
    group.bench_function("no_listeners", |b| {
        b.iter(|| store.dispatch(black_box(bump.clone())).unwrap())
    });

    for depth in [1usize, 4, 16] {
        let layers = (0..depth)
            .map(|_| {
                middleware(|next: Dispatch<AnyAction>| {
                    Arc::new(move |action: AnyAction| next(action)) as Dispatch<AnyAction>
                })
            })
            .collect();
        let store = create_store(
            StoreConfig::new(board_reducer).with_enhancer(apply_middleware(layers)),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("middleware", depth), &depth, |b, _| {
            b.iter(|| store.dispatch(black_box(bump.clone())).unwrap())
        });
    }

    group.finish();
}

// ============================================================================
// Selector Fan-Out
// ============================================================================

fn bench_selector_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector_fan_out");

    for components in [8usize, 64, 512] {
        let store = board_store();
        let ctx = Context::root().provide_store(store.clone());
        let renders = Arc::new(AtomicUsize::new(0));

        let selectors: Vec<SelectorSubscription<Board, AnyAction, i64>> = (0..components)
            .map(|i| {
                let renders = renders.clone();
                let slot = i % 64;
                use_selector(&ctx, move |board: &Board| board.counters[slot], move || {
                    renders.fetch_add(1, Ordering::Relaxed);
                })
                .unwrap()
            })
            .collect();

        let bump = AnyAction::new("BUMP").with("slot", 0);
        group.throughput(Throughput::Elements(components as u64));
        group.bench_with_input(
            BenchmarkId::new("components", components),
            &components,
            |b, _| b.iter(|| store.dispatch(black_box(bump.clone())).unwrap()),
        );

        black_box(renders.load(Ordering::Relaxed));
        drop(selectors);
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_selector_fan_out);
criterion_main!(benches);
