//! Performance benchmarks for navigation intents.
//!
//! Run with: `cargo bench --bench navigation`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Graph validation | <1ms | 1k destinations |
//! | Push / pop | <5µs | Includes publish |
//! | Tab switch | <10µs | Pop, save, restore |
//! | State read | <100ns | Lock-free for readers in practice |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::thread;

use navstack::{
    DestinationId, GraphDeclaration, NavController, NavOptions, NavigatorConfig, RouteGraph,
    TabCoordinator,
};

/// Flat graph of `leaves` destinations under one root.
fn make_flat_graph(leaves: usize) -> GraphDeclaration {
    let mut decl = GraphDeclaration::new().root("root", "leaf_0");
    for i in 0..leaves {
        decl = decl.leaf(format!("leaf_{i}"), "root");
    }
    decl
}

/// Chain of nested graphs `depth` levels deep, ending in one leaf.
fn make_nested_graph(depth: usize) -> GraphDeclaration {
    let mut decl = GraphDeclaration::new().root("root", "g_0");
    for i in 0..depth {
        let parent = if i == 0 { "root".to_string() } else { format!("g_{}", i - 1) };
        let start = if i + 1 == depth { "deep_leaf".to_string() } else { format!("g_{}", i + 1) };
        decl = decl.graph(format!("g_{i}"), parent, start);
    }
    decl.leaf("deep_leaf", format!("g_{}", depth - 1))
}

fn bench_graph_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_validation");

    for size in [10, 100, 1000] {
        let decl = make_flat_graph(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("flat", size), &decl, |b, decl| {
            b.iter(|| RouteGraph::new(black_box(decl.clone())).unwrap())
        });
    }

    for depth in [4, 16, 64] {
        let decl = make_nested_graph(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &decl, |b, decl| {
            b.iter(|| RouteGraph::new(black_box(decl.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_push_pop(c: &mut Criterion) {
    let graph = Arc::new(RouteGraph::new(make_flat_graph(16)).unwrap());
    let controller = NavController::in_memory(graph);
    let target = DestinationId::new("leaf_1");
    let opts = NavOptions::new();

    c.bench_function("push_then_back", |b| {
        b.iter(|| {
            controller.navigate(black_box(&target), &opts).unwrap();
            controller.back().unwrap();
        })
    });

    let nested = Arc::new(RouteGraph::new(make_nested_graph(32)).unwrap());
    let controller = NavController::in_memory(nested);
    let graph_target = DestinationId::new("g_0");
    c.bench_function("push_nested_graph_then_back", |b| {
        b.iter(|| {
            controller.navigate(black_box(&graph_target), &opts).unwrap();
            controller.back().unwrap();
        })
    });
}

fn bench_tab_switch(c: &mut Criterion) {
    let config = NavigatorConfig::demo().unwrap();
    let app = TabCoordinator::from_controller(config.build_controller().unwrap()).unwrap();
    let tabs = [
        DestinationId::new("home"),
        DestinationId::new("profile"),
        DestinationId::new("search"),
    ];

    c.bench_function("tab_switch_cycle", |b| {
        b.iter(|| {
            for tab in &tabs {
                app.select_tab(black_box(tab)).unwrap();
            }
        })
    });
}

fn bench_state_reads(c: &mut Criterion) {
    let config = NavigatorConfig::demo().unwrap();
    let controller = config.build_controller().unwrap();

    c.bench_function("state_read", |b| b.iter(|| black_box(controller.state())));

    // Readers racing one writer.
    let mut group = c.benchmark_group("state_read_contention");
    for readers in [1, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(readers), &readers, |b, &readers| {
            b.iter(|| {
                let handles: Vec<_> = (0..readers)
                    .map(|_| {
                        let controller = controller.clone();
                        thread::spawn(move || {
                            for _ in 0..100 {
                                black_box(controller.state());
                            }
                        })
                    })
                    .collect();
                controller
                    .navigate(&DestinationId::new("dashboard"), &NavOptions::new())
                    .unwrap();
                controller.back().unwrap();
                for handle in handles {
                    handle.join().unwrap();
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_graph_validation,
    bench_push_pop,
    bench_tab_switch,
    bench_state_reads
);
criterion_main!(benches);
