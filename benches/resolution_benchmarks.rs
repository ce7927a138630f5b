//! Performance benchmarks for tower resolution.
//!
//! Worlds are generated in memory so the numbers measure the walk only:
//! - Receiver depth: chains of inner classes, name found in the outermost
//! - Local scopes: many lexical scopes before the declaring one
//! - Invoke: properties of function type interleaved with members
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect per-walk timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

#![allow(clippy::collapsible_if)]

use calltower::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
use rustc_hash::FxHashMap;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

#[cfg(feature = "profile-with-puffin")]
fn collect_scopes_recursive(
    stream: &puffin::Stream,
    scope: &puffin::Scope,
    scope_collection: &puffin::ScopeCollection,
    scope_timings: &mut FxHashMap<String, i64>,
) {
    use puffin::Reader;

    if let Some(details) = scope_collection.fetch_by_id(&scope.id) {
        *scope_timings.entry(details.name().to_string()).or_insert(0) += scope.record.duration_ns;
    }

    if scope.child_begin_position < scope.child_end_position {
        if let Ok(reader) = Reader::with_offset(stream, scope.child_begin_position) {
            if let Ok(children) = reader.read_top_scopes() {
                for child in children {
                    collect_scopes_recursive(stream, &child, scope_collection, scope_timings);
                }
            }
        }
    }
}

/// Print accumulated profiling statistics for all scopes.
#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    use puffin::Reader;

    let Some(frame_view) = FRAME_VIEW.get() else {
        println!("Profiler not initialized");
        return;
    };

    let view = frame_view.lock();
    let scope_collection = view.scope_collection();

    let mut scope_timings: FxHashMap<String, i64> = FxHashMap::default();
    let mut frame_count = 0i64;

    for frame in view.recent_frames() {
        frame_count += 1;
        let Ok(unpacked) = frame.unpacked() else {
            continue;
        };
        for (_thread_info, stream_info) in unpacked.thread_streams.iter() {
            let reader = Reader::from_start(&stream_info.stream);
            if let Ok(scopes) = reader.read_top_scopes() {
                for scope in scopes {
                    collect_scopes_recursive(
                        &stream_info.stream,
                        &scope,
                        scope_collection,
                        &mut scope_timings,
                    );
                }
            }
        }
    }

    println!("\n=== Profiling Summary ({} frames) ===", frame_count);
    if scope_timings.is_empty() {
        println!("  No scopes recorded. Build with the `profiling` feature.");
    } else {
        let mut entries: Vec<_> = scope_timings.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1));
        for (name, ns) in entries {
            let avg_ns = if frame_count > 0 { *ns / frame_count } else { *ns };
            println!(
                "  {:40} {:>10.2?} avg",
                name,
                std::time::Duration::from_nanos(avg_ns as u64)
            );
        }
    }
    println!("=====================================\n");
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

// ============================================================================
// Worlds
// ============================================================================

/// `depth` nested inner classes; `target` is declared on the outermost.
fn inner_chain(depth: usize) -> (SymbolRegistry, Vec<ImplicitReceiver>) {
    let mut registry = SymbolRegistry::new();
    let app = FqName::from_dotted("app");
    let mut class = registry
        .register_class(Container::Package(app), ClassDecl::class("C0"))
        .unwrap();
    registry
        .register_function(Container::Class(class), FunctionDecl::new("target"))
        .unwrap();

    let mut chain = vec![class];
    for i in 1..depth {
        class = registry
            .register_class(
                Container::Class(class),
                ClassDecl::class(format!("C{i}")).inner(),
            )
            .unwrap();
        chain.push(class);
    }
    let implicit = chain
        .iter()
        .rev()
        .map(|&c| ImplicitReceiver::for_class(&registry, c))
        .collect();
    (registry, implicit)
}

/// `count` local scopes; only the last one declares `x`.
fn local_scopes(count: usize) -> (SymbolRegistry, Vec<ScopeRef>) {
    let mut registry = SymbolRegistry::new();
    let mut locals = Vec::with_capacity(count);
    for i in 0..count {
        let scope = registry.local_scope();
        registry
            .register_property(
                Container::Local(scope),
                PropertyDecl::new(format!("unused{i}"), TypeRef::Unknown),
            )
            .unwrap();
        locals.push(ScopeRef::Lexical(scope));
    }
    if let Some(&ScopeRef::Lexical(last)) = locals.last() {
        registry
            .register_property(Container::Local(last), PropertyDecl::new("x", TypeRef::Unknown))
            .unwrap();
    }
    (registry, locals)
}

/// One class per level with a property `run` of function type, plus a
/// top-level extension `run` on the innermost class.
fn invoke_world(depth: usize) -> (SymbolRegistry, Vec<ImplicitReceiver>, ScopeRef) {
    let (mut registry, implicit) = inner_chain(depth);
    let fn_type = registry.function_type(None, &[TypeRef::Unknown], TypeRef::Unknown);
    let lib = FqName::from_dotted("lib");
    for receiver in &implicit {
        if let Some(class) = receiver.ty.classifier() {
            registry
                .register_property(Container::Class(class), PropertyDecl::new("run", fn_type))
                .unwrap();
        }
    }
    if let Some(innermost) = implicit.first().map(|r| r.ty) {
        registry
            .register_function(
                Container::Package(lib.clone()),
                FunctionDecl::new("run").receiver(innermost).param("x", TypeRef::Unknown),
            )
            .unwrap();
    }
    let top = registry.package(&lib);
    (registry, implicit, top)
}

// ============================================================================
// Benchmarks
// ============================================================================

/// Resolution cost as the implicit receiver chain grows.
fn receiver_depth_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("tower/receiver_depth");
    for depth in [1usize, 4, 16, 64] {
        let (registry, implicit) = inner_chain(depth);
        let stage = ApplicabilityStage;
        let resolver = TowerResolver::new(&registry, &stage);

        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                let resolution = resolver
                    .run_resolver(black_box(&implicit), CallInfo::function("target", vec![]))
                    .unwrap();
                end_profiling_frame();
                black_box(resolution.log.len())
            });
        });
    }
    group.finish();
}

/// Resolution cost as the number of enclosing local scopes grows.
fn local_scope_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("tower/local_scopes");
    for count in [1usize, 10, 100] {
        let (registry, locals) = local_scopes(count);
        let stage = ApplicabilityStage;
        let resolver = TowerResolver::new(&registry, &stage).with_local_scopes(locals);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let resolution = resolver
                    .run_resolver(&[], black_box(CallInfo::variable("x")))
                    .unwrap();
                end_profiling_frame();
                black_box(resolution.best_candidates().len())
            });
        });
    }
    group.finish();
}

/// Interleaving of invoke walks with their parent walk.
fn invoke_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("tower/invoke");
    for depth in [1usize, 8, 32] {
        let (registry, implicit, top) = invoke_world(depth);
        let stage = ApplicabilityStage;
        let resolver = TowerResolver::new(&registry, &stage).with_top_level_scopes([top]);

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                let resolution = resolver
                    .run_resolver(
                        black_box(&implicit),
                        CallInfo::function("run", vec![TypeRef::Unknown]),
                    )
                    .unwrap();
                end_profiling_frame();
                black_box(resolution.log.walks().len())
            });
        });
    }
    group.finish();

    print_profiling_stats();
}

criterion_group!(
    benches,
    receiver_depth_benchmarks,
    local_scope_benchmarks,
    invoke_benchmarks
);

criterion_main!(benches);
