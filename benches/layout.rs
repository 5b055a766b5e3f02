//! Benchmarks for series sizing, hit testing and render passes.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gridview::config::GridConfig;
use gridview::layout::{GridLayout, SeriesSizing, Viewport};
use gridview::provider::TableProvider;
use gridview::render::RecordingSurface;
use gridview::types::IntPoint;
use gridview::viewer::GridView;

fn sized_series(count: u32) -> SeriesSizing {
    let mut s = SeriesSizing::new(21);
    s.set_count(count);
    s.set_extraordinary_indexes((0..count).step_by(97), [0, 1]);
    for model in (0..count).step_by(13) {
        s.put_size_override(model, 40);
    }
    s.build_index();
    s
}

/// Rebuilding prefix sums after overrides change
fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");
    for count in [10_000u32, 1_000_000] {
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut s = sized_series(count);
            b.iter(|| {
                s.build_index();
                black_box(s.total_scroll_size())
            });
        });
    }
    group.finish();
}

/// Position lookups and index conversion on a large series
fn bench_lookups(c: &mut Criterion) {
    let s = sized_series(1_000_000);
    c.bench_function("scroll_index_on_position", |b| {
        b.iter(|| black_box(s.get_scroll_index_on_position(black_box(12_345_678))))
    });
    c.bench_function("real_to_model", |b| b.iter(|| black_box(s.real_to_model(black_box(654_321)))));
}

fn bench_hit_test(c: &mut Criterion) {
    let mut layout = GridLayout::new(21, 84);
    layout.rows.set_count(100_000);
    layout.columns.set_count(200);
    layout.rows.build_index();
    layout.columns.build_index();
    let vp = Viewport::new(1920, 1080).scrolled_to(50_000, 20);
    c.bench_function("cell_address", |b| {
        b.iter(|| black_box(layout.cell_address(&vp, black_box(IntPoint::new(913, 517)))))
    });
}

/// Full repaint versus a one-row blit scroll
fn bench_render(c: &mut Criterion) {
    let mut view = GridView::new(
        Box::new(TableProvider::synthetic(100_000, 30)),
        RecordingSurface::new(1920, 1080),
        GridConfig::default(),
    )
    .unwrap();

    c.bench_function("render_full", |b| {
        b.iter(|| {
            view.invalidation_mut().invalidate_all();
            let stats = view.render();
            view.surface_mut().clear_ops();
            black_box(stats)
        })
    });

    let mut first = 0u32;
    c.bench_function("render_scroll_one_row", |b| {
        b.iter(|| {
            first = if first >= 90_000 { 0 } else { first + 1 };
            view.scroll_to(first, 0);
            let stats = view.flush();
            view.surface_mut().clear_ops();
            black_box(stats)
        })
    });
}

criterion_group!(benches, bench_build_index, bench_lookups, bench_hit_test, bench_render);
criterion_main!(benches);
