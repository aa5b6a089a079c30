//! Selection Engine Benchmarks
//!
//! Lasso selection over a synthetic page of recognized words.
//!
//! Run with: `cargo bench --bench selection_engine`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use ocr_lasso::geometry::{parse_path, CoordinateMapper, Point, Rect, Size, ViewLayout};
use ocr_lasso::ocr::{RecognitionResult, TextBlock, TextElement, TextLine};
use ocr_lasso::selection::select_elements;

const PAGE: Size = Size {
    width: 2480.0,
    height: 3508.0,
};

/// A page of `blocks` paragraphs, 10 lines of 12 words each
fn synthetic_page(blocks: usize) -> RecognitionResult {
    let block_height = PAGE.height / blocks as f64;
    let line_height = block_height / 10.0;
    let word_width = PAGE.width / 12.0;

    let blocks = (0..blocks)
        .map(|b| {
            let lines = (0..10)
                .map(|l| {
                    let y = b as f64 * block_height + l as f64 * line_height;
                    let words = (0..12)
                        .map(|w| {
                            TextElement::new(
                                format!("w{}-{}-{}", b, l, w),
                                Rect::new(
                                    w as f64 * word_width + 4.0,
                                    y + 2.0,
                                    word_width - 8.0,
                                    line_height - 4.0,
                                ),
                            )
                        })
                        .collect();
                    TextLine::new(words)
                })
                .collect();
            TextBlock::from_lines(lines)
        })
        .collect();

    RecognitionResult::new(blocks)
}

/// Freehand loop around the middle of a 1240x1754 view
fn lasso() -> Vec<Point> {
    let mut path = String::from("M 300 500");
    for i in 1..=64 {
        let t = i as f64 / 64.0 * std::f64::consts::TAU;
        path.push_str(&format!(" L {} {}", 620.0 + 320.0 * t.cos(), 877.0 + 380.0 * t.sin()));
    }
    parse_path(&path)
}

fn bench_select_elements(c: &mut Criterion) {
    let mapper = CoordinateMapper::new(ViewLayout::new(Size::new(1240.0, 1754.0), PAGE))
        .expect("measured layout");
    let lasso = lasso();

    let mut group = c.benchmark_group("select_elements");
    group.measurement_time(Duration::from_secs(5));

    for blocks in [1, 8, 32] {
        let page = synthetic_page(blocks);
        group.bench_with_input(BenchmarkId::from_parameter(page.word_count()), &page, |b, page| {
            b.iter(|| select_elements(black_box(&lasso), black_box(page), &mapper))
        });
    }

    group.finish();
}

fn bench_parse_path(c: &mut Criterion) {
    let mut path = String::from("M 0 0");
    for i in 0..500 {
        path.push_str(&format!(" L {}.5 {}.25", i, i * 2));
    }

    c.bench_function("parse_path_500_points", |b| {
        b.iter(|| parse_path(black_box(&path)))
    });
}

criterion_group!(benches, bench_select_elements, bench_parse_path);
criterion_main!(benches);
