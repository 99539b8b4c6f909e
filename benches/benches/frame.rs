// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::Point;
use sseq_chart::{Chart, Class, ClassId, Edge, PageRange};
use sseq_display::hit::{find_hovered_bidegree, find_hovered_class};
use sseq_display::pipeline::{layout_frame, paint_frame};
use sseq_display::{DisplayConfig, domain_config};
use sseq_imaging::RecordingSurface;
use sseq_view::ChartViewport;

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_i64(&mut self, upper_exclusive: i64) -> i64 {
        i64::from(self.next_u32()) % upper_exclusive
    }
}

/// A chart with `n` classes on a `side` x `side` grid and about two edges per class.
fn build_chart(n: usize, side: i64, seed: u64) -> Chart {
    let mut rng = Lcg::new(seed);
    let mut chart = Chart::from_json_str(&format!(
        r#"{{"x_range": [0, {side}], "y_range": [0, {side}],
            "initial_x_range": [0, {side}], "initial_y_range": [0, {side}]}}"#
    ))
    .expect("valid settings");
    let ids: Vec<ClassId> = (0..n)
        .map(|_| chart.add_class(Class::new(rng.gen_range_i64(side), rng.gen_range_i64(side))))
        .collect();
    for (i, &id) in ids.iter().enumerate().skip(1) {
        let other = ids[rng.gen_range_i64(i as i64) as usize];
        let mut edge = if i % 2 == 0 {
            Edge::differential(other, id, 2)
        } else {
            Edge::structline(other, id)
        };
        if i % 5 == 0 {
            edge.bend = Some(20.0);
        }
        chart.add_edge(edge).expect("endpoints exist");
    }
    chart
}

fn viewport_for(chart: &Chart, config: &DisplayConfig) -> ChartViewport {
    let mut vp = ChartViewport::new(config.view_margins(), domain_config(chart, config));
    vp.initialize(1200.0, 900.0);
    vp
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("sseq_display");
    group.sample_size(50);
    let config = DisplayConfig::default();

    for &(n, side) in &[(256_usize, 20_i64), (4_096_usize, 60_i64), (16_384_usize, 120_i64)] {
        let mut chart = build_chart(n, side, 0x5E50_0000_0000_0002);
        let vp = viewport_for(&chart, &config);

        group.bench_function(format!("elements_to_draw(n={n})"), |b| {
            let bounds = vp.bounds();
            b.iter(|| {
                black_box(chart.elements_to_draw(
                    PageRange::Page(2),
                    bounds.x_min - 1,
                    bounds.x_max + 1,
                    bounds.y_min - 1,
                    bounds.y_max + 1,
                ))
            });
        });

        group.bench_function(format!("layout_and_paint(n={n})"), |b| {
            b.iter(|| {
                let layout = layout_frame(&mut chart, &vp, PageRange::Page(2), &config)
                    .expect("frame lays out");
                let mut surface = RecordingSurface::default();
                paint_frame(&mut surface, &chart, &vp, &layout, &config, None);
                black_box(surface.draw_count());
            });
        });

        let layout =
            layout_frame(&mut chart, &vp, PageRange::Page(2), &config).expect("frame lays out");
        let visible = layout.visible.classes;
        let mut rng = Lcg::new(0x5E50_0000_0000_0003);
        let pointers: Vec<Point> = (0..256)
            .map(|_| {
                Point::new(
                    f64::from(rng.next_u32() % 1200),
                    f64::from(rng.next_u32() % 900),
                )
            })
            .collect();
        group.bench_function(format!("hover_hit_test(n={n})"), |b| {
            b.iter(|| {
                for &p in &pointers {
                    black_box(find_hovered_class(&chart, &visible, None, p));
                    black_box(find_hovered_bidegree(&vp, p, 15.0, None));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frame);
criterion_main!(benches);
