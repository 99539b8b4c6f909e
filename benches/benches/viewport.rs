// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};
use sseq_view::{ChartViewport, DomainConfig, Margins, ZoomTransform, recompute_scales};

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

    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX)
    }
}

#[derive(Clone, Copy)]
enum Gesture {
    Zoom(f64, Point),
    Pan(Vec2),
}

fn gestures(n: usize, seed: u64) -> Vec<Gesture> {
    let mut rng = Lcg::new(seed);
    (0..n)
        .map(|_| {
            if rng.next_u32() % 3 == 0 {
                let factor = 0.5 + rng.next_f64() * 1.5;
                Gesture::Zoom(factor, Point::new(rng.next_f64() * 800.0, rng.next_f64() * 600.0))
            } else {
                Gesture::Pan(Vec2::new(
                    (rng.next_f64() - 0.5) * 400.0,
                    (rng.next_f64() - 0.5) * 400.0,
                ))
            }
        })
        .collect()
}

fn viewport(bounded: bool) -> ChartViewport {
    let range = bounded.then_some([0.0, 60.0]);
    let mut vp = ChartViewport::new(
        Margins::default(),
        DomainConfig {
            x_range: range,
            y_range: range,
            initial_x_range: [0.0, 30.0],
            initial_y_range: [0.0, 20.0],
            domain_offset: 0.5,
        },
    );
    vp.set_zoom_extent(0.05, 50.0);
    vp.initialize(800.0, 600.0);
    vp
}

fn bench_viewport(c: &mut Criterion) {
    let mut group = c.benchmark_group("sseq_view");

    let vp = viewport(true);
    let domain = *vp.domain();
    let base = sseq_view::BaseScales {
        x: vp.x_scale().with_domain([-0.5, 30.5]),
        y: vp.y_scale().with_domain([-0.5, 20.5]),
    };
    group.bench_function("recompute_scales(pure)", |b| {
        let requested = ZoomTransform::new(0.8, -120.0, 40.0);
        let previous = Some(ZoomTransform::new(0.9, -100.0, 30.0));
        b.iter(|| black_box(recompute_scales(requested, previous, &domain, &base)));
    });

    for &(bounded, n) in &[(true, 256_usize), (false, 256_usize), (true, 4_096_usize)] {
        let label = if bounded { "bounded" } else { "unbounded" };
        let seq = gestures(n, 0x5E50_0000_0000_0001);
        group.bench_function(format!("gestures_with_recompute({label},n={n})"), |b| {
            b.iter_batched(
                || viewport(bounded),
                |mut vp| {
                    for g in &seq {
                        match *g {
                            Gesture::Zoom(f, anchor) => vp.zoom_by(f, anchor),
                            Gesture::Pan(d) => vp.pan_by(d),
                        }
                        if vp.take_zoom_changed() {
                            vp.recompute();
                        }
                    }
                    black_box(vp.bounds());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_viewport);
criterion_main!(benches);
