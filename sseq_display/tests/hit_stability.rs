// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover resolution is stable under repeated and small pointer moves.

use kurbo::{Point, Vec2};
use proptest::prelude::*;
use sseq_chart::{Chart, Class};
use sseq_display::hit::find_hovered_class;
use sseq_display::{Display, DisplayConfig, ManualScheduler};
use sseq_imaging::RecordingSurface;

fn chart_strategy() -> impl Strategy<Value = Chart> {
    prop::collection::vec((0i64..8, 0i64..8, 0.5f64..2.5), 1..20).prop_map(|specs| {
        let mut chart = Chart::new();
        for (x, y, size) in specs {
            let mut class = Class::new(x, y);
            class.size = size;
            chart.add_class(class);
        }
        chart
    })
}

fn shown(chart: Chart) -> Display<RecordingSurface, ManualScheduler> {
    let mut d = Display::new(
        chart,
        DisplayConfig::default(),
        RecordingSurface::default(),
        ManualScheduler::new(),
    )
    .unwrap();
    d.initialize(500.0, 400.0).unwrap();
    d
}

proptest! {
    /// A hovered class contains the pointer, and hovering again from the
    /// same spot keeps it.
    #[test]
    fn prop_hover_is_idempotent(
        chart in chart_strategy(),
        px in 40.0f64..480.0,
        py in 20.0f64..360.0,
    ) {
        let mut d = shown(chart);
        let p = Point::new(px, py);
        d.pointer_move(p).unwrap();
        let first = d.hovered_class();
        if let Some(id) = first {
            let canvas = d.chart().class(id).and_then(|c| c.canvas).unwrap();
            prop_assert!(canvas.contains(p));
        }
        d.pointer_move(p).unwrap();
        prop_assert_eq!(d.hovered_class(), first);
    }

    /// While the pointer stays inside the hovered disc, overlapping discs
    /// never steal the hover.
    #[test]
    fn prop_current_class_wins_inside_its_disc(
        chart in chart_strategy(),
        pick in any::<prop::sample::Index>(),
        angle in 0.0f64..core::f64::consts::TAU,
        frac in 0.0f64..0.95,
    ) {
        let d = shown(chart);
        let visible = d.visible_classes().to_vec();
        prop_assume!(!visible.is_empty());
        let current = visible[pick.index(visible.len())];
        let canvas = d.chart().class(current).and_then(|c| c.canvas).unwrap();
        let p = canvas.center + Vec2::from_angle(angle) * (canvas.radius * frac);

        let hovered = find_hovered_class(d.chart(), &visible, Some(current), p);
        prop_assert_eq!(hovered, Some(current));
    }
}
