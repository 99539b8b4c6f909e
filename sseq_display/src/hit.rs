// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer hit testing against the last drawn frame.
//!
//! Classes are hit by their disc. Bidegrees are hit by distance: the pointer
//! hovers the nearest integer grid point if it is within a pixel threshold.
//! Both lookups prefer the current target while it still qualifies, so
//! overlapping discs and points near a threshold boundary do not flicker.

use kurbo::Point;
use sseq_chart::{Chart, ClassId};
use sseq_event::hover::{HoverState, HoverTransitions};
use sseq_view::ChartViewport;

/// An integer grid point.
pub type Bidegree = (i64, i64);

/// The class under `pointer`.
///
/// `current` wins while it is still visible and contains the pointer;
/// otherwise the first class in `visible` whose disc contains it.
#[must_use]
pub fn find_hovered_class(
    chart: &Chart,
    visible: &[ClassId],
    current: Option<ClassId>,
    pointer: Point,
) -> Option<ClassId> {
    let hit = |id: ClassId| {
        chart
            .class(id)
            .and_then(|c| c.canvas)
            .is_some_and(|canvas| canvas.contains(pointer))
    };
    if let Some(id) = current
        && visible.contains(&id)
        && hit(id)
    {
        return Some(id);
    }
    visible.iter().copied().find(|&id| hit(id))
}

/// The bidegree nearest `pointer`, with its pixel distance.
#[must_use]
pub fn nearest_bidegree(viewport: &ChartViewport, pointer: Point) -> (Bidegree, f64) {
    let domain = viewport.to_domain(pointer);
    let bidegree = (round_to_i64(domain.x), round_to_i64(domain.y));
    let pixel = viewport.to_pixel(Point::new(bidegree.0 as f64, bidegree.1 as f64));
    (bidegree, pixel.distance(pointer))
}

/// The bidegree hovered by `pointer`.
///
/// `current` wins while it stays within `threshold` pixels; otherwise the
/// nearest bidegree if it is within `threshold`.
#[must_use]
pub fn find_hovered_bidegree(
    viewport: &ChartViewport,
    pointer: Point,
    threshold: f64,
    current: Option<Bidegree>,
) -> Option<Bidegree> {
    if let Some((x, y)) = current {
        let pixel = viewport.to_pixel(Point::new(x as f64, y as f64));
        if pixel.distance(pointer) <= threshold {
            return current;
        }
    }
    let (nearest, distance) = nearest_bidegree(viewport, pointer);
    (distance <= threshold).then_some(nearest)
}

fn round_to_i64(v: f64) -> i64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "pointer positions map to bidegrees far inside the i64 range"
    )]
    let r = v.round() as i64;
    r
}

/// Hover state for classes and bidegrees.
#[derive(Clone, Debug, Default)]
pub struct HitTester {
    pointer: Option<Point>,
    class: HoverState<ClassId>,
    bidegree: HoverState<Bidegree>,
}

/// Hover transitions produced by one [`HitTester::update`].
#[derive(Clone, Debug, Default)]
pub struct HoverChanges {
    /// Class enter/leave transitions.
    pub class: HoverTransitions<ClassId>,
    /// Bidegree enter/leave transitions.
    pub bidegree: HoverTransitions<Bidegree>,
}

impl HoverChanges {
    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.class.is_empty() && self.bidegree.is_empty()
    }

    /// Whether the hovered class changed.
    #[must_use]
    pub fn class_changed(&self) -> bool {
        !self.class.is_empty()
    }
}

impl HitTester {
    /// Creates a tester with no pointer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known pointer position.
    #[must_use]
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Records the pointer position without testing.
    pub fn set_pointer(&mut self, pointer: Option<Point>) {
        self.pointer = pointer;
    }

    /// Hovered class.
    #[must_use]
    pub fn hovered_class(&self) -> Option<ClassId> {
        self.class.current().copied()
    }

    /// Hovered bidegree.
    #[must_use]
    pub fn hovered_bidegree(&self) -> Option<Bidegree> {
        self.bidegree.current().copied()
    }

    /// Re-tests the last pointer position against the current frame.
    ///
    /// With no pointer (it left the canvas), both hovers are cleared.
    pub fn update(
        &mut self,
        chart: &Chart,
        viewport: &ChartViewport,
        visible: &[ClassId],
        threshold: f64,
    ) -> HoverChanges {
        let Some(pointer) = self.pointer else {
            return HoverChanges {
                class: self.class.update(None),
                bidegree: self.bidegree.update(None),
            };
        };
        let class = find_hovered_class(chart, visible, self.hovered_class(), pointer);
        let bidegree =
            find_hovered_bidegree(viewport, pointer, threshold, self.hovered_bidegree());
        HoverChanges {
            class: self.class.update(class),
            bidegree: self.bidegree.update(bidegree),
        }
    }

    /// Forgets hover targets without producing transitions.
    pub fn reset(&mut self) {
        self.class.reset();
        self.bidegree.reset();
    }
}
