// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};

use crate::scale::{Axis, LinearScale};
use crate::zoom::ZoomTransform;

/// Domain limits that the viewport clamps against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainConfig {
    /// Horizontal domain limits; `None` disables clamping on x.
    pub x_range: Option<[f64; 2]>,
    /// Vertical domain limits; `None` disables clamping on y.
    pub y_range: Option<[f64; 2]>,
    /// Extent used to seed the base x scale.
    pub initial_x_range: [f64; 2],
    /// Extent used to seed the base y scale.
    pub initial_y_range: [f64; 2],
    /// Padding added around every range so edge bidegrees are not cut in half.
    pub domain_offset: f64,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            x_range: None,
            y_range: None,
            initial_x_range: [0.0, 10.0],
            initial_y_range: [0.0, 10.0],
            domain_offset: 0.5,
        }
    }
}

impl DomainConfig {
    /// The padded x limits, if x is bounded.
    #[must_use]
    pub fn padded_x(&self) -> Option<[f64; 2]> {
        self.x_range.map(|r| pad(r, self.domain_offset))
    }

    /// The padded y limits, if y is bounded.
    #[must_use]
    pub fn padded_y(&self) -> Option<[f64; 2]> {
        self.y_range.map(|r| pad(r, self.domain_offset))
    }
}

/// The untransformed axis scales; their pixel ranges are the plot area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseScales {
    /// Base horizontal scale.
    pub x: LinearScale,
    /// Base vertical scale (reversed pixel range).
    pub y: LinearScale,
}

/// What [`recompute_scales`] had to do to keep the transform inside the domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Correction {
    /// The transform was already valid.
    None,
    /// A pixel translation was added to bring a bound back to the plot edge.
    Translated(Vec2),
    /// A zoom-out with both axes maxed was rejected; the previous transform wins.
    RestoredPrevious,
    /// A zoom-out past the point where both axes max out was stopped at that point.
    ZoomCapped,
}

/// Float and integer domain extents of the plot area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainBounds {
    /// Domain x at the left plot edge.
    pub x_min_float: f64,
    /// Domain x at the right plot edge.
    pub x_max_float: f64,
    /// Domain y at the bottom plot edge.
    pub y_min_float: f64,
    /// Domain y at the top plot edge.
    pub y_max_float: f64,
    /// Smallest visible integer x.
    pub x_min: i64,
    /// Largest visible integer x.
    pub x_max: i64,
    /// Smallest visible integer y.
    pub y_min: i64,
    /// Largest visible integer y.
    pub y_max: i64,
}

/// Output of one viewport recomputation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveScales {
    /// Live horizontal scale.
    pub x: LinearScale,
    /// Live vertical scale.
    pub y: LinearScale,
    /// The transform the live scales were derived from, after correction.
    pub transform: ZoomTransform,
    /// Whether x is pinned to its padded range.
    pub x_maxed: bool,
    /// Whether y is pinned to its padded range.
    pub y_maxed: bool,
    /// Correction applied to the requested transform.
    pub correction: Correction,
    /// Visible extents.
    pub bounds: DomainBounds,
}

impl LiveScales {
    /// Live scales for an unconstrained transform.
    #[must_use]
    pub fn unclamped(base: &BaseScales, transform: ZoomTransform) -> Self {
        let x = base.x.rescaled(&transform, Axis::X);
        let y = base.y.rescaled(&transform, Axis::Y);
        Self {
            x,
            y,
            transform,
            x_maxed: false,
            y_maxed: false,
            correction: Correction::None,
            bounds: bounds_of(&x, &y),
        }
    }
}

/// Derives the live scales for `state`, clamping against `domain`.
///
/// `previous` is the transform committed by the last recomputation. It is
/// only consulted when a zoom-out leaves both axes maxed: `k` is never allowed
/// below the largest value at which both axes are maxed, so a single zoom-in
/// always changes the view. If `previous` is already at or below that value
/// it is restored verbatim.
/// The function is pure: applying the returned transform back to the zoom
/// behavior is the caller's job.
#[must_use]
pub fn recompute_scales(
    state: ZoomTransform,
    previous: Option<ZoomTransform>,
    domain: &DomainConfig,
    base: &BaseScales,
) -> LiveScales {
    let live = fit(state, domain, base);
    match previous {
        Some(prev) if live.x_maxed && live.y_maxed && state.k < prev.k => {
            let cap = maxing_zoom(domain, base).unwrap_or(prev.k);
            if prev.k <= cap {
                LiveScales {
                    correction: Correction::RestoredPrevious,
                    ..fit(prev, domain, base)
                }
            } else if state.k < cap {
                LiveScales {
                    correction: Correction::ZoomCapped,
                    ..fit(state.scaled_to(cap, plot_center(base)), domain, base)
                }
            } else {
                live
            }
        }
        _ => live,
    }
}

enum AxisFit {
    Free,
    Maxed(LinearScale),
    Shift(f64),
}

impl AxisFit {
    fn shift(&self) -> f64 {
        match self {
            Self::Shift(d) => *d,
            _ => 0.0,
        }
    }
}

fn fit(state: ZoomTransform, domain: &DomainConfig, base: &BaseScales) -> LiveScales {
    let x = base.x.rescaled(&state, Axis::X);
    let y = base.y.rescaled(&state, Axis::Y);
    let fx = fit_axis(&x, domain.padded_x());
    let fy = fit_axis(&y, domain.padded_y());

    let shift = Vec2::new(fx.shift(), fy.shift());
    let (transform, correction) = if shift == Vec2::ZERO {
        (state, Correction::None)
    } else {
        (state.translated(shift), Correction::Translated(shift))
    };

    let x_maxed = matches!(fx, AxisFit::Maxed(_));
    let y_maxed = matches!(fy, AxisFit::Maxed(_));
    let x = match fx {
        AxisFit::Maxed(s) => s,
        _ => base.x.rescaled(&transform, Axis::X),
    };
    let y = match fy {
        AxisFit::Maxed(s) => s,
        _ => base.y.rescaled(&transform, Axis::Y),
    };

    LiveScales {
        x,
        y,
        transform,
        x_maxed,
        y_maxed,
        correction,
        bounds: bounds_of(&x, &y),
    }
}

/// Largest `k` at which every bounded axis shows its whole padded range.
fn maxing_zoom(domain: &DomainConfig, base: &BaseScales) -> Option<f64> {
    let axis = |scale: &LinearScale, padded: Option<[f64; 2]>| {
        padded.map(|[lo, hi]| scale.range_extent() / (scale.apply(hi) - scale.apply(lo)).abs())
    };
    let kx = axis(&base.x, domain.padded_x())?;
    let ky = axis(&base.y, domain.padded_y())?;
    Some(kx.min(ky))
}

fn plot_center(base: &BaseScales) -> Point {
    let [x0, x1] = base.x.range();
    let [y0, y1] = base.y.range();
    Point::new((x0 + x1) / 2.0, (y0 + y1) / 2.0)
}

/// Relative slack when deciding whether an axis shows its whole range.
const MAXED_SLACK: f64 = 1e-9;

fn fit_axis(live: &LinearScale, padded: Option<[f64; 2]>) -> AxisFit {
    let Some([lo, hi]) = padded else {
        return AxisFit::Free;
    };
    let p_lo = live.apply(lo);
    let p_hi = live.apply(hi);
    if (p_hi - p_lo).abs() <= live.range_extent() * (1.0 + MAXED_SLACK) {
        return AxisFit::Maxed(live.with_domain([lo, hi]));
    }

    let [r0, r1] = live.range();
    let dir = (r1 - r0).signum();
    if (p_lo - r0) * dir > 0.0 {
        AxisFit::Shift(r0 - p_lo)
    } else if (r1 - p_hi) * dir > 0.0 {
        AxisFit::Shift(r1 - p_hi)
    } else {
        AxisFit::Free
    }
}

fn bounds_of(x: &LinearScale, y: &LinearScale) -> DomainBounds {
    let (x_min_float, x_max_float) = visible(x);
    let (y_min_float, y_max_float) = visible(y);
    DomainBounds {
        x_min_float,
        x_max_float,
        y_min_float,
        y_max_float,
        x_min: to_int(x_min_float.ceil()),
        x_max: to_int(x_max_float.floor()),
        y_min: to_int(y_min_float.ceil()),
        y_max: to_int(y_max_float.floor()),
    }
}

fn visible(scale: &LinearScale) -> (f64, f64) {
    let [r0, r1] = scale.range();
    let a = scale.invert(r0);
    let b = scale.invert(r1);
    if a <= b { (a, b) } else { (b, a) }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "visible bidegrees are far inside the i64 range; float casts saturate"
)]
fn to_int(v: f64) -> i64 {
    v as i64
}

fn pad([a, b]: [f64; 2], offset: f64) -> [f64; 2] {
    [a - offset, b + offset]
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::{BaseScales, Correction, DomainConfig, recompute_scales};
    use crate::scale::LinearScale;
    use crate::zoom::ZoomTransform;

    fn setup() -> (DomainConfig, BaseScales) {
        let domain = DomainConfig {
            x_range: Some([0.0, 10.0]),
            y_range: Some([0.0, 10.0]),
            initial_x_range: [0.0, 10.0],
            initial_y_range: [0.0, 10.0],
            domain_offset: 0.5,
        };
        let base = BaseScales {
            x: LinearScale::new([-0.5, 10.5], [40.0, 480.0]),
            y: LinearScale::new([-0.5, 10.5], [470.0, 30.0]),
        };
        (domain, base)
    }

    #[test]
    fn identity_fills_plot_exactly() {
        let (domain, base) = setup();
        let live = recompute_scales(ZoomTransform::IDENTITY, None, &domain, &base);
        assert_eq!(live.correction, Correction::None);
        assert!((live.bounds.x_min_float + 0.5).abs() < 1e-9);
        assert!((live.bounds.x_max_float - 10.5).abs() < 1e-9);
        assert_eq!((live.bounds.x_min, live.bounds.x_max), (0, 10));
        assert_eq!((live.bounds.y_min, live.bounds.y_max), (0, 10));
    }

    #[test]
    fn zoom_out_maxes_both_axes() {
        let (domain, base) = setup();
        let t = ZoomTransform::IDENTITY.scaled_to(0.5, Point::new(260.0, 250.0));
        let live = recompute_scales(t, None, &domain, &base);
        assert!(live.x_maxed && live.y_maxed);
        assert_eq!(live.x.domain(), [-0.5, 10.5]);
        assert_eq!(live.y.domain(), [-0.5, 10.5]);
    }

    #[test]
    fn pan_past_lower_bound_is_translated_back() {
        let (domain, base) = setup();
        let zoomed = ZoomTransform::IDENTITY.scaled_to(2.0, Point::new(260.0, 250.0));
        // Drag right by a lot: x = -0.5 would leave the left plot edge.
        let dragged = zoomed.translated(Vec2::new(500.0, 0.0));
        let live = recompute_scales(dragged, None, &domain, &base);
        assert!(matches!(live.correction, Correction::Translated(_)));
        assert!((live.x.apply(-0.5) - 40.0).abs() < 1e-9, "bound sits on the margin edge");
        assert!((live.bounds.x_min_float + 0.5).abs() < 1e-9);
    }

    #[test]
    fn pan_past_upper_y_bound_is_translated_back() {
        let (domain, base) = setup();
        let zoomed = ZoomTransform::IDENTITY.scaled_to(3.0, Point::new(260.0, 250.0));
        // Dragging down reveals content above the top bound.
        let dragged = zoomed.translated(Vec2::new(0.0, 2_000.0));
        let live = recompute_scales(dragged, None, &domain, &base);
        assert!((live.y.apply(10.5) - 30.0).abs() < 1e-9, "top bound sits on the top edge");
        assert!(live.bounds.y_max_float <= 10.5 + 1e-9);
    }

    #[test]
    fn zoom_out_with_both_axes_maxed_restores_previous() {
        let (domain, base) = setup();
        let prev = ZoomTransform::IDENTITY.scaled_to(0.9, Point::new(260.0, 250.0));
        let next = prev.scaled_to(0.5, Point::new(260.0, 250.0));
        let live = recompute_scales(next, Some(prev), &domain, &base);
        assert_eq!(live.correction, Correction::RestoredPrevious);
        assert_eq!(live.transform.k, prev.k);
    }

    #[test]
    fn zoom_out_into_maxed_state_stops_at_the_maxing_point() {
        let (domain, base) = setup();
        let prev = ZoomTransform::IDENTITY.scaled_to(3.0, Point::new(260.0, 250.0));
        let next = prev.scaled_to(0.001, Point::new(260.0, 250.0));
        let live = recompute_scales(next, Some(prev), &domain, &base);
        assert_eq!(live.correction, Correction::ZoomCapped);
        assert!(live.x_maxed && live.y_maxed);
        // The base scales show exactly the padded range, so both max out at k = 1.
        assert!((live.transform.k - 1.0).abs() < 1e-12, "k = {}", live.transform.k);

        let again = live.transform.scaled_to(0.5, Point::new(260.0, 250.0));
        let held = recompute_scales(again, Some(live.transform), &domain, &base);
        assert_eq!(held.correction, Correction::RestoredPrevious);
        assert_eq!(held.transform, live.transform);
    }

    #[test]
    fn unbounded_axis_is_never_clamped() {
        let (mut domain, base) = setup();
        domain.x_range = None;
        let t = ZoomTransform::new(0.25, 900.0, 0.0);
        let live = recompute_scales(t, None, &domain, &base);
        assert!(!live.x_maxed);
        assert!(live.y_maxed);
        assert_eq!(live.transform.tx, 900.0);
    }
}
